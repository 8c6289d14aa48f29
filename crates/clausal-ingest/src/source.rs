//! Source locators and content-type detection

use clausal_domain::ContentType;
use std::path::{Path, PathBuf};

/// MIME type for PDF
pub const MIME_PDF: &str = "application/pdf";
/// MIME type for DOCX
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
/// MIME type for RFC 822 messages
pub const MIME_EMAIL: &str = "message/rfc822";

const PDF_MAGIC: &[u8] = b"%PDF";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Where a document comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// `http://` or `https://` URL
    Url(String),
    /// Local filesystem path (plain or `file://`)
    Path(PathBuf),
}

impl DocumentSource {
    /// Classify a locator string
    pub fn parse(locator: &str) -> Self {
        let trimmed = locator.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            DocumentSource::Url(trimmed.to_string())
        } else if let Some(rest) = trimmed.strip_prefix("file://") {
            DocumentSource::Path(PathBuf::from(rest))
        } else {
            DocumentSource::Path(PathBuf::from(trimmed))
        }
    }

    /// Lower-cased file extension of the locator, ignoring any query string
    pub fn extension(&self) -> Option<String> {
        let path_part = match self {
            DocumentSource::Url(url) => match reqwest::Url::parse(url) {
                Ok(parsed) => parsed.path().to_string(),
                Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
            },
            DocumentSource::Path(path) => path.to_string_lossy().into_owned(),
        };
        Path::new(&path_part)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }
}

/// Content type implied by a file extension
pub fn from_extension(ext: &str) -> Option<ContentType> {
    match ext {
        "pdf" => Some(ContentType::Pdf),
        "docx" => Some(ContentType::Docx),
        "eml" | "msg" => Some(ContentType::Email),
        "txt" | "text" | "md" => Some(ContentType::PlainText),
        _ => None,
    }
}

/// Content type implied by an HTTP `Content-Type` header value
pub fn from_mime(mime: &str) -> Option<ContentType> {
    let essence = mime.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    match essence.as_str() {
        MIME_PDF => Some(ContentType::Pdf),
        MIME_DOCX => Some(ContentType::Docx),
        MIME_EMAIL => Some(ContentType::Email),
        m if m.starts_with("text/") => Some(ContentType::PlainText),
        _ => None,
    }
}

/// Content type implied by leading magic bytes
pub fn from_magic(bytes: &[u8]) -> Option<ContentType> {
    if bytes.starts_with(PDF_MAGIC) {
        Some(ContentType::Pdf)
    } else if bytes.starts_with(ZIP_MAGIC) {
        Some(ContentType::Docx)
    } else {
        None
    }
}

/// Whether the text opens with an RFC 822 style header block
pub fn looks_like_email(text: &str) -> bool {
    let mut headers = 0;
    for line in text.lines().take(20) {
        if line.trim().is_empty() {
            break;
        }
        let Some((name, _)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim().to_ascii_lowercase();
        if matches!(name.as_str(), "from" | "to" | "subject" | "date" | "cc" | "message-id") {
            headers += 1;
        }
    }
    headers >= 2
}

/// Detect the content type of fetched bytes
///
/// Order: locator extension, then HTTP content type, then magic bytes, then
/// UTF-8 sniffing. Returns `None` when the bytes are neither a known binary
/// format nor valid UTF-8.
pub fn detect(source: &DocumentSource, http_content_type: Option<&str>, bytes: &[u8]) -> Option<ContentType> {
    if let Some(ct) = source.extension().as_deref().and_then(from_extension) {
        return Some(ct);
    }
    if let Some(ct) = http_content_type.and_then(from_mime) {
        return Some(ct);
    }
    if let Some(ct) = from_magic(bytes) {
        return Some(ct);
    }
    let text = std::str::from_utf8(bytes).ok()?;
    if looks_like_email(text) {
        Some(ContentType::Email)
    } else {
        Some(ContentType::PlainText)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_locators() {
        assert!(matches!(DocumentSource::parse("https://x.io/a.pdf"), DocumentSource::Url(_)));
        assert_eq!(
            DocumentSource::parse("file:///tmp/a.txt"),
            DocumentSource::Path(PathBuf::from("/tmp/a.txt"))
        );
        assert!(matches!(DocumentSource::parse("./policy.pdf"), DocumentSource::Path(_)));
    }

    #[test]
    fn test_extension_ignores_query_string() {
        let src = DocumentSource::parse("https://blob.example.com/policy.PDF?sv=2023&sig=abc");
        assert_eq!(src.extension().as_deref(), Some("pdf"));
    }

    #[test]
    fn test_detect_prefers_extension() {
        let src = DocumentSource::parse("notes.txt");
        assert_eq!(detect(&src, Some(MIME_PDF), b"%PDF-1.4"), Some(ContentType::PlainText));
    }

    #[test]
    fn test_detect_falls_back_to_mime() {
        let src = DocumentSource::parse("https://x.io/download?id=7");
        assert_eq!(
            detect(&src, Some("application/pdf; charset=binary"), b"whatever"),
            Some(ContentType::Pdf)
        );
    }

    #[test]
    fn test_detect_magic_bytes() {
        let src = DocumentSource::parse("https://x.io/blob");
        assert_eq!(detect(&src, None, b"%PDF-1.7\n..."), Some(ContentType::Pdf));
        assert_eq!(detect(&src, None, b"PK\x03\x04rest"), Some(ContentType::Docx));
    }

    #[test]
    fn test_detect_email_and_text() {
        let src = DocumentSource::parse("https://x.io/blob");
        let email = b"From: hr@example.com\nSubject: Leave policy\n\nBody";
        assert_eq!(detect(&src, None, email), Some(ContentType::Email));
        assert_eq!(detect(&src, None, b"just words"), Some(ContentType::PlainText));
    }

    #[test]
    fn test_detect_binary_garbage() {
        let src = DocumentSource::parse("https://x.io/blob");
        assert_eq!(detect(&src, None, &[0xff, 0xfe, 0x00, 0x81]), None);
    }
}
