//! Document module - raw text produced by ingestion

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Content-derived identifier for an ingested document
///
/// The identifier is the first 16 hex characters of
/// `sha256(source || 0x00 || text)`. Re-ingesting identical content from the
/// same source yields the same id; any change to the content yields a new one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    /// Derive the identifier from a source locator and its extracted text
    ///
    /// # Examples
    ///
    /// ```
    /// use clausal_domain::DocumentId;
    ///
    /// let a = DocumentId::derive("policy.pdf", "Section 1. Cover");
    /// let b = DocumentId::derive("policy.pdf", "Section 1. Cover");
    /// assert_eq!(a, b);
    /// assert_eq!(a.as_str().len(), 16);
    /// ```
    pub fn derive(source: &str, text: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        hasher.update([0u8]);
        hasher.update(text.as_bytes());
        let digest = hex::encode(hasher.finalize());
        Self(digest[..16].to_string())
    }

    /// Wrap an already-computed identifier
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Supported content types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Portable Document Format
    Pdf,
    /// Office Open XML word-processing document
    Docx,
    /// RFC 822 style email message
    Email,
    /// Plain UTF-8 text
    PlainText,
}

impl ContentType {
    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Pdf => "pdf",
            ContentType::Docx => "docx",
            ContentType::Email => "email",
            ContentType::PlainText => "text",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ingested document
///
/// Immutable once created. The pipeline drops it after chunking unless the
/// index cache keeps the derived index alive.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Content-derived identifier
    pub id: DocumentId,
    /// Source locator (URL or local path) as supplied by the caller
    pub source: String,
    /// Extracted, cleaned text
    pub text: String,
    /// Detected content type
    pub content_type: ContentType,
    /// Fetch time (seconds since Unix epoch)
    pub fetched_at: u64,
}

impl Document {
    /// Build a document, deriving its id from source and text
    pub fn new(
        source: impl Into<String>,
        text: impl Into<String>,
        content_type: ContentType,
        fetched_at: u64,
    ) -> Self {
        let source = source.into();
        let text = text.into();
        Self {
            id: DocumentId::derive(&source, &text),
            source,
            text,
            content_type,
            fetched_at,
        }
    }

    /// True when the document carries no non-whitespace text
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}
