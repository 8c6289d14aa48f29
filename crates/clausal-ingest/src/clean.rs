//! Text normalization applied after extraction

/// Email headers kept in the document body
const KEPT_EMAIL_HEADERS: &[&str] = &["subject", "from", "date"];

/// Normalize extracted text
///
/// - line endings become `\n`
/// - control characters are dropped, tabs become spaces
/// - whitespace runs inside a line collapse to one space
/// - runs of blank lines collapse to a single blank line (paragraph break)
///
/// # Examples
///
/// ```
/// use clausal_ingest::clean_text;
///
/// let cleaned = clean_text("Section  1.\r\n\r\n\r\n\tCover\u{0007}age");
/// assert_eq!(cleaned, "Section 1.\n\nCoverage");
/// ```
pub fn clean_text(raw: &str) -> String {
    let normalized = raw.replace("\r\n", "\n").replace(['\r', '\u{000C}'], "\n");

    let mut out = String::with_capacity(normalized.len());
    let mut pending_break = false;

    for line in normalized.split('\n') {
        let cleaned = clean_line(line);
        if cleaned.is_empty() {
            pending_break = !out.is_empty();
            continue;
        }
        if !out.is_empty() {
            out.push_str(if pending_break { "\n\n" } else { "\n" });
        }
        out.push_str(&cleaned);
        pending_break = false;
    }

    out
}

fn clean_line(line: &str) -> String {
    let filtered: String = line
        .chars()
        .map(|c| if c == '\t' { ' ' } else { c })
        .filter(|c| !c.is_control())
        .collect();
    filtered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drop email transport headers, keeping `Subject`, `From` and `Date`
///
/// Text that does not open with a header block is returned unchanged.
pub fn strip_email_headers(text: &str) -> String {
    let Some((head, body)) = split_header_block(text) else {
        return text.to_string();
    };

    let mut kept: Vec<String> = Vec::new();
    let mut keep_current = false;
    for line in head.lines() {
        if line.starts_with(' ') || line.starts_with('\t') {
            if keep_current {
                if let Some(last) = kept.last_mut() {
                    last.push(' ');
                    last.push_str(line.trim());
                }
            }
            continue;
        }
        let name = line.split(':').next().unwrap_or_default().trim().to_ascii_lowercase();
        keep_current = KEPT_EMAIL_HEADERS.contains(&name.as_str());
        if keep_current {
            kept.push(line.trim().to_string());
        }
    }

    if kept.is_empty() {
        body.to_string()
    } else {
        format!("{}\n\n{}", kept.join("\n"), body)
    }
}

/// Split into (header block, body) when the text opens with headers
fn split_header_block(text: &str) -> Option<(&str, &str)> {
    let normalized_end = text
        .find("\r\n\r\n")
        .map(|i| (i, 4))
        .or_else(|| text.find("\n\n").map(|i| (i, 2)));
    let (head_end, sep_len) = normalized_end.unwrap_or((text.len(), 0));
    let head = &text[..head_end];

    let first = head.lines().next()?;
    let is_header = |line: &str| {
        line.split_once(':')
            .map(|(name, _)| !name.is_empty() && !name.contains(' ') && name.is_ascii())
            .unwrap_or(false)
    };
    if !is_header(first) {
        return None;
    }
    let all_headers = head
        .lines()
        .all(|l| is_header(l) || l.starts_with(' ') || l.starts_with('\t'));
    if !all_headers {
        return None;
    }

    Some((head, &text[head_end + sep_len..]))
}
