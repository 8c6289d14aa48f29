//! Error types for document ingestion

use clausal_domain::FailureKind;
use thiserror::Error;

/// Errors that can occur while ingesting a document
#[derive(Error, Debug)]
pub enum IngestError {
    /// Source unreachable, unauthorized, missing, or non-2xx
    #[error("Failed to fetch '{location}': {reason}")]
    Fetch {
        /// Source locator
        location: String,
        /// What went wrong
        reason: String,
    },

    /// Unsupported, oversized, or corrupt content
    #[error("Failed to parse '{location}': {reason}")]
    Parse {
        /// Source locator
        location: String,
        /// What went wrong
        reason: String,
    },

    /// Fetch exceeded its time budget
    #[error("Fetching '{location}' timed out after {millis} ms")]
    Timeout {
        /// Source locator
        location: String,
        /// Budget that was exceeded
        millis: u64,
    },
}

impl IngestError {
    pub(crate) fn fetch(location: &str, reason: impl ToString) -> Self {
        IngestError::Fetch {
            location: location.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn parse(location: &str, reason: impl ToString) -> Self {
        IngestError::Parse {
            location: location.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Failure taxonomy entry for this error
    pub fn kind(&self) -> FailureKind {
        match self {
            IngestError::Fetch { .. } => FailureKind::Fetch,
            IngestError::Parse { .. } => FailureKind::Parse,
            IngestError::Timeout { .. } => FailureKind::Timeout,
        }
    }
}

/// Errors from format-specific text extraction
#[derive(Error, Debug)]
pub enum ExtractError {
    /// PDF could not be decoded
    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    /// DOCX container or XML could not be decoded
    #[error("DOCX extraction failed: {0}")]
    Docx(String),

    /// Bytes are not valid UTF-8 text
    #[error("Content is not valid UTF-8 text")]
    NotText,
}

/// Result type for ingestion
pub type Result<T> = std::result::Result<T, IngestError>;
