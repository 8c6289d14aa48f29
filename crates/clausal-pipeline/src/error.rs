//! Error types for the pipeline

use clausal_domain::{FailureKind, ServiceError};
use clausal_index::IndexError;
use clausal_ingest::IngestError;
use thiserror::Error;

/// Errors raised while validating or loading configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A value is out of range or inconsistent with another
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// A clause-marker pattern does not compile
    #[error("Invalid clause marker pattern: {0}")]
    Pattern(String),

    /// TOML could not be parsed or produced
    #[error("TOML error: {0}")]
    Toml(String),

    /// Configuration file could not be read
    #[error("I/O error: {0}")]
    Io(String),
}

/// Errors that can occur while answering questions
///
/// The first five variants form the failure taxonomy reported on degraded
/// answers.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Source unreachable, unauthorized, or non-2xx
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Unsupported or corrupt document
    #[error("Parse error: {0}")]
    Parse(String),

    /// Query before build, or build on an empty chunk set
    #[error("Index is empty")]
    IndexEmpty,

    /// Reasoning service failure or malformed output
    #[error("Reasoning error: {0}")]
    Reasoning(String),

    /// A suspension point exceeded its budget
    #[error("{operation} timed out after {millis} ms")]
    Timeout {
        /// What was being waited on
        operation: String,
        /// Budget that was exceeded
        millis: u64,
    },

    /// Embedding service failure
    #[error("Embedding error: {0}")]
    Embedding(ServiceError),

    /// Configuration rejected
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl PipelineError {
    pub(crate) fn timeout(operation: impl Into<String>, millis: u64) -> Self {
        PipelineError::Timeout {
            operation: operation.into(),
            millis,
        }
    }

    /// Failure taxonomy entry, `None` for configuration errors
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            PipelineError::Fetch(_) => Some(FailureKind::Fetch),
            PipelineError::Parse(_) => Some(FailureKind::Parse),
            PipelineError::IndexEmpty => Some(FailureKind::IndexEmpty),
            PipelineError::Reasoning(_) => Some(FailureKind::Reasoning),
            PipelineError::Timeout { .. } => Some(FailureKind::Timeout),
            PipelineError::Embedding(_) => Some(FailureKind::Embedding),
            PipelineError::Config(_) => None,
        }
    }

    /// Whether the orchestrator may retry the failed step
    pub fn is_retryable(&self) -> bool {
        self.kind().is_some_and(|k| k.is_retryable())
    }
}

impl From<IngestError> for PipelineError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Timeout { location, millis } => {
                PipelineError::timeout(format!("Fetching '{}'", location), millis)
            }
            IngestError::Fetch { .. } => PipelineError::Fetch(err.to_string()),
            IngestError::Parse { .. } => PipelineError::Parse(err.to_string()),
        }
    }
}

impl From<IndexError> for PipelineError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::Empty => PipelineError::IndexEmpty,
            IndexError::Embedding(ServiceError::Timeout(ms)) => PipelineError::timeout("Embedding", ms),
            IndexError::Embedding(service) => PipelineError::Embedding(service),
            other => PipelineError::Embedding(ServiceError::Malformed(other.to_string())),
        }
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_errors_map_to_taxonomy() {
        let fetch: PipelineError = IngestError::Fetch {
            location: "a.pdf".into(),
            reason: "HTTP 404".into(),
        }
        .into();
        assert_eq!(fetch.kind(), Some(FailureKind::Fetch));

        let timeout: PipelineError = IngestError::Timeout {
            location: "a.pdf".into(),
            millis: 100,
        }
        .into();
        assert_eq!(timeout.kind(), Some(FailureKind::Timeout));
        assert!(timeout.is_retryable());
    }

    #[test]
    fn test_index_errors_map_to_taxonomy() {
        assert_eq!(PipelineError::from(IndexError::Empty).kind(), Some(FailureKind::IndexEmpty));
        assert_eq!(
            PipelineError::from(IndexError::Embedding(ServiceError::Timeout(5))).kind(),
            Some(FailureKind::Timeout)
        );
        assert_eq!(
            PipelineError::from(IndexError::DimensionMismatch { expected: 3, actual: 2 }).kind(),
            Some(FailureKind::Embedding)
        );
    }

    #[test]
    fn test_config_error_has_no_kind() {
        let err = PipelineError::from(ConfigError::Invalid("x".into()));
        assert_eq!(err.kind(), None);
        assert!(!err.is_retryable());
    }
}
