//! Answer module - the terminal, immutable output for one question

use crate::chunk::ChunkId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Text used for degraded answers
pub const PLACEHOLDER_ANSWER: &str = "Unable to determine answer from available information.";

/// Failure taxonomy used for logging, metrics and degraded-answer marking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Source unreachable, unauthorized, or non-2xx
    Fetch,
    /// Unsupported or corrupt document
    Parse,
    /// Query before build, or build on an empty chunk set
    IndexEmpty,
    /// Reasoning service failure or malformed output
    Reasoning,
    /// A suspension point exceeded its budget
    Timeout,
    /// Embedding service failure
    Embedding,
}

impl FailureKind {
    /// Whether a bounded retry may help
    pub fn is_retryable(&self) -> bool {
        matches!(self, FailureKind::Reasoning | FailureKind::Timeout)
    }

    /// Stable snake_case name
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Fetch => "fetch",
            FailureKind::Parse => "parse",
            FailureKind::IndexEmpty => "index_empty",
            FailureKind::Reasoning => "reasoning",
            FailureKind::Timeout => "timeout",
            FailureKind::Embedding => "embedding",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A supporting clause quoted verbatim from the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceClause {
    /// Chunk the clause was taken from
    pub chunk_id: ChunkId,
    /// Literal chunk text
    pub text: String,
    /// Composite matcher score of the chunk
    pub score: f32,
}

/// Final answer for one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// The question this answers
    pub question: String,
    /// Answer text
    pub text: String,
    /// Confidence in `[0, 1]`
    pub confidence: f64,
    /// Supporting clauses, best first
    pub sources: Vec<SourceClause>,
    /// Explanation returned by the reasoning service
    pub justification: String,
    /// Time spent on this question
    #[serde(with = "duration_secs")]
    pub processing_time: Duration,
    /// Set when the answer is a placeholder produced after a failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degraded: Option<FailureKind>,
}

impl Answer {
    /// Placeholder answer for a failed question
    pub fn placeholder(question: impl Into<String>, kind: FailureKind, elapsed: Duration) -> Self {
        Self {
            question: question.into(),
            text: PLACEHOLDER_ANSWER.to_string(),
            confidence: 0.0,
            sources: Vec::new(),
            justification: format!("Question could not be answered ({})", kind),
            processing_time: elapsed,
            degraded: Some(kind),
        }
    }

    /// True when this is a placeholder
    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Duration::try_from_secs_f64(secs.max(0.0)).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_has_zero_confidence() {
        let answer = Answer::placeholder("Q?", FailureKind::Reasoning, Duration::from_millis(5));
        assert_eq!(answer.confidence, 0.0);
        assert_eq!(answer.text, PLACEHOLDER_ANSWER);
        assert!(answer.sources.is_empty());
        assert!(answer.is_degraded());
        assert_eq!(answer.degraded, Some(FailureKind::Reasoning));
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(FailureKind::Reasoning.is_retryable());
        assert!(FailureKind::Timeout.is_retryable());
        assert!(!FailureKind::Fetch.is_retryable());
        assert!(!FailureKind::IndexEmpty.is_retryable());
    }

    #[test]
    fn test_failure_kind_display() {
        assert_eq!(FailureKind::IndexEmpty.to_string(), "index_empty");
        assert_eq!(FailureKind::Timeout.as_str(), "timeout");
    }
}
