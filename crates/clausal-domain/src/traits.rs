//! Capability traits for external services
//!
//! The pipeline depends on two black-box services: an embedding function and
//! a reasoning function. Production implementations live in `clausal-llm`;
//! deterministic stubs live next to the code that tests against them.

use async_trait::async_trait;
use thiserror::Error;

/// Failure reported by an external service
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// Service could not be reached or returned a server error
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Call exceeded its time budget
    #[error("Service call timed out after {0} ms")]
    Timeout(u64),

    /// Response could not be interpreted
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// Service refused the request (auth, unknown model, bad input)
    #[error("Request rejected: {0}")]
    Rejected(String),
}

impl ServiceError {
    /// Whether a retry may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, ServiceError::Unavailable(_) | ServiceError::Timeout(_))
    }
}

/// Text embedding capability: `text -> fixed-length vector`
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ServiceError>;

    /// Embed several texts, preserving order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ServiceError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    /// Dimension of produced vectors
    fn dimension(&self) -> usize;
}

/// Output of a reasoning call
#[derive(Debug, Clone, PartialEq)]
pub struct ReasonerResponse {
    /// Raw text returned by the service
    pub text: String,
    /// Certainty signal reported out of band, if the service provides one
    pub certainty: Option<f64>,
}

impl ReasonerResponse {
    /// Response with no out-of-band certainty
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            certainty: None,
        }
    }
}

/// Language reasoning capability: `prompt -> text (+ optional certainty)`
#[async_trait]
pub trait Reasoner: Send + Sync {
    /// Run one prompt
    async fn reason(&self, prompt: &str) -> Result<ReasonerResponse, ServiceError>;

    /// Model name, for logs and status output
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ConstantEmbedder;

    #[async_trait]
    impl Embedder for ConstantEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, ServiceError> {
            if text.is_empty() {
                return Err(ServiceError::Rejected("empty".into()));
            }
            Ok(vec![text.len() as f32, 1.0])
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    #[tokio::test]
    async fn test_default_embed_batch_preserves_order() {
        let embedder = ConstantEmbedder;
        let texts = vec!["a".to_string(), "abc".to_string()];
        let vectors = embedder.embed_batch(&texts).await.unwrap();
        assert_eq!(vectors, vec![vec![1.0, 1.0], vec![3.0, 1.0]]);
    }

    #[tokio::test]
    async fn test_default_embed_batch_stops_on_error() {
        let embedder = ConstantEmbedder;
        let texts = vec!["a".to_string(), String::new()];
        assert!(embedder.embed_batch(&texts).await.is_err());
    }

    #[test]
    fn test_transient_errors() {
        assert!(ServiceError::Timeout(10).is_transient());
        assert!(ServiceError::Unavailable("down".into()).is_transient());
        assert!(!ServiceError::Malformed("x".into()).is_transient());
        assert!(!ServiceError::Rejected("x".into()).is_transient());
    }
}
