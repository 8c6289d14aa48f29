//! Clausal Model Provider Layer
//!
//! Implementations of the [`Reasoner`] and [`Embedder`] capabilities from
//! `clausal-domain`.
//!
//! # Providers
//!
//! - [`MockReasoner`]: deterministic scripted reasoner for tests
//! - [`OllamaReasoner`] / [`OllamaEmbedder`]: Ollama HTTP API
//!
//! # Examples
//!
//! ```
//! use clausal_domain::Reasoner;
//! use clausal_llm::MockReasoner;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let reasoner = MockReasoner::new(r#"{"answer": "30 days"}"#);
//! let response = reasoner.reason("grace period?").await.unwrap();
//! assert_eq!(response.text, r#"{"answer": "30 days"}"#);
//! # });
//! ```

#![warn(missing_docs)]

pub mod ollama;

use async_trait::async_trait;
use clausal_domain::{Embedder, Reasoner, ReasonerResponse, ServiceError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

pub use ollama::{OllamaConfig, OllamaEmbedder, OllamaReasoner};

/// Errors that can occur during provider operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Request exceeded its timeout
    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    /// Non-success HTTP status
    #[error("HTTP {status}: {message}")]
    Http {
        /// Status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Invalid response from the provider
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),
}

impl From<LlmError> for ServiceError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Timeout(ms) => ServiceError::Timeout(ms),
            LlmError::InvalidResponse(msg) => ServiceError::Malformed(msg),
            LlmError::ModelNotAvailable(model) => {
                ServiceError::Rejected(format!("Model not available: {}", model))
            }
            LlmError::Http { status, message } if (400..500).contains(&status) => {
                ServiceError::Rejected(format!("HTTP {}: {}", status, message))
            }
            other => ServiceError::Unavailable(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
enum Script {
    Respond(String),
    Fail(ServiceError),
    FailTimes { remaining: usize, error: ServiceError },
}

/// Mock reasoner for deterministic testing
///
/// Rules match when the prompt contains a configured substring; the first
/// matching rule wins. Without a match the default response is returned.
/// Clones share rules and the call counter.
///
/// # Examples
///
/// ```
/// use clausal_domain::{Reasoner, ServiceError};
/// use clausal_llm::MockReasoner;
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let reasoner = MockReasoner::new("default");
/// reasoner.add_response("grace", "30 days");
/// reasoner.add_error("maternity", ServiceError::Unavailable("down".into()));
///
/// assert_eq!(reasoner.reason("grace period?").await.unwrap().text, "30 days");
/// assert!(reasoner.reason("maternity cover?").await.is_err());
/// assert_eq!(reasoner.call_count(), 2);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MockReasoner {
    default_response: String,
    certainty: Option<f64>,
    delay: Option<Duration>,
    rules: Arc<Mutex<Vec<(String, Script)>>>,
    call_count: Arc<AtomicUsize>,
}

impl MockReasoner {
    /// Create a mock that answers every prompt with `response`
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            certainty: None,
            delay: None,
            rules: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Report this certainty out of band with every response
    pub fn with_certainty(mut self, certainty: f64) -> Self {
        self.certainty = Some(certainty);
        self
    }

    /// Sleep before answering, to exercise timeouts
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Respond with `response` when the prompt contains `needle`
    pub fn add_response(&self, needle: impl Into<String>, response: impl Into<String>) {
        self.push_rule(needle.into(), Script::Respond(response.into()));
    }

    /// Fail with `error` whenever the prompt contains `needle`
    pub fn add_error(&self, needle: impl Into<String>, error: ServiceError) {
        self.push_rule(needle.into(), Script::Fail(error));
    }

    /// Fail the first `times` matching calls, then fall through to other rules
    pub fn add_transient_error(&self, needle: impl Into<String>, times: usize, error: ServiceError) {
        self.push_rule(
            needle.into(),
            Script::FailTimes {
                remaining: times,
                error,
            },
        );
    }

    /// Number of `reason` calls so far
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Reset the call counter
    pub fn reset_call_count(&self) {
        self.call_count.store(0, Ordering::SeqCst);
    }

    fn push_rule(&self, needle: String, script: Script) {
        self.rules
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push((needle, script));
    }

    fn scripted(&self, prompt: &str) -> Result<String, ServiceError> {
        let mut rules = self.rules.lock().unwrap_or_else(|p| p.into_inner());
        for (needle, script) in rules.iter_mut() {
            if !prompt.contains(needle.as_str()) {
                continue;
            }
            match script {
                Script::Respond(text) => return Ok(text.clone()),
                Script::Fail(error) => return Err(error.clone()),
                Script::FailTimes { remaining, error } if *remaining > 0 => {
                    *remaining -= 1;
                    return Err(error.clone());
                }
                Script::FailTimes { .. } => continue,
            }
        }
        Ok(self.default_response.clone())
    }
}

impl Default for MockReasoner {
    fn default() -> Self {
        Self::new(r#"{"answer": "Default mock response", "reasoning": "mock"}"#)
    }
}

#[async_trait]
impl Reasoner for MockReasoner {
    async fn reason(&self, prompt: &str) -> Result<ReasonerResponse, ServiceError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let text = self.scripted(prompt)?;
        Ok(ReasonerResponse {
            text,
            certainty: self.certainty,
        })
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

/// Embedder that always fails, for exercising embedding-failure paths
#[derive(Debug, Clone)]
pub struct UnavailableEmbedder {
    dimension: usize,
}

impl UnavailableEmbedder {
    /// Create a failing embedder reporting `dimension`
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl Embedder for UnavailableEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, ServiceError> {
        Err(ServiceError::Unavailable("embedding service unavailable".to_string()))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_reasoner_default() {
        let reasoner = MockReasoner::new("Test response");
        let response = reasoner.reason("any prompt").await.unwrap();
        assert_eq!(response.text, "Test response");
        assert_eq!(response.certainty, None);
    }

    #[tokio::test]
    async fn test_mock_reasoner_substring_rules() {
        let reasoner = MockReasoner::default();
        reasoner.add_response("hello", "world");
        reasoner.add_response("foo", "bar");

        assert_eq!(reasoner.reason("say hello").await.unwrap().text, "world");
        assert_eq!(reasoner.reason("foo?").await.unwrap().text, "bar");
        assert!(reasoner.reason("unknown").await.unwrap().text.contains("Default mock response"));
    }

    #[tokio::test]
    async fn test_mock_reasoner_call_count_shared_by_clones() {
        let reasoner = MockReasoner::new("x");
        let clone = reasoner.clone();
        reasoner.reason("a").await.unwrap();
        clone.reason("b").await.unwrap();
        assert_eq!(reasoner.call_count(), 2);

        reasoner.reset_call_count();
        assert_eq!(clone.call_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_reasoner_transient_error() {
        let reasoner = MockReasoner::new("recovered");
        reasoner.add_transient_error("flaky", 1, ServiceError::Timeout(5));

        assert!(matches!(reasoner.reason("flaky").await, Err(ServiceError::Timeout(5))));
        assert_eq!(reasoner.reason("flaky").await.unwrap().text, "recovered");
    }

    #[tokio::test]
    async fn test_mock_reasoner_certainty() {
        let reasoner = MockReasoner::new("x").with_certainty(0.9);
        assert_eq!(reasoner.reason("q").await.unwrap().certainty, Some(0.9));
    }

    #[tokio::test]
    async fn test_unavailable_embedder() {
        let embedder = UnavailableEmbedder::new(8);
        assert!(embedder.embed("x").await.is_err());
        assert_eq!(embedder.dimension(), 8);
    }

    #[test]
    fn test_error_mapping() {
        assert_eq!(ServiceError::from(LlmError::Timeout(10)), ServiceError::Timeout(10));
        assert!(matches!(
            ServiceError::from(LlmError::ModelNotAvailable("m".into())),
            ServiceError::Rejected(_)
        ));
        assert!(matches!(
            ServiceError::from(LlmError::Http { status: 503, message: "busy".into() }),
            ServiceError::Unavailable(_)
        ));
        assert!(matches!(
            ServiceError::from(LlmError::Http { status: 401, message: "no".into() }),
            ServiceError::Rejected(_)
        ));
        assert!(matches!(
            ServiceError::from(LlmError::InvalidResponse("x".into())),
            ServiceError::Malformed(_)
        ));
    }
}
