//! Ollama Provider Implementation
//!
//! Production [`Reasoner`] and [`Embedder`] backed by a local or remote
//! Ollama server.
//!
//! # Features
//!
//! - Async HTTP communication with the Ollama API
//! - Configurable endpoint, models and sampling
//! - JSON-mode generation for structured answers
//! - Per-call timeout mapped to [`ServiceError::Timeout`]
//!
//! Retries are not performed here; the caller owns retry policy.
//!
//! # Examples
//!
//! ```no_run
//! use clausal_llm::{OllamaConfig, OllamaReasoner};
//!
//! let reasoner = OllamaReasoner::new(OllamaConfig::default()).unwrap();
//! ```

use crate::LlmError;
use async_trait::async_trait;
use clausal_domain::{Embedder, Reasoner, ReasonerResponse, ServiceError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default reasoning model
pub const DEFAULT_REASONING_MODEL: &str = "llama3.1";

/// Default embedding model
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-minilm";

/// Dimension of the default embedding model
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 384;

/// Default timeout for a single request (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection and model settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server
    pub endpoint: String,
    /// Model used for reasoning
    pub reasoning_model: String,
    /// Model used for embeddings
    pub embedding_model: String,
    /// Dimension of vectors produced by `embedding_model`
    pub embedding_dimension: usize,
    /// Sampling temperature for reasoning
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            reasoning_model: DEFAULT_REASONING_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_dimension: DEFAULT_EMBEDDING_DIMENSION,
            temperature: 0.1,
            max_tokens: 2000,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

fn build_client(config: &OllamaConfig) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| LlmError::Communication(format!("Failed to build HTTP client: {}", e)))
}

fn endpoint_url(config: &OllamaConfig, path: &str) -> String {
    format!("{}{}", config.endpoint.trim_end_matches('/'), path)
}

/// Send a JSON request and decode the JSON reply
async fn post_json<Req, Resp>(
    client: &reqwest::Client,
    url: &str,
    model: &str,
    timeout_secs: u64,
    body: &Req,
) -> Result<Resp, LlmError>
where
    Req: Serialize + ?Sized,
    Resp: for<'de> Deserialize<'de>,
{
    let response = client.post(url).json(body).send().await.map_err(|e| {
        if e.is_timeout() {
            LlmError::Timeout(timeout_secs * 1000)
        } else {
            LlmError::Communication(format!("Request failed: {}", e))
        }
    })?;

    let status = response.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(LlmError::ModelNotAvailable(model.to_string()));
    }
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(LlmError::RateLimitExceeded);
    }
    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(LlmError::Http {
            status: status.as_u16(),
            message: error_text,
        });
    }

    response
        .json::<Resp>()
        .await
        .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))
}

/// Request body for the generate API
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    format: &'a str,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

/// Response from the generate API
#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Reasoning service backed by Ollama's `/api/generate`
#[derive(Debug, Clone)]
pub struct OllamaReasoner {
    config: OllamaConfig,
    client: reqwest::Client,
}

impl OllamaReasoner {
    /// Create a reasoner
    pub fn new(config: OllamaConfig) -> Result<Self, LlmError> {
        let client = build_client(&config)?;
        Ok(Self { config, client })
    }

    /// Active configuration
    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    /// Generate a completion for `prompt`
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let url = endpoint_url(&self.config, "/api/generate");
        let body = GenerateRequest {
            model: &self.config.reasoning_model,
            prompt,
            stream: false,
            format: "json",
            options: GenerateOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_tokens,
            },
        };

        debug!(model = %self.config.reasoning_model, prompt_chars = prompt.len(), "Calling reasoning model");
        let response: GenerateResponse = post_json(
            &self.client,
            &url,
            &self.config.reasoning_model,
            self.config.timeout_secs,
            &body,
        )
        .await?;
        Ok(response.response)
    }
}

#[async_trait]
impl Reasoner for OllamaReasoner {
    async fn reason(&self, prompt: &str) -> Result<ReasonerResponse, ServiceError> {
        let text = self.generate(prompt).await?;
        Ok(ReasonerResponse::text(text))
    }

    fn model_name(&self) -> &str {
        &self.config.reasoning_model
    }
}

/// Request body for the embed API
#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

/// Response from the embed API
#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Embedding service backed by Ollama's `/api/embed`
#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    config: OllamaConfig,
    client: reqwest::Client,
}

impl OllamaEmbedder {
    /// Create an embedder
    pub fn new(config: OllamaConfig) -> Result<Self, LlmError> {
        let client = build_client(&config)?;
        Ok(Self { config, client })
    }

    /// Embed a batch of texts in one request
    pub async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = endpoint_url(&self.config, "/api/embed");
        let body = EmbedRequest {
            model: &self.config.embedding_model,
            input: texts,
        };

        debug!(model = %self.config.embedding_model, inputs = texts.len(), "Calling embedding model");
        let response: EmbedResponse = post_json(
            &self.client,
            &url,
            &self.config.embedding_model,
            self.config.timeout_secs,
            &body,
        )
        .await?;

        if response.embeddings.len() != texts.len() {
            return Err(LlmError::InvalidResponse(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                response.embeddings.len()
            )));
        }
        if let Some(bad) = response
            .embeddings
            .iter()
            .find(|v| v.len() != self.config.embedding_dimension)
        {
            return Err(LlmError::InvalidResponse(format!(
                "Expected dimension {}, got {}",
                self.config.embedding_dimension,
                bad.len()
            )));
        }

        Ok(response.embeddings)
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ServiceError> {
        let mut vectors = self.embed_many(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| ServiceError::Malformed("No embedding returned".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ServiceError> {
        Ok(self.embed_many(texts).await?)
    }

    fn dimension(&self) -> usize {
        self.config.embedding_dimension
    }
}
