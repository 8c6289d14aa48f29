//! Configuration file parsing for the server.
//!
//! Loads the bind address, bearer token, model endpoints and an optional
//! inline `[pipeline]` table from TOML. The token may also come from the
//! `CLAUSAL_AUTH_TOKEN` environment variable, which takes precedence.

use clausal_llm::OllamaConfig;
use clausal_pipeline::PipelineConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Environment variable overriding `auth_token`
pub const AUTH_TOKEN_ENV: &str = "CLAUSAL_AUTH_TOKEN";

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// Pipeline section rejected
    #[error(transparent)]
    Pipeline(#[from] clausal_pipeline::ConfigError),
}

/// Which embedder backs the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Ollama embedding model
    #[default]
    Ollama,
    /// Local hashed bag-of-words, no model server needed
    Hash,
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 8000)
    pub bind_port: u16,

    /// Static bearer token required on query endpoints
    #[serde(default)]
    pub auth_token: String,

    /// Embedder used for indexing and queries
    #[serde(default)]
    pub embedding_backend: EmbeddingBackend,

    /// Let clients name files on the server's filesystem; off unless set
    #[serde(default)]
    pub allow_local_documents: bool,

    /// Model server settings
    #[serde(default)]
    pub models: OllamaConfig,

    /// Pipeline settings
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl ServerConfig {
    /// Load configuration from a TOML file
    ///
    /// `CLAUSAL_AUTH_TOKEN` overrides the file's `auth_token`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: ServerConfig = toml::from_str(&contents)?;
        config.apply_token_override(std::env::var(AUTH_TOKEN_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    /// Replace the token when `token` is set and non-empty
    pub fn apply_token_override(&mut self, token: Option<String>) {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.auth_token = token;
        }
    }

    /// Check required fields and the pipeline section
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth_token.trim().is_empty() {
            return Err(ConfigError::MissingField("auth_token".to_string()));
        }
        self.pipeline.validate()?;
        Ok(())
    }

    /// Create a default configuration for testing
    pub fn default_test_config() -> Self {
        ServerConfig {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8000,
            auth_token: "test-token-do-not-use-in-production".to_string(),
            embedding_backend: EmbeddingBackend::Hash,
            allow_local_documents: false,
            models: OllamaConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}
