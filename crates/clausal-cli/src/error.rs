//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pipeline settings rejected
    #[error("Pipeline configuration error: {0}")]
    Pipeline(#[from] clausal_pipeline::ConfigError),

    /// Pipeline could not be assembled
    #[error("Pipeline error: {0}")]
    Setup(#[from] clausal_pipeline::PipelineError),

    /// Model client could not be created
    #[error("Model client error: {0}")]
    Llm(#[from] clausal_llm::LlmError),

    /// Document could not be loaded
    #[error("Ingestion error: {0}")]
    Ingest(#[from] clausal_ingest::IngestError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
