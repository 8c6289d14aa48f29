//! Clausal Server
//!
//! HTTP boundary for the question-answering pipeline: bearer-token
//! authentication, the `hackrx/run` query endpoints, health and status.

#![warn(missing_docs)]

pub mod auth;
pub mod config;
pub mod handlers;

use auth::BearerAuth;
use clausal_domain::Embedder;
use clausal_index::HashEmbedder;
use clausal_llm::{LlmError, OllamaEmbedder, OllamaReasoner};
use clausal_pipeline::{Orchestrator, PipelineError};
use config::{EmbeddingBackend, ServerConfig};
use handlers::{create_router, AppState, SystemStatus};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Model client could not be created
    #[error("Model client error: {0}")]
    Llm(#[from] LlmError),

    /// Pipeline could not be created
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Build the shared state from configuration
pub fn build_state(config: &ServerConfig) -> Result<AppState, ServerError> {
    let mut pipeline = config.pipeline.clone();
    pipeline.limits.allow_local_paths = config.allow_local_documents;
    let pipeline = Arc::new(pipeline);
    let reasoner = Arc::new(OllamaReasoner::new(config.models.clone())?);

    let (embedder, embedding_model, embedding_dimension): (Arc<dyn Embedder>, String, usize) =
        match config.embedding_backend {
            EmbeddingBackend::Ollama => (
                Arc::new(OllamaEmbedder::new(config.models.clone())?),
                config.models.embedding_model.clone(),
                config.models.embedding_dimension,
            ),
            EmbeddingBackend::Hash => {
                let embedder = HashEmbedder::new(config.models.embedding_dimension);
                let dimension = embedder.dimension();
                (Arc::new(embedder), "hash".to_string(), dimension)
            }
        };

    let status = SystemStatus {
        status: "operational".to_string(),
        reasoning_model: config.models.reasoning_model.clone(),
        embedding_model,
        embedding_dimension,
        max_chunk_words: pipeline.chunking.max_words,
        overlap_words: pipeline.chunking.overlap_words,
        top_k: pipeline.retrieval.top_k,
        structured_mode: pipeline.matcher.structured_mode,
    };

    Ok(AppState {
        orchestrator: Arc::new(Orchestrator::new(pipeline, embedder, reasoner)?),
        auth: Arc::new(BearerAuth::new(config.auth_token.clone())),
        status: Arc::new(status),
    })
}

/// Start the HTTP server
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    info!("Starting Clausal server");
    info!("Bind address: {}", config.bind_addr());
    info!(
        "Models: reasoning={} embedding={:?}/{}",
        config.models.reasoning_model, config.embedding_backend, config.models.embedding_model
    );

    let state = build_state(&config)?;
    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Server listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}
