//! HTTP request handlers for the question-answering service.
//!
//! Query endpoints sit behind bearer authentication; health and status do
//! not. Query endpoints always answer 200 with one entry per question, using
//! placeholder answers for anything that failed.

use crate::auth::{require_bearer, AuthError, BearerAuth};
use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use clausal_pipeline::{BasicResponse, DetailedResponse, Orchestrator, QueryRequest, StructuredMode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Pipeline shared by every request
    pub orchestrator: Arc<Orchestrator>,
    /// Bearer token checker
    pub auth: Arc<BearerAuth>,
    /// Static description of the running configuration
    pub status: Arc<SystemStatus>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Always "healthy" while the process serves requests
    pub status: String,
}

/// System status: configured models and chunking, no index state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStatus {
    /// Always "operational"
    pub status: String,
    /// Reasoning model name
    pub reasoning_model: String,
    /// Embedding model name
    pub embedding_model: String,
    /// Embedding dimension
    pub embedding_dimension: usize,
    /// Maximum words per chunk
    pub max_chunk_words: usize,
    /// Overlap words between chunks
    pub overlap_words: usize,
    /// Candidates retrieved per question
    pub top_k: usize,
    /// Clause filtering mode
    pub structured_mode: StructuredMode,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Missing or wrong bearer token
    Unauthorized(AuthError),
    /// Request rejected before processing
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Unauthorized(e) => (StatusCode::UNAUTHORIZED, e.to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        AppError::Unauthorized(e)
    }
}

fn check_request(request: &QueryRequest) -> Result<(), AppError> {
    if request.questions.is_empty() {
        return Err(AppError::BadRequest("At least one question is required".to_string()));
    }
    if request.documents.is_empty() {
        return Err(AppError::BadRequest("At least one document is required".to_string()));
    }
    Ok(())
}

/// POST /api/v1/hackrx/run - Answers only
async fn run_basic(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<BasicResponse>, AppError> {
    check_request(&request)?;
    let outcome = state.orchestrator.process(&request).await;
    info!(request_id = %outcome.request_id, state = %outcome.state, "Request served");
    Ok(Json(outcome.basic()))
}

/// POST /api/v1/hackrx/run/detailed - Answers with scores, sources and breakdown
async fn run_detailed(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<DetailedResponse>, AppError> {
    check_request(&request)?;
    let outcome = state.orchestrator.process(&request).await;
    info!(request_id = %outcome.request_id, state = %outcome.state, "Detailed request served");
    Ok(Json(outcome.detailed()))
}

/// GET /api/v1/health - Process liveness
async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
    })
}

/// GET /api/v1/status - Configured models and parameters
async fn system_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(state.status.as_ref().clone())
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    let protected = AxumRouter::new()
        .route("/api/v1/hackrx/run", post(run_basic))
        .route("/api/v1/hackrx/run/detailed", post(run_detailed))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer));

    AxumRouter::new()
        .merge(protected)
        .route("/api/v1/health", get(health_check))
        .route("/api/v1/status", get(system_status))
        .with_state(state)
}
