//! Integration tests for the HTTP boundary

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use clausal_index::HashEmbedder;
use clausal_llm::MockReasoner;
use clausal_pipeline::{DetailedResponse, Orchestrator, PipelineConfig, StructuredMode};
use clausal_server::auth::BearerAuth;
use clausal_server::handlers::{create_router, AppState, HealthCheckResponse, SystemStatus};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt; // for oneshot

const TOKEN: &str = "test-token";

/// Helper to create test application state
fn create_test_state(reasoner: MockReasoner) -> AppState {
    create_state_with(PipelineConfig::default(), reasoner)
}

fn create_state_with(config: PipelineConfig, reasoner: MockReasoner) -> AppState {
    let orchestrator = Orchestrator::new(
        Arc::new(config),
        Arc::new(HashEmbedder::new(128)),
        Arc::new(reasoner),
    )
    .unwrap();

    AppState {
        orchestrator: Arc::new(orchestrator),
        auth: Arc::new(BearerAuth::new(TOKEN)),
        status: Arc::new(SystemStatus {
            status: "operational".to_string(),
            reasoning_model: "mock".to_string(),
            embedding_model: "hash".to_string(),
            embedding_dimension: 128,
            max_chunk_words: 1000,
            overlap_words: 200,
            top_k: 10,
            structured_mode: StructuredMode::Off,
        }),
    }
}

fn policy_file(dir: &TempDir) -> String {
    let path = dir.path().join("policy.txt");
    std::fs::write(
        &path,
        "4.1 Grace Period\nA grace period of thirty days is allowed for premium payment.\n\n\
         4.2 Room Rent\nRoom rent is capped at one percent of the sum insured.",
    )
    .unwrap();
    path.to_string_lossy().into_owned()
}

fn run_request(uri: &str, token: Option<&str>, body: String) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body)).unwrap()
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_check_needs_no_token() {
    let app = create_router(create_test_state(MockReasoner::default()));

    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let health: HealthCheckResponse = body_json(response).await;
    assert_eq!(health.status, "healthy");
}

#[tokio::test]
async fn test_status_reports_configuration() {
    let app = create_router(create_test_state(MockReasoner::default()));

    let request = Request::builder()
        .uri("/api/v1/status")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let status: SystemStatus = body_json(response).await;
    assert_eq!(status.reasoning_model, "mock");
    assert_eq!(status.embedding_dimension, 128);
}

#[tokio::test]
async fn test_run_requires_token() {
    let app = create_router(create_test_state(MockReasoner::default()));
    let body = r#"{"documents": ["a.txt"], "questions": ["q"]}"#.to_string();

    let response = app
        .clone()
        .oneshot(run_request("/api/v1/hackrx/run", None, body.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(run_request("/api/v1/hackrx/run", Some("wrong"), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_run_basic() {
    let dir = TempDir::new().unwrap();
    let doc = policy_file(&dir);
    let reasoner = MockReasoner::new(r#"{"answer": "Thirty days.", "confidence": 0.9}"#);
    let app = create_router(create_test_state(reasoner));

    let body = serde_json::json!({
        "documents": [doc],
        "questions": ["What is the grace period?", "What is the room rent limit?"],
    })
    .to_string();
    let response = app
        .oneshot(run_request("/api/v1/hackrx/run", Some(TOKEN), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = body_json(response).await;
    let answers = json["answers"].as_array().unwrap();
    assert_eq!(answers.len(), 2);
    assert_eq!(answers[0], "Thirty days.");
    assert!(json.get("confidence_scores").is_none());
}

#[tokio::test]
async fn test_run_detailed() {
    let dir = TempDir::new().unwrap();
    let doc = policy_file(&dir);
    let reasoner = MockReasoner::new(r#"{"answer": "Thirty days.", "confidence": 0.9}"#);
    let app = create_router(create_test_state(reasoner));

    let body = serde_json::json!({
        "documents": [doc],
        "questions": ["What is the grace period?"],
    })
    .to_string();
    let response = app
        .oneshot(run_request("/api/v1/hackrx/run/detailed", Some(TOKEN), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let detailed: DetailedResponse = body_json(response).await;
    assert_eq!(detailed.answers.len(), 1);
    assert_eq!(detailed.confidence_scores.len(), 1);
    assert!((0.0..=1.0).contains(&detailed.confidence_scores[0]));
    assert!(detailed.source_clauses[0].contains("grace period"));
    assert_eq!(detailed.summary.total_questions, 1);
}

#[tokio::test]
async fn test_unreachable_document_degrades_not_errors() {
    let app = create_router(create_test_state(MockReasoner::default()));
    let body = serde_json::json!({
        "documents": ["/nonexistent/policy.pdf"],
        "questions": ["q1", "q2"],
    })
    .to_string();

    let response = app
        .oneshot(run_request("/api/v1/hackrx/run/detailed", Some(TOKEN), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let detailed: DetailedResponse = body_json(response).await;
    assert_eq!(detailed.answers.len(), 2);
    assert!(detailed.confidence_scores.iter().all(|c| *c == 0.0));
    assert_eq!(detailed.summary.degraded, 2);
}

#[tokio::test]
async fn test_local_paths_refused_when_disabled() {
    let dir = TempDir::new().unwrap();
    let secret = dir.path().join("secret.txt");
    std::fs::write(&secret, "root:x:0:0:root:/root:/bin/bash").unwrap();

    let mut config = PipelineConfig::default();
    config.limits.allow_local_paths = false;
    let app = create_router(create_state_with(config, MockReasoner::default()));
    let body = serde_json::json!({
        "documents": ["/etc/passwd", secret.to_string_lossy()],
        "questions": ["Who is root?"],
    })
    .to_string();

    let response = app
        .oneshot(run_request("/api/v1/hackrx/run/detailed", Some(TOKEN), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let detailed: DetailedResponse = body_json(response).await;
    assert_eq!(detailed.answers.len(), 1);
    assert_eq!(detailed.confidence_scores, vec![0.0]);
    assert_eq!(detailed.summary.degraded, 1);
    assert!(!detailed.source_clauses[0].contains("root:"));
    assert!(!detailed.answers[0].contains("root:"));
}

#[tokio::test]
async fn test_empty_questions_rejected() {
    let app = create_router(create_test_state(MockReasoner::default()));
    let body = r#"{"documents": ["a.txt"], "questions": []}"#.to_string();
    let response = app
        .oneshot(run_request("/api/v1/hackrx/run", Some(TOKEN), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
