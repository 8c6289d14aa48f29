//! Static bearer-token authentication.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use thiserror::Error;

use crate::handlers::{AppError, AppState};

/// Authentication failure
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization: Bearer` header
    #[error("Missing bearer token")]
    MissingToken,

    /// Token does not match
    #[error("Invalid bearer token")]
    InvalidToken,
}

/// Checks requests against a single configured token
pub struct BearerAuth {
    token: String,
}

impl BearerAuth {
    /// Create a checker for `token`
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Validate the `Authorization` header
    pub fn verify(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        let presented = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        if constant_time_eq(presented.as_bytes(), self.token.as_bytes()) {
            Ok(())
        } else {
            Err(AuthError::InvalidToken)
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Middleware rejecting requests without the configured token
pub async fn require_bearer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    state.auth.verify(request.headers())?;
    Ok(next.run(request).await)
}
