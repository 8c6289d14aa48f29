//! Query module - a question against a document set

use serde::{Deserialize, Serialize};
use std::fmt;

/// Correlation id for one request (document set + question batch)
///
/// Based on UUIDv7 so ids sort chronologically in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u128);

impl RequestId {
    /// Generate a new UUIDv7-based RequestId
    ///
    /// # Examples
    ///
    /// ```
    /// use clausal_domain::RequestId;
    ///
    /// let id = RequestId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Parse a RequestId from its string form
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid request id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// A natural-language question against a set of documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Question text
    pub text: String,
    /// Sources of the document set the question is asked against
    pub documents: Vec<String>,
    /// Optional conversation/session correlation id supplied by the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl Query {
    /// Create a query without a session id
    pub fn new(text: impl Into<String>, documents: Vec<String>) -> Self {
        Self {
            text: text.into(),
            documents,
            session_id: None,
        }
    }

    /// Attach a session correlation id
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}
