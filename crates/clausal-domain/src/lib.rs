//! Clausal Domain Layer
//!
//! This crate contains the data model shared by every stage of the
//! question-answering pipeline, plus the capability traits through which the
//! pipeline reaches external model services.
//!
//! ## Key Concepts
//!
//! - **Document**: Raw text fetched from a source, immutable once ingested
//! - **Chunk**: A bounded, overlap-aware segment of a document; the unit of retrieval
//! - **RetrievalResult**: Ranked `(chunk, score, rank)` hits for one query
//! - **Answer**: Final text, confidence in `[0, 1]`, and the literal supporting clauses
//! - **Embedder / Reasoner**: Black-box services behind async capability traits
//!
//! ## Lifecycle
//!
//! ```text
//! Document ─1:N─▶ Chunk ─1:1─▶ Embedding ─query─▶ RetrievalResult ─▶ Answer
//! ```
//!
//! Infrastructure implementations of the traits live in other crates
//! (`clausal-llm`, `clausal-index`).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod answer;
pub mod chunk;
pub mod confidence;
pub mod document;
pub mod query;
pub mod retrieval;
pub mod traits;

// Re-exports for convenience
pub use answer::{Answer, FailureKind, SourceClause, PLACEHOLDER_ANSWER};
pub use chunk::{Chunk, ChunkId};
pub use confidence::{blend_confidence, ConfidenceSignals, ConfidenceWeights};
pub use document::{ContentType, Document, DocumentId};
pub use query::{Query, RequestId};
pub use retrieval::{RetrievalHit, RetrievalResult};
pub use traits::{Embedder, Reasoner, ReasonerResponse, ServiceError};
