//! Clausal Pipeline
//!
//! Answers questions about a document set with grounded, scored answers.
//!
//! # Architecture
//!
//! ```text
//! documents ─▶ Ingestor ─▶ Chunker ─▶ EmbeddingIndex            (once per request)
//! question  ─▶ ClauseMatcher ─▶ LogicEvaluator ─▶ assemble ─▶ Answer  (per question)
//! ```
//!
//! # Key Features
//!
//! - **Clause matching**: similarity re-ranked by key-term overlap and
//!   clause-marker presence, with optional `demote` / `drop` structured modes
//! - **Bounded prompts**: lowest-ranked context is dropped first
//! - **Failure isolation**: a failed question yields a degraded answer and
//!   never affects the rest of the batch
//! - **Deadlines**: every network call is bounded by the request deadline
//!
//! # Example Usage
//!
//! ```no_run
//! use clausal_index::HashEmbedder;
//! use clausal_llm::MockReasoner;
//! use clausal_pipeline::{Orchestrator, PipelineConfig, QueryRequest};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let orchestrator = Orchestrator::new(
//!     Arc::new(PipelineConfig::default()),
//!     Arc::new(HashEmbedder::new(384)),
//!     Arc::new(MockReasoner::new(r#"{"answer": "Thirty days"}"#)),
//! )?;
//!
//! let outcome = orchestrator
//!     .process(&QueryRequest {
//!         documents: vec!["policy.pdf".into()],
//!         questions: vec!["What is the grace period?".into()],
//!     })
//!     .await;
//! println!("{}", serde_json::to_string_pretty(&outcome.detailed())?);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod assembler;
pub mod config;
pub mod deadline;
pub mod error;
pub mod evaluator;
pub mod matcher;
pub mod metrics;
pub mod orchestrator;
pub mod parser;
pub mod prompt;
pub mod terms;

pub use assembler::{assemble, BasicResponse, BatchSummary, DetailedResponse, QuestionBreakdown};
pub use config::{
    CacheConfig, EvaluatorConfig, LimitsConfig, MatcherConfig, PipelineConfig, RetrievalConfig,
    StructuredMode,
};
pub use deadline::Deadline;
pub use error::{ConfigError, PipelineError, Result};
pub use evaluator::{Evaluation, LogicEvaluator};
pub use matcher::{ClauseMatcher, MatchSet, MatchedChunk};
pub use metrics::BatchMetrics;
pub use orchestrator::{BatchOutcome, Orchestrator, QueryRequest, RequestState};
pub use parser::{parse_reasoner_output, ParsedAnswer};
pub use terms::extract_key_terms;
