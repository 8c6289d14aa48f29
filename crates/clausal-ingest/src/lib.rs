//! Clausal Ingestion
//!
//! Turns a source locator into a [`Document`](clausal_domain::Document) and
//! a document into [`Chunk`](clausal_domain::Chunk)s.
//!
//! # Pipeline
//!
//! ```text
//! locator ─fetch─▶ bytes ─detect─▶ ContentType ─extract─▶ text ─clean─▶ Document
//! Document ─paragraphs/sentences/words─▶ Vec<Chunk>
//! ```
//!
//! # Example
//!
//! ```
//! use clausal_domain::{ContentType, Document};
//! use clausal_ingest::Chunker;
//!
//! let doc = Document::new("memo.txt", "1. Scope\n\nApplies to all staff.", ContentType::PlainText, 0);
//! let chunks = Chunker::new(1000, 200).chunk(&doc);
//! assert_eq!(chunks.len(), 1);
//! ```

#![warn(missing_docs)]

pub mod chunker;
pub mod clean;
pub mod error;
pub mod extract;
pub mod ingestor;
pub mod source;

pub use chunker::{Chunker, ChunkingConfig};
pub use clean::{clean_text, strip_email_headers};
pub use error::{ExtractError, IngestError, Result};
pub use extract::extract_text;
pub use ingestor::{IngestConfig, Ingestor};
pub use source::DocumentSource;
