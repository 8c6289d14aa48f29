//! Clausal Embedding Index
//!
//! Computes one embedding per chunk through an [`Embedder`](clausal_domain::Embedder)
//! and answers nearest-neighbour queries by exact cosine similarity.
//!
//! # Components
//!
//! - [`EmbeddingIndex`]: build-once, read-only index shared as an [`IndexHandle`]
//! - [`HashEmbedder`]: deterministic bag-of-words embedder for tests and offline use
//! - [`IndexCache`]: optional reuse of built indexes across requests
//!
//! # Examples
//!
//! ```
//! use clausal_domain::{ContentType, Document, Embedder};
//! use clausal_index::{EmbeddingIndex, HashEmbedder};
//!
//! # tokio_test_block(async {
//! let embedder = HashEmbedder::new(64);
//! let doc = Document::new("a.txt", "grace period", ContentType::PlainText, 0);
//! let chunk = clausal_domain::Chunk {
//!     id: clausal_domain::ChunkId::new(&doc.id, 0),
//!     document_id: doc.id.clone(),
//!     sequence: 0,
//!     text: doc.text.clone(),
//!     start: 0,
//!     end: doc.text.len(),
//!     word_count: 2,
//!     overlap_words: 0,
//! };
//! let index = EmbeddingIndex::build(vec![chunk], &embedder).await.unwrap();
//! let query = embedder.embed("grace").await.unwrap();
//! assert_eq!(index.query(&query, 5).unwrap().len(), 1);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

#![warn(missing_docs)]

pub mod cache;
pub mod embedding;
pub mod vector_index;

pub use cache::IndexCache;
pub use embedding::{cosine_similarity, HashEmbedder};
pub use vector_index::{EmbeddingIndex, IndexError, IndexHandle};
