//! Exact cosine-similarity index over chunk embeddings
//!
//! # Architecture
//!
//! - Built once per document set by [`EmbeddingIndex::build`]
//! - Immutable afterwards and shared as an [`IndexHandle`] (`Arc`)
//! - Queries scan every vector; results are deterministic, ties broken by
//!   insertion position (document order, then chunk sequence)

use crate::embedding::cosine_similarity;
use clausal_domain::{Chunk, ChunkId, Embedder, RetrievalResult, ServiceError};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Shared read-only handle to a built index
pub type IndexHandle = Arc<EmbeddingIndex>;

/// Errors that can occur during index operations
#[derive(Error, Debug)]
pub enum IndexError {
    /// Queried before build, or built from an empty chunk set
    #[error("Index is empty")]
    Empty,

    /// Vector length differs from the index dimension
    #[error("Invalid embedding dimension: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension provided
        actual: usize,
    },

    /// Embedder returned the wrong number of vectors
    #[error("Embedder returned {actual} vectors for {expected} chunks")]
    CountMismatch {
        /// Number of chunks submitted
        expected: usize,
        /// Number of vectors returned
        actual: usize,
    },

    /// Embedding service failed
    #[error("Embedding failed: {0}")]
    Embedding(#[from] ServiceError),
}

#[derive(Debug)]
struct IndexEntry {
    chunk: Chunk,
    vector: Vec<f32>,
}

/// In-memory index of `(chunk, vector)` pairs
///
/// Every indexed chunk has exactly one vector and every vector has the same
/// dimension.
#[derive(Debug)]
pub struct EmbeddingIndex {
    dimension: usize,
    entries: Vec<IndexEntry>,
    positions: HashMap<ChunkId, usize>,
}

impl EmbeddingIndex {
    /// An index with no entries
    pub fn empty(dimension: usize) -> Self {
        Self {
            dimension,
            entries: Vec::new(),
            positions: HashMap::new(),
        }
    }

    /// Embed `chunks` and build an index over them
    ///
    /// An empty chunk list yields an empty index without calling the
    /// embedder. Building replaces; there is no incremental update.
    pub async fn build(chunks: Vec<Chunk>, embedder: &dyn Embedder) -> Result<IndexHandle, IndexError> {
        let dimension = embedder.dimension();
        if chunks.is_empty() {
            debug!("Building empty index");
            return Ok(Arc::new(Self::empty(dimension)));
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = embedder.embed_batch(&texts).await?;

        let index = Self::from_vectors(dimension, chunks, vectors)?;
        info!(chunks = index.len(), dimension, "Embedding index built");
        Ok(Arc::new(index))
    }

    /// Assemble an index from precomputed vectors
    pub fn from_vectors(
        dimension: usize,
        chunks: Vec<Chunk>,
        vectors: Vec<Vec<f32>>,
    ) -> Result<Self, IndexError> {
        if vectors.len() != chunks.len() {
            return Err(IndexError::CountMismatch {
                expected: chunks.len(),
                actual: vectors.len(),
            });
        }

        let mut index = Self::empty(dimension);
        for (chunk, vector) in chunks.into_iter().zip(vectors) {
            if vector.len() != dimension {
                return Err(IndexError::DimensionMismatch {
                    expected: dimension,
                    actual: vector.len(),
                });
            }
            index.positions.insert(chunk.id.clone(), index.entries.len());
            index.entries.push(IndexEntry { chunk, vector });
        }

        Ok(index)
    }

    /// Top `top_k` chunks by cosine similarity to `vector`
    ///
    /// `top_k` is clamped to the number of indexed chunks.
    pub fn query(&self, vector: &[f32], top_k: usize) -> Result<RetrievalResult, IndexError> {
        if self.entries.is_empty() {
            return Err(IndexError::Empty);
        }
        if vector.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }

        let scored = self
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| {
                (
                    entry.chunk.id.clone(),
                    position,
                    cosine_similarity(vector, &entry.vector),
                )
            })
            .collect();

        let mut result = RetrievalResult::from_ranked(scored);
        result.truncate(top_k.min(self.entries.len()));
        Ok(result)
    }

    /// Look up an indexed chunk
    pub fn chunk(&self, id: &ChunkId) -> Option<&Chunk> {
        self.positions.get(id).map(|&i| &self.entries[i].chunk)
    }

    /// Look up the vector stored for a chunk
    pub fn vector(&self, id: &ChunkId) -> Option<&[f32]> {
        self.positions.get(id).map(|&i| self.entries[i].vector.as_slice())
    }

    /// Indexed chunks in insertion order
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.entries.iter().map(|e| &e.chunk)
    }

    /// Vector dimension
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of indexed chunks
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is indexed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
