//! Chunk module - the unit of embedding and retrieval

use crate::document::DocumentId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a chunk: parent document id plus sequence index
///
/// Rendered as `<document-id>#<sequence>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChunkId(String);

impl ChunkId {
    /// Build the id for the chunk at `sequence` within `document`
    ///
    /// # Examples
    ///
    /// ```
    /// use clausal_domain::{ChunkId, DocumentId};
    ///
    /// let doc = DocumentId::from_raw("abc123");
    /// assert_eq!(ChunkId::new(&doc, 4).as_str(), "abc123#4");
    /// ```
    pub fn new(document: &DocumentId, sequence: usize) -> Self {
        Self(format!("{}#{}", document, sequence))
    }

    /// Borrow the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A bounded contiguous text segment derived from a document
///
/// Chunks are never mutated after creation; re-ingestion of changed content
/// produces a new document id and therefore new chunk ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique id
    pub id: ChunkId,
    /// Parent document
    pub document_id: DocumentId,
    /// Position within the parent document, starting at 0
    pub sequence: usize,
    /// Chunk text (including any overlap carried from the previous chunk)
    pub text: String,
    /// Byte offset in the document text where this chunk starts
    pub start: usize,
    /// Byte offset in the document text where this chunk ends (exclusive)
    pub end: usize,
    /// Number of whitespace-separated words in `text`
    pub word_count: usize,
    /// Number of leading words shared with the previous chunk
    pub overlap_words: usize,
}

impl Chunk {
    /// Length of the covered span in bytes
    pub fn span_len(&self) -> usize {
        self.end - self.start
    }
}
