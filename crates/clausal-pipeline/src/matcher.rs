//! Clause Matcher
//!
//! Re-ranks the embedding index's candidates with two secondary signals,
//! key-term overlap with the question and clause-marker presence:
//!
//! ```text
//! score = (w_sim * clamp(similarity, 0, 1) + w_kw * overlap + w_clause * has_clause)
//!         / (w_sim + w_kw + w_clause)
//! ```
//!
//! In `demote` mode unmarked chunks have their score multiplied by the
//! demotion factor; in `drop` mode they are removed. Equal scores keep
//! their original retrieval rank. The output only ever contains chunks from
//! the candidate set.

use crate::config::{MatcherConfig, PipelineConfig, StructuredMode};
use crate::error::{ConfigError, Result};
use crate::terms::{extract_key_terms, keyword_overlap};
use clausal_domain::{Chunk, Embedder, RetrievalResult};
use clausal_index::EmbeddingIndex;
use regex::RegexSet;
use tracing::{debug, warn};

/// A candidate chunk after re-ranking
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedChunk {
    /// The chunk itself
    pub chunk: Chunk,
    /// Cosine similarity from the index
    pub similarity: f32,
    /// Fraction of the question's key terms found in the chunk
    pub keyword_score: f64,
    /// Chunk matched a clause marker
    pub has_clause: bool,
    /// Composite score used for ordering
    pub score: f64,
    /// Rank in the index's candidate list
    pub original_rank: usize,
}

/// Outcome of matching one question
#[derive(Debug, Clone, Default)]
pub struct MatchSet {
    /// Key terms extracted from the question
    pub key_terms: Vec<String>,
    /// Raw candidates from the index
    pub candidates: RetrievalResult,
    /// Re-ranked chunks, best first
    pub matched: Vec<MatchedChunk>,
}

impl MatchSet {
    /// Best raw similarity among the candidates
    pub fn top_similarity(&self) -> Option<f32> {
        self.candidates.top_score()
    }

    /// At least one matched chunk is clause-structured
    pub fn has_clause(&self) -> bool {
        self.matched.iter().any(|m| m.has_clause)
    }

    /// Re-ranked chunks as a retrieval result scored by composite score
    pub fn result(&self) -> RetrievalResult {
        RetrievalResult::from_ordered(
            self.matched
                .iter()
                .map(|m| (m.chunk.id.clone(), m.chunk.sequence, m.score as f32))
                .collect(),
        )
    }
}

/// Re-ranks retrieval candidates
#[derive(Debug, Clone)]
pub struct ClauseMatcher {
    config: MatcherConfig,
    markers: RegexSet,
    top_k: usize,
    matched_top_k: usize,
}

impl ClauseMatcher {
    /// Create a matcher from the pipeline configuration
    pub fn new(config: &PipelineConfig) -> std::result::Result<Self, ConfigError> {
        Ok(Self {
            markers: config.matcher.marker_set()?,
            config: config.matcher.clone(),
            top_k: config.retrieval.top_k,
            matched_top_k: config.retrieval.matched_top_k,
        })
    }

    /// Whether `text` carries any clause marker
    pub fn is_clause_like(&self, text: &str) -> bool {
        self.markers.is_match(text)
    }

    /// Retrieve candidates for `question` and re-rank them
    pub async fn match_query(
        &self,
        question: &str,
        index: &EmbeddingIndex,
        embedder: &dyn Embedder,
    ) -> Result<MatchSet> {
        if index.is_empty() {
            return Err(clausal_index::IndexError::Empty.into());
        }
        let vector = embedder
            .embed(question)
            .await
            .map_err(clausal_index::IndexError::from)?;
        let candidates = index.query(&vector, self.top_k)?;
        let key_terms = extract_key_terms(question);
        let matched = self.rerank(&key_terms, &candidates, index);

        debug!(
            candidates = candidates.len(),
            matched = matched.len(),
            terms = key_terms.len(),
            "Matched clauses"
        );
        Ok(MatchSet {
            key_terms,
            candidates,
            matched,
        })
    }

    /// Re-rank `candidates` and keep the best `matched_top_k`
    pub fn rerank(
        &self,
        key_terms: &[String],
        candidates: &RetrievalResult,
        index: &EmbeddingIndex,
    ) -> Vec<MatchedChunk> {
        let total = self.config.total_weight();
        let mut matched: Vec<MatchedChunk> = candidates
            .hits()
            .iter()
            .filter_map(|hit| {
                let Some(chunk) = index.chunk(&hit.chunk_id) else {
                    warn!(chunk = %hit.chunk_id, "Candidate missing from index");
                    return None;
                };
                let has_clause = self.is_clause_like(&chunk.text);
                if !has_clause && self.config.structured_mode == StructuredMode::Drop {
                    return None;
                }

                let similarity = if hit.score.is_finite() { hit.score } else { 0.0 };
                let keyword_score = keyword_overlap(key_terms, &chunk.text);
                let weighted = self.config.similarity_weight * f64::from(similarity).clamp(0.0, 1.0)
                    + self.config.keyword_weight * keyword_score
                    + self.config.clause_weight * if has_clause { 1.0 } else { 0.0 };
                let mut score = if total > 0.0 { weighted / total } else { 0.0 };
                if !has_clause && self.config.structured_mode == StructuredMode::Demote {
                    score *= self.config.demotion_factor;
                }

                Some(MatchedChunk {
                    chunk: chunk.clone(),
                    similarity,
                    keyword_score,
                    has_clause,
                    score: score.clamp(0.0, 1.0),
                    original_rank: hit.rank,
                })
            })
            .collect();

        matched.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.original_rank.cmp(&b.original_rank))
        });
        matched.truncate(self.matched_top_k);
        matched
    }
}
