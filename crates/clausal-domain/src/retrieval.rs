//! Retrieval results - ranked candidates for one query

use crate::chunk::ChunkId;
use serde::{Deserialize, Serialize};

/// One ranked candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalHit {
    /// Retrieved chunk
    pub chunk_id: ChunkId,
    /// Sequence index of the chunk within its document set
    pub sequence: usize,
    /// Score used for ranking (cosine similarity, or a re-scored composite)
    pub score: f32,
    /// Zero-based rank
    pub rank: usize,
}

/// Ordered hits for one query
///
/// Invariants (enforced by [`RetrievalResult::from_ranked`]):
/// - scores are non-increasing by rank
/// - `hit.rank == position`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    hits: Vec<RetrievalHit>,
}

impl RetrievalResult {
    /// Build a result from `(chunk_id, sequence, score)` triples
    ///
    /// The triples are sorted by descending score, ties broken by lower
    /// sequence index, then ranks are assigned. `NaN` scores sort last.
    pub fn from_ranked(mut scored: Vec<(ChunkId, usize, f32)>) -> Self {
        scored.sort_by(|a, b| {
            let sa = if a.2.is_nan() { f32::NEG_INFINITY } else { a.2 };
            let sb = if b.2.is_nan() { f32::NEG_INFINITY } else { b.2 };
            sb.total_cmp(&sa).then_with(|| a.1.cmp(&b.1))
        });

        let hits = scored
            .into_iter()
            .enumerate()
            .map(|(rank, (chunk_id, sequence, score))| RetrievalHit {
                chunk_id,
                sequence,
                score,
                rank,
            })
            .collect();

        Self { hits }
    }

    /// Build a result from triples already in rank order
    ///
    /// Ranks follow the given order. Callers are responsible for the
    /// non-increasing score invariant.
    pub fn from_ordered(ordered: Vec<(ChunkId, usize, f32)>) -> Self {
        let hits = ordered
            .into_iter()
            .enumerate()
            .map(|(rank, (chunk_id, sequence, score))| RetrievalHit {
                chunk_id,
                sequence,
                score,
                rank,
            })
            .collect();

        Self { hits }
    }

    /// Hits in rank order
    pub fn hits(&self) -> &[RetrievalHit] {
        &self.hits
    }

    /// Consume into the hit list
    pub fn into_hits(self) -> Vec<RetrievalHit> {
        self.hits
    }

    /// Number of hits
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// True when there are no hits
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Score of the best hit, if any
    pub fn top_score(&self) -> Option<f32> {
        self.hits.first().map(|h| h.score)
    }

    /// Keep only the first `k` hits
    pub fn truncate(&mut self, k: usize) {
        self.hits.truncate(k);
    }

    /// Check the ordering invariant
    pub fn is_well_ordered(&self) -> bool {
        self.hits.windows(2).all(|w| w[0].score >= w[1].score)
            && self.hits.iter().enumerate().all(|(i, h)| h.rank == i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentId;
    use proptest::prelude::*;

    fn id(seq: usize) -> ChunkId {
        ChunkId::new(&DocumentId::from_raw("doc"), seq)
    }

    #[test]
    fn test_sorted_descending() {
        let result = RetrievalResult::from_ranked(vec![(id(0), 0, 0.2), (id(1), 1, 0.9), (id(2), 2, 0.5)]);
        let seqs: Vec<_> = result.hits().iter().map(|h| h.sequence).collect();
        assert_eq!(seqs, vec![1, 2, 0]);
        assert!(result.is_well_ordered());
    }

    #[test]
    fn test_ties_broken_by_sequence() {
        let result = RetrievalResult::from_ranked(vec![(id(3), 3, 0.5), (id(1), 1, 0.5), (id(2), 2, 0.5)]);
        let seqs: Vec<_> = result.hits().iter().map(|h| h.sequence).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
    }

    #[test]
    fn test_nan_sorts_last() {
        let result = RetrievalResult::from_ranked(vec![(id(0), 0, f32::NAN), (id(1), 1, -0.5)]);
        assert_eq!(result.hits()[0].sequence, 1);
    }

    #[test]
    fn test_top_score_empty() {
        assert_eq!(RetrievalResult::default().top_score(), None);
    }

    proptest! {
        #[test]
        fn prop_scores_non_increasing(scores in prop::collection::vec(-1.0f32..1.0, 0..40)) {
            let triples = scores.iter().enumerate().map(|(i, s)| (id(i), i, *s)).collect();
            let result = RetrievalResult::from_ranked(triples);
            prop_assert!(result.is_well_ordered());
            prop_assert_eq!(result.len(), scores.len());
        }
    }
}
