//! Confidence computation
//!
//! Blends three signals into a single score in `[0, 1]`:
//!
//! 1. the reasoning service's self-reported certainty (or a default)
//! 2. the top retrieval similarity, clamped to `[0, 1]`
//! 3. whether the matched context contains a clause-structured chunk
//!
//! ```text
//! c = (w_cert * certainty + w_sim * similarity + w_struct * has_clause)
//!     / (w_cert + w_sim + w_struct)
//! ```

use serde::{Deserialize, Serialize};

/// Default weight on self-reported certainty
pub const DEFAULT_CERTAINTY_WEIGHT: f64 = 0.5;

/// Default weight on top retrieval similarity
pub const DEFAULT_SIMILARITY_WEIGHT: f64 = 0.35;

/// Default weight on clause structure
pub const DEFAULT_STRUCTURE_WEIGHT: f64 = 0.15;

/// Default certainty assumed when the reasoning service reports none
pub const DEFAULT_CERTAINTY: f64 = 0.5;

/// Weights for the confidence blend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceWeights {
    /// Weight on self-reported certainty
    pub certainty_weight: f64,
    /// Weight on top retrieval similarity
    pub similarity_weight: f64,
    /// Weight on clause structure presence
    pub structure_weight: f64,
    /// Certainty used when none is reported
    pub default_certainty: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            certainty_weight: DEFAULT_CERTAINTY_WEIGHT,
            similarity_weight: DEFAULT_SIMILARITY_WEIGHT,
            structure_weight: DEFAULT_STRUCTURE_WEIGHT,
            default_certainty: DEFAULT_CERTAINTY,
        }
    }
}

impl ConfidenceWeights {
    /// Sum of the three weights
    pub fn total(&self) -> f64 {
        self.certainty_weight + self.similarity_weight + self.structure_weight
    }
}

/// Raw signals gathered for one question
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConfidenceSignals {
    /// Certainty reported by the reasoning service, if any
    pub certainty: Option<f64>,
    /// Best similarity score among retrieved chunks
    pub top_similarity: Option<f32>,
    /// At least one matched chunk carries a clause marker
    pub has_clause: bool,
}

/// Blend the signals into a confidence score in `[0, 1]`
///
/// Returns `0.0` when every weight is zero. Non-finite inputs are treated as
/// zero.
///
/// # Examples
///
/// ```
/// use clausal_domain::{blend_confidence, ConfidenceSignals, ConfidenceWeights};
///
/// let signals = ConfidenceSignals {
///     certainty: Some(1.0),
///     top_similarity: Some(1.0),
///     has_clause: true,
/// };
/// let c = blend_confidence(&signals, &ConfidenceWeights::default());
/// assert!((c - 1.0).abs() < 1e-9);
/// ```
pub fn blend_confidence(signals: &ConfidenceSignals, weights: &ConfidenceWeights) -> f64 {
    let total = weights.total();
    if !total.is_finite() || total <= 0.0 {
        return 0.0;
    }

    let certainty = finite_unit(signals.certainty.unwrap_or(weights.default_certainty));
    let similarity = finite_unit(signals.top_similarity.map(f64::from).unwrap_or(0.0));
    let structure = if signals.has_clause { 1.0 } else { 0.0 };

    let blended = weights.certainty_weight * certainty
        + weights.similarity_weight * similarity
        + weights.structure_weight * structure;

    finite_unit(blended / total)
}

fn finite_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
