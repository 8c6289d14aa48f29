//! Metrics collection for one request

use clausal_domain::FailureKind;
use std::collections::BTreeMap;

/// Counters gathered while answering a batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchMetrics {
    /// Questions answered normally
    pub answered: usize,

    /// Placeholder answers per failure kind
    pub degraded: BTreeMap<FailureKind, usize>,

    /// Retries performed across all questions
    pub retries: usize,

    /// Documents ingested
    pub documents: usize,

    /// Chunks indexed
    pub chunks: usize,

    /// Index was reused from the cache
    pub cache_hit: bool,
}

impl BatchMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a normal answer
    pub fn record_answer(&mut self) {
        self.answered += 1;
    }

    /// Record a placeholder answer
    pub fn record_degraded(&mut self, kind: FailureKind) {
        *self.degraded.entry(kind).or_insert(0) += 1;
    }

    /// Record retries spent on one question
    pub fn record_retries(&mut self, count: usize) {
        self.retries += count;
    }

    /// Placeholder answers across all kinds
    pub fn total_degraded(&self) -> usize {
        self.degraded.values().sum()
    }

    /// Questions seen
    pub fn total(&self) -> usize {
        self.answered + self.total_degraded()
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Batch Metrics Summary".to_string(),
            "=====================".to_string(),
            format!("Documents: {}", self.documents),
            format!("Chunks: {}{}", self.chunks, if self.cache_hit { " (cached)" } else { "" }),
            format!("Questions: {}", self.total()),
            format!("Answered: {}", self.answered),
            format!("Retries: {}", self.retries),
        ];

        if !self.degraded.is_empty() {
            lines.push("Degraded by kind:".to_string());
            for (kind, count) in &self.degraded {
                lines.push(format!("  {}: {}", kind, count));
            }
            lines.push(format!("  Total: {}", self.total_degraded()));
        }

        lines.join("\n")
    }
}
