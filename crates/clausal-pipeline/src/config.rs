//! Configuration for the pipeline
//!
//! One [`PipelineConfig`] is built at startup, validated, and shared
//! read-only (usually as `Arc<PipelineConfig>`) by every request.

use crate::error::ConfigError;
use clausal_domain::ConfidenceWeights;
use clausal_ingest::{ChunkingConfig, Chunker, IngestConfig};
use regex::RegexSet;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default clause-like markers
///
/// Numbered sections (`1.`, `4.2`, `3.1.7)`), `Section` / `Clause` /
/// `Article` headings, parenthesised sub-clauses and all-caps headings.
pub const DEFAULT_CLAUSE_MARKERS: &[&str] = &[
    r"(?m)^\s*\d+(\.\d+)*[.)]?\s+\S",
    r"(?im)^\s*(section|clause|article)\s+[0-9ivxlc]+",
    r"(?m)^\s*\(([a-z]|[ivx]{1,4}|\d{1,2})\)\s",
    r"(?m)^[A-Z][A-Z0-9 ,&/\-]{3,}$",
];

/// How chunks without clause markers are treated by the matcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StructuredMode {
    /// Markers only contribute through `clause_weight`
    #[default]
    Off,
    /// Unmarked chunks have their composite score multiplied by `demotion_factor`
    Demote,
    /// Unmarked chunks are removed
    Drop,
}

/// Candidate counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Candidates requested from the embedding index
    pub top_k: usize,
    /// Chunks kept after re-ranking and passed to the evaluator
    pub matched_top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            matched_top_k: 5,
        }
    }
}

/// Clause matcher re-ranking weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Weight on cosine similarity
    pub similarity_weight: f64,
    /// Weight on key-term overlap with the question
    pub keyword_weight: f64,
    /// Weight on clause-marker presence
    pub clause_weight: f64,
    /// Treatment of unmarked chunks
    pub structured_mode: StructuredMode,
    /// Multiplier applied to unmarked chunks in `demote` mode
    pub demotion_factor: f64,
    /// Regexes; a chunk matching any of them is clause-like
    pub clause_markers: Vec<String>,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            similarity_weight: 0.6,
            keyword_weight: 0.25,
            clause_weight: 0.15,
            structured_mode: StructuredMode::Off,
            demotion_factor: 0.5,
            clause_markers: DEFAULT_CLAUSE_MARKERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl MatcherConfig {
    /// Sum of the three re-ranking weights
    pub fn total_weight(&self) -> f64 {
        self.similarity_weight + self.keyword_weight + self.clause_weight
    }

    /// Compile the clause markers
    pub fn marker_set(&self) -> Result<RegexSet, ConfigError> {
        RegexSet::new(&self.clause_markers).map_err(|e| ConfigError::Pattern(e.to_string()))
    }
}

/// Prompt budget and retry policy for the logic evaluator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Maximum context size, in estimated tokens
    pub context_token_budget: usize,
    /// Characters per token used for the estimate
    pub chars_per_token: usize,
    /// Extra attempts after a retryable reasoning failure
    pub max_reasoning_retries: u32,
    /// Delay before the first retry, doubled on each further retry
    pub retry_backoff_ms: u64,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            context_token_budget: 3000,
            chars_per_token: 4,
            max_reasoning_retries: 1,
            retry_backoff_ms: 500,
        }
    }
}

impl EvaluatorConfig {
    /// Context budget in characters
    pub fn context_char_budget(&self) -> usize {
        self.context_token_budget.saturating_mul(self.chars_per_token)
    }
}

/// Deadlines, sizes and fan-out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Deadline for a whole request
    pub request_timeout_secs: u64,
    /// Budget for a single network call, capped by the request deadline
    pub call_timeout_secs: u64,
    /// Largest accepted document
    pub max_document_bytes: usize,
    /// Questions evaluated at once within a request
    pub max_concurrent_questions: usize,
    /// Accept local filesystem paths as document locators
    pub allow_local_paths: bool,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 60,
            call_timeout_secs: 30,
            max_document_bytes: 10 * 1024 * 1024,
            max_concurrent_questions: 5,
            allow_local_paths: true,
        }
    }
}

/// Index reuse across requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Reuse indexes for identical document lists
    pub enabled: bool,
    /// Lifetime of a cached index
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ttl_secs: 3600,
        }
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Chunk sizes
    pub chunking: ChunkingConfig,
    /// Candidate counts
    pub retrieval: RetrievalConfig,
    /// Re-ranking
    pub matcher: MatcherConfig,
    /// Confidence blend
    pub confidence: ConfidenceWeights,
    /// Prompt budget and retries
    pub evaluator: EvaluatorConfig,
    /// Deadlines and sizes
    pub limits: LimitsConfig,
    /// Index cache
    pub cache: CacheConfig,
}

fn unit_interval(name: &str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::Invalid(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )));
    }
    Ok(())
}

fn positive(name: &str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid(format!("{} must be greater than 0", name)));
    }
    Ok(())
}

impl PipelineConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("chunking.max_words", self.chunking.max_words as u64)?;
        if self.chunking.overlap_words >= self.chunking.max_words {
            return Err(ConfigError::Invalid(
                "chunking.overlap_words must be smaller than chunking.max_words".to_string(),
            ));
        }

        positive("retrieval.top_k", self.retrieval.top_k as u64)?;
        positive("retrieval.matched_top_k", self.retrieval.matched_top_k as u64)?;
        if self.retrieval.matched_top_k > self.retrieval.top_k {
            return Err(ConfigError::Invalid(
                "retrieval.matched_top_k cannot exceed retrieval.top_k".to_string(),
            ));
        }

        let m = &self.matcher;
        unit_interval("matcher.similarity_weight", m.similarity_weight)?;
        unit_interval("matcher.keyword_weight", m.keyword_weight)?;
        unit_interval("matcher.clause_weight", m.clause_weight)?;
        unit_interval("matcher.demotion_factor", m.demotion_factor)?;
        if m.total_weight() <= 0.0 {
            return Err(ConfigError::Invalid("matcher weights sum to zero".to_string()));
        }
        m.marker_set()?;

        let c = &self.confidence;
        unit_interval("confidence.certainty_weight", c.certainty_weight)?;
        unit_interval("confidence.similarity_weight", c.similarity_weight)?;
        unit_interval("confidence.structure_weight", c.structure_weight)?;
        unit_interval("confidence.default_certainty", c.default_certainty)?;
        if c.total() <= 0.0 {
            return Err(ConfigError::Invalid("confidence weights sum to zero".to_string()));
        }

        positive("evaluator.context_token_budget", self.evaluator.context_token_budget as u64)?;
        positive("evaluator.chars_per_token", self.evaluator.chars_per_token as u64)?;

        positive("limits.request_timeout_secs", self.limits.request_timeout_secs)?;
        positive("limits.call_timeout_secs", self.limits.call_timeout_secs)?;
        positive("limits.max_document_bytes", self.limits.max_document_bytes as u64)?;
        positive("limits.max_concurrent_questions", self.limits.max_concurrent_questions as u64)?;
        if self.limits.call_timeout_secs > self.limits.request_timeout_secs {
            return Err(ConfigError::Invalid(
                "limits.call_timeout_secs cannot exceed limits.request_timeout_secs".to_string(),
            ));
        }

        if self.cache.enabled {
            positive("cache.ttl_secs", self.cache.ttl_secs)?;
        }
        Ok(())
    }

    /// Strict preset: clause-structured chunks only, smaller context
    pub fn strict() -> Self {
        let mut config = Self::default();
        config.matcher.structured_mode = StructuredMode::Drop;
        config.retrieval.matched_top_k = 3;
        config.evaluator.context_token_budget = 2000;
        config
    }

    /// Lenient preset: more candidates, larger context, longer deadlines
    pub fn lenient() -> Self {
        let mut config = Self::default();
        config.retrieval.top_k = 20;
        config.retrieval.matched_top_k = 8;
        config.evaluator.context_token_budget = 6000;
        config.evaluator.max_reasoning_retries = 2;
        config.limits.request_timeout_secs = 120;
        config.limits.call_timeout_secs = 60;
        config
    }

    /// Deadline for a whole request
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.limits.request_timeout_secs)
    }

    /// Budget for a single network call
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.limits.call_timeout_secs)
    }

    /// Ingestion limits derived from this configuration
    pub fn ingest_config(&self) -> IngestConfig {
        IngestConfig {
            max_document_bytes: self.limits.max_document_bytes,
            fetch_timeout_secs: self.limits.call_timeout_secs,
            allow_local_paths: self.limits.allow_local_paths,
        }
    }

    /// Chunker for this configuration
    pub fn chunker(&self) -> Chunker {
        Chunker::from_config(&self.chunking)
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Toml(format!("Failed to parse TOML: {}", e)))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Toml(format!("Failed to serialize to TOML: {}", e)))
    }

    /// Load and validate a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_toml(&contents)?;
        config.validate()?;
        Ok(config)
    }
}
