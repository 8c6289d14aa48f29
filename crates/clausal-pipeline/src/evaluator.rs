//! Logic Evaluator
//!
//! Builds a bounded prompt from the question and its matched clauses, calls
//! the reasoning service once, and blends a confidence score. Retries are
//! the orchestrator's job.

use crate::config::PipelineConfig;
use crate::deadline::Deadline;
use crate::error::{PipelineError, Result};
use crate::matcher::MatchSet;
use crate::parser::parse_reasoner_output;
use crate::prompt::PromptBuilder;
use clausal_domain::{blend_confidence, ConfidenceSignals, Reasoner, ServiceError};
use std::sync::Arc;
use tracing::debug;

/// Draft answer for one question
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Answer text
    pub answer: String,
    /// Blended confidence in `[0, 1]`
    pub confidence: f64,
    /// Explanation from the reasoning service
    pub justification: String,
    /// Certainty reported by the service, if any
    pub certainty: Option<f64>,
    /// Matched chunks that fit into the prompt
    pub context_chunks: usize,
}

/// Turns matched clauses into an answer through a [`Reasoner`]
#[derive(Clone)]
pub struct LogicEvaluator {
    reasoner: Arc<dyn Reasoner>,
    config: Arc<PipelineConfig>,
}

impl LogicEvaluator {
    /// Create an evaluator
    pub fn new(reasoner: Arc<dyn Reasoner>, config: Arc<PipelineConfig>) -> Self {
        Self { reasoner, config }
    }

    /// Name of the reasoning model
    pub fn model_name(&self) -> &str {
        self.reasoner.model_name()
    }

    /// Evaluate one question
    ///
    /// The reasoning call is bounded by the call timeout and the request
    /// deadline, whichever comes first.
    pub async fn evaluate(
        &self,
        question: &str,
        matches: &MatchSet,
        deadline: &Deadline,
    ) -> Result<Evaluation> {
        let prompt = PromptBuilder::new(question, self.config.evaluator.context_char_budget())
            .with_key_terms(&matches.key_terms)
            .with_matches(&matches.matched)
            .build();
        debug!(
            prompt_chars = prompt.text.len(),
            context_chunks = prompt.included,
            truncated = prompt.truncated,
            "Built reasoning prompt"
        );

        let response = deadline
            .run("Reasoning", self.config.call_timeout(), async {
                self.reasoner.reason(&prompt.text).await.map_err(reasoning_error)
            })
            .await?;

        let parsed = parse_reasoner_output(&response.text)?;
        let certainty = response.certainty.or(parsed.certainty);
        let confidence = blend_confidence(
            &ConfidenceSignals {
                certainty,
                top_similarity: matches.top_similarity(),
                has_clause: matches.has_clause(),
            },
            &self.config.confidence,
        );

        Ok(Evaluation {
            answer: parsed.answer,
            confidence,
            justification: parsed.justification,
            certainty,
            context_chunks: prompt.included,
        })
    }
}

fn reasoning_error(err: ServiceError) -> PipelineError {
    match err {
        ServiceError::Timeout(ms) => PipelineError::timeout("Reasoning", ms),
        other => PipelineError::Reasoning(other.to_string()),
    }
}
