//! Response Assembler
//!
//! Pure mapping from evaluation state to the externally visible result.
//! Nothing here calls a service, so identical inputs give identical output.

use crate::evaluator::Evaluation;
use crate::matcher::MatchedChunk;
use clausal_domain::{Answer, FailureKind, SourceClause};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Confidence at or above which an answer counts as high confidence
pub const HIGH_CONFIDENCE: f64 = 0.8;

/// Confidence at or above which an answer counts as medium confidence
pub const MEDIUM_CONFIDENCE: f64 = 0.5;

/// Source text reported when an answer has no supporting clause
pub const NO_SOURCE_CLAUSE: &str = "No specific source clause identified";

/// Package one evaluated question as an [`Answer`]
///
/// Sources are the matched chunks that were shown to the reasoning service,
/// quoted verbatim, best first.
pub fn assemble(
    question: &str,
    evaluation: &Evaluation,
    matched: &[MatchedChunk],
    elapsed: Duration,
) -> Answer {
    let sources = matched
        .iter()
        .take(evaluation.context_chunks)
        .map(|m| SourceClause {
            chunk_id: m.chunk.id.clone(),
            text: m.chunk.text.clone(),
            score: m.score as f32,
        })
        .collect();

    Answer {
        question: question.to_string(),
        text: evaluation.answer.clone(),
        confidence: evaluation.confidence.clamp(0.0, 1.0),
        sources,
        justification: evaluation.justification.clone(),
        processing_time: elapsed,
        degraded: None,
    }
}

/// Basic response: answers only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicResponse {
    /// One answer per question, in question order
    pub answers: Vec<String>,
}

impl BasicResponse {
    /// Build from assembled answers
    pub fn from_answers(answers: &[Answer]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.text.clone()).collect(),
        }
    }
}

/// Per-question detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionBreakdown {
    /// Question text
    pub question: String,
    /// Answer text
    pub answer: String,
    /// Confidence in `[0, 1]`
    pub confidence: f64,
    /// Supporting clauses, best first
    pub source_clauses: Vec<SourceClause>,
    /// Explanation from the reasoning service
    pub justification: String,
    /// Failure that produced a placeholder answer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degraded: Option<FailureKind>,
}

/// Batch-level summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Number of questions
    pub total_questions: usize,
    /// Answers with confidence >= 0.8
    pub high_confidence: usize,
    /// Answers with confidence in [0.5, 0.8)
    pub medium_confidence: usize,
    /// Answers with confidence < 0.5
    pub low_confidence: usize,
    /// Mean confidence, 0 for an empty batch
    pub average_confidence: f64,
    /// Placeholder answers
    pub degraded: usize,
}

impl BatchSummary {
    /// Summarise a batch of answers
    pub fn from_answers(answers: &[Answer]) -> Self {
        let count = |pred: &dyn Fn(f64) -> bool| answers.iter().filter(|a| pred(a.confidence)).count();
        let average_confidence = if answers.is_empty() {
            0.0
        } else {
            answers.iter().map(|a| a.confidence).sum::<f64>() / answers.len() as f64
        };

        Self {
            total_questions: answers.len(),
            high_confidence: count(&|c| c >= HIGH_CONFIDENCE),
            medium_confidence: count(&|c| (MEDIUM_CONFIDENCE..HIGH_CONFIDENCE).contains(&c)),
            low_confidence: count(&|c| c < MEDIUM_CONFIDENCE),
            average_confidence,
            degraded: answers.iter().filter(|a| a.is_degraded()).count(),
        }
    }
}

/// Detailed response
///
/// `source_clauses` holds one entry per answer: its best supporting clause,
/// or [`NO_SOURCE_CLAUSE`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedResponse {
    /// One answer per question
    pub answers: Vec<String>,
    /// One confidence per question
    pub confidence_scores: Vec<f64>,
    /// Best supporting clause per question
    pub source_clauses: Vec<String>,
    /// Wall time for the whole request, in seconds
    pub processing_time: f64,
    /// Per-question detail
    pub breakdown: Vec<QuestionBreakdown>,
    /// Batch summary
    pub summary: BatchSummary,
}

impl DetailedResponse {
    /// Build from assembled answers and total elapsed time
    pub fn from_answers(answers: &[Answer], elapsed: Duration) -> Self {
        Self {
            answers: answers.iter().map(|a| a.text.clone()).collect(),
            confidence_scores: answers.iter().map(|a| a.confidence).collect(),
            source_clauses: answers
                .iter()
                .map(|a| {
                    a.sources
                        .first()
                        .map(|s| s.text.clone())
                        .unwrap_or_else(|| NO_SOURCE_CLAUSE.to_string())
                })
                .collect(),
            processing_time: elapsed.as_secs_f64(),
            breakdown: answers
                .iter()
                .map(|a| QuestionBreakdown {
                    question: a.question.clone(),
                    answer: a.text.clone(),
                    confidence: a.confidence,
                    source_clauses: a.sources.clone(),
                    justification: a.justification.clone(),
                    degraded: a.degraded,
                })
                .collect(),
            summary: BatchSummary::from_answers(answers),
        }
    }
}
