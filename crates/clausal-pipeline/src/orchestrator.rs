//! Orchestrator
//!
//! Runs one request (a document set plus a question batch) through the
//! pipeline:
//!
//! ```text
//! Idle ─▶ Ingesting ─▶ Indexing ─▶ Querying ─▶ Completed
//!   └─────────┴────────────┴───────────┴─────▶ Errored
//! ```
//!
//! Ingestion and indexing happen once per request and abort the whole
//! document set on failure: every question then gets the same degraded
//! answer. Questions share the read-only index and run concurrently; a
//! failure in one never affects another.

use crate::assembler::{assemble, BasicResponse, DetailedResponse};
use crate::config::PipelineConfig;
use crate::deadline::Deadline;
use crate::error::{PipelineError, Result};
use crate::evaluator::{Evaluation, LogicEvaluator};
use crate::matcher::{ClauseMatcher, MatchSet};
use crate::metrics::BatchMetrics;
use clausal_domain::{Answer, Document, Embedder, FailureKind, Query, Reasoner, RequestId};
use clausal_index::{EmbeddingIndex, IndexCache, IndexHandle};
use clausal_ingest::{Chunker, Ingestor};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Documents and questions for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Document URLs or paths
    pub documents: Vec<String>,
    /// Questions, answered in order
    pub questions: Vec<String>,
}

/// Request lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    /// Not started
    Idle,
    /// Fetching and parsing documents
    Ingesting,
    /// Chunking and embedding
    Indexing,
    /// Answering questions
    Querying,
    /// Every question has an answer
    Completed,
    /// The document set failed; every answer is degraded
    Errored,
}

impl RequestState {
    /// No further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestState::Completed | RequestState::Errored)
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestState::Idle => "idle",
            RequestState::Ingesting => "ingesting",
            RequestState::Indexing => "indexing",
            RequestState::Querying => "querying",
            RequestState::Completed => "completed",
            RequestState::Errored => "errored",
        };
        f.write_str(name)
    }
}

/// Logs state transitions for one request
struct StateTracker {
    request_id: RequestId,
    state: RequestState,
}

impl StateTracker {
    fn new(request_id: RequestId) -> Self {
        Self {
            request_id,
            state: RequestState::Idle,
        }
    }

    fn advance(&mut self, next: RequestState) {
        if self.state.is_terminal() {
            warn!(request_id = %self.request_id, from = %self.state, to = %next, "Ignoring transition out of terminal state");
            return;
        }
        info!(request_id = %self.request_id, from = %self.state, to = %next, "Request state changed");
        self.state = next;
    }
}

/// Result of one request
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// Correlation id
    pub request_id: RequestId,
    /// One answer per question, in question order
    pub answers: Vec<Answer>,
    /// Final state
    pub state: RequestState,
    /// Failure that aborted the document set, if any
    pub failure: Option<FailureKind>,
    /// Counters
    pub metrics: BatchMetrics,
    /// Wall time for the whole request
    pub elapsed: Duration,
}

impl BatchOutcome {
    /// Basic wire response
    pub fn basic(&self) -> BasicResponse {
        BasicResponse::from_answers(&self.answers)
    }

    /// Detailed wire response
    pub fn detailed(&self) -> DetailedResponse {
        DetailedResponse::from_answers(&self.answers, self.elapsed)
    }
}

struct QuestionOutcome {
    answer: Answer,
    retries: usize,
}

/// Sequences ingestion, indexing, matching, evaluation and assembly
///
/// # Examples
///
/// ```no_run
/// use clausal_index::HashEmbedder;
/// use clausal_llm::MockReasoner;
/// use clausal_pipeline::{Orchestrator, PipelineConfig, QueryRequest};
/// use std::sync::Arc;
///
/// # async fn run() -> Result<(), clausal_pipeline::PipelineError> {
/// let orchestrator = Orchestrator::new(
///     Arc::new(PipelineConfig::default()),
///     Arc::new(HashEmbedder::default()),
///     Arc::new(MockReasoner::default()),
/// )?;
/// let outcome = orchestrator
///     .process(&QueryRequest {
///         documents: vec!["policy.txt".into()],
///         questions: vec!["What is the grace period?".into()],
///     })
///     .await;
/// println!("{:?}", outcome.basic().answers);
/// # Ok(())
/// # }
/// ```
pub struct Orchestrator {
    config: Arc<PipelineConfig>,
    ingestor: Ingestor,
    chunker: Chunker,
    embedder: Arc<dyn Embedder>,
    matcher: ClauseMatcher,
    evaluator: LogicEvaluator,
    cache: Option<IndexCache>,
}

impl Orchestrator {
    /// Create an orchestrator; the configuration is validated here
    pub fn new(
        config: Arc<PipelineConfig>,
        embedder: Arc<dyn Embedder>,
        reasoner: Arc<dyn Reasoner>,
    ) -> Result<Self> {
        config.validate()?;
        let ingestor = Ingestor::new(config.ingest_config())?;
        let cache = config
            .cache
            .enabled
            .then(|| IndexCache::new(Duration::from_secs(config.cache.ttl_secs)));

        Ok(Self {
            ingestor,
            chunker: config.chunker(),
            matcher: ClauseMatcher::new(&config)?,
            evaluator: LogicEvaluator::new(reasoner, config.clone()),
            embedder,
            cache,
            config,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Name of the reasoning model
    pub fn model_name(&self) -> &str {
        self.evaluator.model_name()
    }

    /// Answer every question in `request`
    ///
    /// Never fails: every failure is reported as a degraded answer.
    pub async fn process(&self, request: &QueryRequest) -> BatchOutcome {
        let started = Instant::now();
        let deadline = Deadline::after(self.config.request_timeout());
        let request_id = RequestId::new();
        let mut tracker = StateTracker::new(request_id);
        let mut metrics = BatchMetrics::new();

        info!(
            request_id = %request_id,
            documents = request.documents.len(),
            questions = request.questions.len(),
            "Processing request"
        );

        let documents = dedup(&request.documents);
        let index = match self.prepare_index(&documents, &deadline, &mut tracker, &mut metrics).await {
            Ok(index) => index,
            Err(err) => {
                let kind = err.kind().unwrap_or(FailureKind::Fetch);
                error!(request_id = %request_id, kind = %kind, error = %err, "Document set failed");
                tracker.advance(RequestState::Errored);
                let answers: Vec<Answer> = request
                    .questions
                    .iter()
                    .map(|q| {
                        metrics.record_degraded(kind);
                        Answer::placeholder(q.as_str(), kind, started.elapsed())
                    })
                    .collect();
                return self.finish(request_id, answers, tracker, Some(kind), metrics, started);
            }
        };

        tracker.advance(RequestState::Querying);
        let queries: Vec<Query> = request
            .questions
            .iter()
            .map(|q| Query::new(q.as_str(), documents.clone()))
            .collect();
        let outcomes: Vec<QuestionOutcome> = stream::iter(queries)
            .map(|query| {
                let index = index.clone();
                async move { self.answer_question(&query, &index, &deadline).await }
            })
            .buffered(self.config.limits.max_concurrent_questions)
            .collect()
            .await;

        let mut answers = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            match outcome.answer.degraded {
                Some(kind) => metrics.record_degraded(kind),
                None => metrics.record_answer(),
            }
            metrics.record_retries(outcome.retries);
            answers.push(outcome.answer);
        }

        tracker.advance(RequestState::Completed);
        self.finish(request_id, answers, tracker, None, metrics, started)
    }

    fn finish(
        &self,
        request_id: RequestId,
        answers: Vec<Answer>,
        tracker: StateTracker,
        failure: Option<FailureKind>,
        metrics: BatchMetrics,
        started: Instant,
    ) -> BatchOutcome {
        let elapsed = started.elapsed();
        info!(
            request_id = %request_id,
            elapsed_ms = elapsed.as_millis() as u64,
            "{}",
            metrics.summary()
        );
        BatchOutcome {
            request_id,
            answers,
            state: tracker.state,
            failure,
            metrics,
            elapsed,
        }
    }

    /// Ingest, chunk and index the document set, or reuse a cached index
    async fn prepare_index(
        &self,
        documents: &[String],
        deadline: &Deadline,
        tracker: &mut StateTracker,
        metrics: &mut BatchMetrics,
    ) -> Result<IndexHandle> {
        metrics.documents = documents.len();

        if let Some(handle) = self.cache.as_ref().and_then(|c| c.get(documents)) {
            debug!(documents = documents.len(), "Reusing cached index");
            metrics.chunks = handle.len();
            metrics.cache_hit = true;
            return Ok(handle);
        }

        tracker.advance(RequestState::Ingesting);
        let ingested = self.ingest_all(documents, deadline).await?;

        tracker.advance(RequestState::Indexing);
        let chunks: Vec<_> = ingested.iter().flat_map(|doc| self.chunker.chunk(doc)).collect();
        metrics.chunks = chunks.len();
        debug!(documents = ingested.len(), chunks = chunks.len(), "Chunked documents");

        let embedder = self.embedder.as_ref();
        let index = deadline
            .run("Indexing", self.config.request_timeout(), async {
                EmbeddingIndex::build(chunks, embedder).await.map_err(PipelineError::from)
            })
            .await?;

        if let Some(cache) = &self.cache {
            if !index.is_empty() {
                cache.insert(documents.to_vec(), index.clone());
            }
        }
        Ok(index)
    }

    /// Ingest every document concurrently; the first failure fails the set
    async fn ingest_all(&self, documents: &[String], deadline: &Deadline) -> Result<Vec<Document>> {
        let call_timeout = self.config.call_timeout();
        futures::future::try_join_all(documents.iter().map(|locator| {
            deadline.run("Fetching", call_timeout, async move {
                self.ingestor.ingest(locator).await.map_err(PipelineError::from)
            })
        }))
        .await
    }

    /// Answer one question, retrying retryable failures with backoff
    async fn answer_question(&self, query: &Query, index: &EmbeddingIndex, deadline: &Deadline) -> QuestionOutcome {
        let started = Instant::now();
        let max_retries = self.config.evaluator.max_reasoning_retries as usize;
        let mut backoff = Duration::from_millis(self.config.evaluator.retry_backoff_ms);
        let mut retries = 0;

        loop {
            match self.try_answer(query, index, deadline).await {
                Ok((evaluation, matches)) => {
                    debug!(
                        question = %query.text,
                        confidence = evaluation.confidence,
                        sources = evaluation.context_chunks,
                        "Question answered"
                    );
                    return QuestionOutcome {
                        answer: assemble(&query.text, &evaluation, &matches.matched, started.elapsed()),
                        retries,
                    };
                }
                Err(err) if err.is_retryable() && retries < max_retries && !deadline.remaining().is_zero() => {
                    retries += 1;
                    warn!(
                        question = %query.text,
                        attempt = retries,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %err,
                        "Retrying question"
                    );
                    tokio::time::sleep(backoff.min(deadline.remaining())).await;
                    backoff = backoff.saturating_mul(2);
                }
                Err(err) => {
                    let kind = err.kind().unwrap_or(FailureKind::Reasoning);
                    warn!(question = %query.text, kind = %kind, error = %err, "Question degraded");
                    return QuestionOutcome {
                        answer: Answer::placeholder(query.text.as_str(), kind, started.elapsed()),
                        retries,
                    };
                }
            }
        }
    }

    async fn try_answer(
        &self,
        query: &Query,
        index: &EmbeddingIndex,
        deadline: &Deadline,
    ) -> Result<(Evaluation, MatchSet)> {
        let matches = deadline
            .run(
                "Matching",
                self.config.call_timeout(),
                self.matcher.match_query(&query.text, index, self.embedder.as_ref()),
            )
            .await?;
        let evaluation = self.evaluator.evaluate(&query.text, &matches, deadline).await?;
        Ok((evaluation, matches))
    }
}

/// Drop repeated locators, keeping first occurrences in order
fn dedup(documents: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    documents
        .iter()
        .filter(|d| seen.insert(d.as_str()))
        .cloned()
        .collect()
}
