//! Ask command implementation.

use crate::cli::{AskArgs, PresetArg};
use crate::config::{Backend, Config};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use clausal_domain::Embedder;
use clausal_index::HashEmbedder;
use clausal_llm::{OllamaEmbedder, OllamaReasoner};
use clausal_pipeline::{Orchestrator, PipelineConfig, QueryRequest};
use std::fs;
use std::sync::Arc;

/// Execute the ask command.
pub async fn execute_ask(args: AskArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let questions = collect_questions(&args.questions, args.questions_file.as_deref())?;
    let pipeline = select_pipeline(&config.pipeline, args.preset);
    let backend = args.backend.map(Into::into).unwrap_or(config.backend);

    let orchestrator = build_orchestrator(config, pipeline, backend)?;
    let request = QueryRequest {
        documents: args.documents,
        questions,
    };

    let outcome = orchestrator.process(&request).await;
    println!("{}", formatter.format_outcome(&outcome, args.detailed)?);

    Ok(())
}

/// Merge inline questions with those read from a file, one per line.
pub fn collect_questions(inline: &[String], file: Option<&str>) -> Result<Vec<String>> {
    let mut questions: Vec<String> = inline
        .iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .collect();

    if let Some(path) = file {
        let contents = fs::read_to_string(path)?;
        questions.extend(
            contents
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#'))
                .map(String::from),
        );
    }

    if questions.is_empty() {
        return Err(CliError::InvalidInput(
            "At least one question is required (--question or --questions-file)".to_string(),
        ));
    }
    Ok(questions)
}

/// The configured pipeline, or a preset in its place.
pub fn select_pipeline(configured: &PipelineConfig, preset: Option<PresetArg>) -> PipelineConfig {
    match preset {
        Some(PresetArg::Strict) => PipelineConfig::strict(),
        Some(PresetArg::Lenient) => PipelineConfig::lenient(),
        None => configured.clone(),
    }
}

/// Wire the reasoning model and the chosen embedder into an orchestrator.
pub fn build_orchestrator(config: &Config, pipeline: PipelineConfig, backend: Backend) -> Result<Orchestrator> {
    let reasoner = Arc::new(OllamaReasoner::new(config.models.clone())?);
    let embedder: Arc<dyn Embedder> = match backend {
        Backend::Ollama => Arc::new(OllamaEmbedder::new(config.models.clone())?),
        Backend::Hash => Arc::new(HashEmbedder::new(config.models.embedding_dimension)),
    };

    Ok(Orchestrator::new(Arc::new(pipeline), embedder, reasoner)?)
}
