//! Chunks command implementation.

use crate::cli::ChunksArgs;
use crate::error::Result;
use crate::output::Formatter;
use clausal_domain::{Chunk, Document};
use clausal_ingest::Ingestor;
use clausal_pipeline::{ClauseMatcher, PipelineConfig};

/// Execute the chunks command.
pub async fn execute_chunks(args: ChunksArgs, pipeline: &PipelineConfig, formatter: &Formatter) -> Result<()> {
    let pipeline = with_overrides(pipeline, args.max_words, args.overlap)?;
    let (document, chunks) = load_chunks(&args.document, &pipeline).await?;
    let matcher = ClauseMatcher::new(&pipeline)?;

    eprintln!(
        "{}",
        formatter.info(&format!(
            "{} ({}, {} words) -> {} chunk(s)",
            document.source,
            document.content_type,
            document.text.split_whitespace().count(),
            chunks.len()
        ))
    );
    println!("{}", formatter.format_chunks(&chunks, |text| matcher.is_clause_like(text))?);

    Ok(())
}

/// Apply command-line chunk size overrides and re-validate.
pub fn with_overrides(
    pipeline: &PipelineConfig,
    max_words: Option<usize>,
    overlap: Option<usize>,
) -> Result<PipelineConfig> {
    let mut pipeline = pipeline.clone();
    if let Some(max_words) = max_words {
        pipeline.chunking.max_words = max_words;
    }
    if let Some(overlap) = overlap {
        pipeline.chunking.overlap_words = overlap;
    }
    pipeline.validate()?;
    Ok(pipeline)
}

/// Ingest one document and split it with the configured chunker.
pub async fn load_chunks(locator: &str, pipeline: &PipelineConfig) -> Result<(Document, Vec<Chunk>)> {
    let ingestor = Ingestor::new(pipeline.ingest_config())?;
    let document = ingestor.ingest(locator).await?;
    let chunks = pipeline.chunker().chunk(&document);
    Ok((document, chunks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use tempfile::TempDir;

    #[test]
    fn test_overrides_validated() {
        let pipeline = PipelineConfig::default();

        let adjusted = with_overrides(&pipeline, Some(300), Some(50)).unwrap();
        assert_eq!(adjusted.chunking.max_words, 300);
        assert_eq!(adjusted.chunking.overlap_words, 50);

        // default overlap (200) is not below 100
        let result = with_overrides(&pipeline, Some(100), None);
        assert!(matches!(result, Err(CliError::Pipeline(_))));
    }

    #[tokio::test]
    async fn test_load_chunks_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("policy.txt");
        let words: Vec<String> = (0..120).map(|i| format!("word{}", i)).collect();
        std::fs::write(&path, words.join(" ")).unwrap();

        let pipeline = with_overrides(&PipelineConfig::default(), Some(50), Some(10)).unwrap();
        let (document, chunks) = load_chunks(path.to_str().unwrap(), &pipeline).await.unwrap();

        assert!(document.source.ends_with("policy.txt"));
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.word_count <= 50));
        assert_eq!(chunks[0].overlap_words, 0);
        assert_eq!(chunks[1].overlap_words, 10);
    }

    #[tokio::test]
    async fn test_load_missing_document() {
        let result = load_chunks("/nonexistent/policy.txt", &PipelineConfig::default()).await;
        assert!(matches!(result, Err(CliError::Ingest(_))));
    }
}
