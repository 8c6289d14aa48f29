//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};

/// Clausal CLI - Ask questions about policy and contract documents.
#[derive(Debug, Parser)]
#[command(name = "clausal")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "CLAUSAL_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (answers or ids only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Answer questions against one or more documents
    Ask(AskArgs),

    /// Show how a document is split into chunks
    Chunks(ChunksArgs),

    /// Inspect or create the configuration file
    Config(ConfigArgs),
}

/// Arguments for the ask command.
#[derive(Debug, Parser)]
pub struct AskArgs {
    /// Document locators (URL or local path)
    #[arg(short, long = "doc", required = true)]
    pub documents: Vec<String>,

    /// Questions to answer
    #[arg(short, long = "question")]
    pub questions: Vec<String>,

    /// File with one question per line
    #[arg(long)]
    pub questions_file: Option<String>,

    /// Include confidence scores, sources and a per-question breakdown
    #[arg(long)]
    pub detailed: bool,

    /// Embedding backend, overriding the configuration file
    #[arg(short, long, value_enum)]
    pub backend: Option<BackendArg>,

    /// Use a pipeline preset instead of the configured pipeline
    #[arg(long, value_enum)]
    pub preset: Option<PresetArg>,
}

/// Arguments for the chunks command.
#[derive(Debug, Parser)]
pub struct ChunksArgs {
    /// Document locator (URL or local path)
    pub document: String,

    /// Override maximum words per chunk
    #[arg(long)]
    pub max_words: Option<usize>,

    /// Override overlap words between chunks
    #[arg(long)]
    pub overlap: Option<usize>,
}

/// Arguments for configuration management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Print the configuration file location
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Embedding backend argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum BackendArg {
    /// Ollama embedding model
    Ollama,
    /// Local hashed bag-of-words vectors
    Hash,
}

/// Pipeline preset argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum PresetArg {
    /// Clause-structured chunks only, smaller context
    Strict,
    /// More candidates, larger context, longer deadlines
    Lenient,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<BackendArg> for crate::config::Backend {
    fn from(backend: BackendArg) -> Self {
        match backend {
            BackendArg::Ollama => crate::config::Backend::Ollama,
            BackendArg::Hash => crate::config::Backend::Hash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ask_command() {
        let cli = Cli::parse_from([
            "clausal",
            "ask",
            "--doc",
            "policy.pdf",
            "-q",
            "What is the grace period?",
            "-q",
            "Is maternity covered?",
            "--detailed",
        ]);
        match cli.command {
            Command::Ask(args) => {
                assert_eq!(args.documents, vec!["policy.pdf"]);
                assert_eq!(args.questions.len(), 2);
                assert!(args.detailed);
                assert!(args.backend.is_none());
            }
            _ => panic!("Expected Ask command"),
        }
    }

    #[test]
    fn test_ask_requires_document() {
        assert!(Cli::try_parse_from(["clausal", "ask", "-q", "question"]).is_err());
    }

    #[test]
    fn test_chunks_command() {
        let cli = Cli::parse_from(["clausal", "--format", "json", "chunks", "policy.txt", "--max-words", "50"]);
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        match cli.command {
            Command::Chunks(args) => {
                assert_eq!(args.document, "policy.txt");
                assert_eq!(args.max_words, Some(50));
                assert_eq!(args.overlap, None);
            }
            _ => panic!("Expected Chunks command"),
        }
    }

    #[test]
    fn test_backend_conversion() {
        let backend: crate::config::Backend = BackendArg::Hash.into();
        assert_eq!(backend, crate::config::Backend::Hash);
    }
}
