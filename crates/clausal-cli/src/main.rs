//! Clausal CLI - Command-line interface for document question answering.

use clap::Parser;
use clausal_cli::commands;
use clausal_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> clausal_cli::Result<()> {
    let cli = Cli::parse();

    let path = Config::resolve_path(cli.config.as_deref())?;
    let config = Config::load_from(&path)?;

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Ask(args) => {
            commands::execute_ask(args, &config, &formatter).await?;
        }
        Command::Chunks(args) => {
            commands::execute_chunks(args, &config.pipeline, &formatter).await?;
        }
        Command::Config(args) => {
            commands::execute_config(args, &config, &path, &formatter)?;
        }
    }

    Ok(())
}
