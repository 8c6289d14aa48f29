//! Clausal Server CLI
//!
//! Starts the HTTP server for document question answering.

use clausal_server::{config::ServerConfig, start_server, ServerError};
use std::env;
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), ServerError> {
    let args: Vec<String> = env::args().collect();

    let config = if args.len() > 2 && args[1] == "--config" {
        ServerConfig::from_file(&args[2])?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        process::exit(0);
    } else {
        eprintln!("Warning: No config file specified, using default test configuration");
        eprintln!("Usage: clausal-server --config <path-to-config.toml>");
        eprintln!();
        let mut config = ServerConfig::default_test_config();
        config.apply_token_override(env::var(clausal_server::config::AUTH_TOKEN_ENV).ok());
        config
    };

    start_server(config).await?;

    Ok(())
}

fn print_help() {
    println!("Clausal Server - Document Question Answering");
    println!();
    println!("USAGE:");
    println!("    clausal-server --config <path-to-config.toml>");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("CONFIGURATION:");
    println!("    The TOML config file should contain:");
    println!("    - bind_address / bind_port: where to listen");
    println!("    - auth_token: bearer token (or set CLAUSAL_AUTH_TOKEN)");
    println!("    - embedding_backend: 'ollama' (default) or 'hash'");
    println!("    - allow_local_documents: accept server-side file paths (default false)");
    println!("    - [models]: Ollama endpoint and model names");
    println!("    - [pipeline]: chunking, retrieval, matcher and limits");
    println!();
    println!("ENVIRONMENT:");
    println!("    RUST_LOG             Log filter (default: info)");
    println!("    CLAUSAL_AUTH_TOKEN   Overrides auth_token");
    println!();
}
