//! Clausal CLI library.
//!
//! Command-line front end for the question-answering pipeline: ask questions
//! against local or remote documents, inspect how a document is chunked, and
//! manage the configuration file.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
