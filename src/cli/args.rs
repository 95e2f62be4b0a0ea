//! Command line argument parsing for the quiver CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// Quiver - query expansion and retrieval fusion
#[derive(Parser, Debug, Clone)]
#[command(name = "quiver")]
#[command(about = "Multi-strategy query expansion and retrieval fusion")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct QuiverArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl QuiverArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Answer a question over a local corpus
    Ask(AskArgs),

    /// Show the expanded query plan without retrieving or answering
    Plan(PlanArgs),
}

/// Generation collaborator settings shared by all commands.
#[derive(Parser, Debug, Clone)]
pub struct GeneratorArgs {
    /// API key for the generation backend
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Chat model identifier
    #[arg(long, default_value = crate::generation::openai::DEFAULT_MODEL)]
    pub model: String,

    /// Base URL of an OpenAI-compatible server
    #[arg(long)]
    pub base_url: Option<String>,
}

/// Arguments for answering a question
#[derive(Parser, Debug, Clone)]
pub struct AskArgs {
    /// The question to answer
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Corpus file: one document per line, plain text or JSONL
    /// objects with "content" and optional "id" fields
    #[arg(short, long, value_name = "CORPUS_FILE")]
    pub corpus: PathBuf,

    /// Disable step-back expansion
    #[arg(long)]
    pub no_step_back: bool,

    /// Disable multi-query expansion
    #[arg(long)]
    pub no_multi_query: bool,

    /// Disable compound-query decomposition
    #[arg(long)]
    pub no_decompose: bool,

    /// Paraphrases requested per unit query
    #[arg(long, default_value = "3")]
    pub count: usize,

    /// Documents requested per retrieval call
    #[arg(short = 'k', long, default_value = "4")]
    pub top_k: usize,

    /// Request deadline in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    #[command(flatten)]
    pub generator: GeneratorArgs,
}

/// Arguments for printing a query plan
#[derive(Parser, Debug, Clone)]
pub struct PlanArgs {
    /// The question to expand
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Disable step-back expansion
    #[arg(long)]
    pub no_step_back: bool,

    /// Disable multi-query expansion
    #[arg(long)]
    pub no_multi_query: bool,

    /// Disable compound-query decomposition
    #[arg(long)]
    pub no_decompose: bool,

    /// Paraphrases requested per unit query
    #[arg(long, default_value = "3")]
    pub count: usize,

    #[command(flatten)]
    pub generator: GeneratorArgs,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
