//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// SQL Matrix - exhaustive boundary-value test matrices for database routines
#[derive(Parser, Debug)]
#[command(name = "mx")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: PathBuf,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate test definition files
    Validate(ValidateArgs),

    /// Build and print the test matrix of a definition
    Matrix(MatrixArgs),

    /// Parse a SQL type and show its boundary values
    Inspect(InspectArgs),
}

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Definition files to validate (default: discover under definition_paths)
    pub files: Vec<PathBuf>,

    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the matrix command
#[derive(Args, Debug)]
pub struct MatrixArgs {
    /// Definition file (.json, .yml or .yaml)
    pub file: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,

    /// Print at most this many test cases
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Override max_combinations from the config
    #[arg(long)]
    pub max_combinations: Option<u64>,
}

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// SQL type declaration, e.g. "DECIMAL(10, 2)"
    pub sql_type: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    Table,
    /// JSON document
    Json,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
