//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Stepwise - versioned schema migrations for DuckDB
#[derive(Parser, Debug)]
#[command(name = "sw")]
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
    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: PathBuf,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Profile to use (defaults to SW_PROFILE, then "dev")
    #[arg(short = 'm', long, global = true)]
    pub profile: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record migrations as applied without running them
    Baseline(BaselineArgs),

    /// Apply pending migrations up to the latest (or given) version
    Migrate(MigrateArgs),

    /// Drop the keyspace and migrate it again from scratch
    Reset(ResetArgs),

    /// Show applied and pending migrations
    Status(StatusArgs),

    /// Create a new migration file
    Generate(GenerateArgs),
}

/// Arguments for the baseline command
#[derive(Args, Debug)]
pub struct BaselineArgs {
    /// Version to baseline to (default: latest)
    #[arg(value_name = "VERSION")]
    pub version: Option<String>,
}

/// Arguments for the migrate command
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Version to migrate to (default: latest)
    #[arg(value_name = "VERSION")]
    pub version: Option<String>,

    /// Retry the last migration if its previous attempt failed
    #[arg(short, long)]
    pub force: bool,

    /// Do not ask for confirmation
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Arguments for the reset command
#[derive(Args, Debug)]
pub struct ResetArgs {
    /// Version to migrate to after dropping (default: latest)
    #[arg(value_name = "VERSION")]
    pub version: Option<String>,

    /// Do not ask for confirmation
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: StatusOutput,
}

/// Status output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutput {
    /// Human-readable tables
    Table,
    /// JSON document
    Json,
}

/// Arguments for the generate command
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Brief description of the new migration
    pub description: String,

    /// Generate an executable (.rs) migration instead of a .sql one
    #[arg(long)]
    pub executable: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
