//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Notifier - rate-limited batch notification dispatcher
#[derive(Parser, Debug)]
#[command(
    name = "notifier",
    author,
    version,
    about = "Rate-limited batch notification dispatcher",
    long_about = "Reads notification envelopes ({\"to\": [...], \"body\": \"...\"}) from a \n\
                  JSON-lines file, sends the body to every recipient through the configured \n\
                  gateway under a shared fixed-window rate limit, and routes each envelope \n\
                  to success or failure with per-recipient status attributes."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "NOTIFIER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "NOTIFIER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Dispatch every envelope of an input file
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Parse an envelope file without dispatching
    Check(CheckArgs),

    /// Display the effective configuration
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "notifier.toml",
        env = "NOTIFIER_CONFIG"
    )]
    pub config: PathBuf,

    /// JSON-lines file, one envelope per line
    #[arg(short, long, env = "NOTIFIER_INPUT")]
    pub input: PathBuf,

    /// Directory receiving success.jsonl and failure.jsonl
    #[arg(short, long, default_value = "outcomes", env = "NOTIFIER_OUTPUT")]
    pub output: PathBuf,

    /// Maximum number of input units to process (0 = unlimited)
    #[arg(long, default_value = "0", env = "NOTIFIER_MAX_UNITS")]
    pub max_units: u64,

    /// Override the number of concurrently dispatched envelopes
    #[arg(long, env = "NOTIFIER_WORKERS")]
    pub workers: Option<usize>,

    /// Bypass the rate limiter
    #[arg(long)]
    pub no_rate_limit: bool,

    /// Validate configuration and exit without dispatching
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "NOTIFIER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "notifier.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `check` command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// JSON-lines file, one envelope per line
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "notifier.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
