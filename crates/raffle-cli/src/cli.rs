//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Raffle CLI - Run a time-boxed, single-winner reward event.
#[derive(Debug, Parser)]
#[command(name = "raffle")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "RAFFLE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database file (overrides the configured one)
    #[arg(long, global = true, env = "RAFFLE_DB")]
    pub database: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

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
    /// Quiet format (outcome kind only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the event if it does not exist yet
    Init(InitArgs),

    /// Submit a claim for an identifier
    Submit(SubmitArgs),

    /// Show slots, winner and time remaining
    Status,

    /// Show a live countdown until the event closes
    Watch(WatchArgs),
}

/// Arguments for the init command.
#[derive(Debug, Parser)]
pub struct InitArgs {
    /// Event length in days
    #[arg(short, long, conflicts_with = "deadline_ms")]
    pub days: Option<u64>,

    /// Absolute deadline in milliseconds since the Unix epoch
    #[arg(long)]
    pub deadline_ms: Option<u64>,

    /// Number of winning slots
    #[arg(short, long)]
    pub slots: Option<u32>,
}

/// Arguments for the submit command.
#[derive(Debug, Parser)]
pub struct SubmitArgs {
    /// Participant identifier
    pub uid: String,
}

/// Arguments for the watch command.
#[derive(Debug, Parser)]
pub struct WatchArgs {
    /// Seconds between updates
    #[arg(short, long, default_value = "1")]
    pub interval_secs: u64,
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
