/// CLI argument definitions via clap derive.
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Top-level command line.
#[derive(Debug, Parser)]
#[command(
    name = "validkit",
    about = "ValidKit CLI - Email validation for AI agents",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options accepted before or after any subcommand.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// API key (overrides config and VALIDKIT_API_KEY).
    #[arg(short = 'k', long, global = true, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Output format [default: table].
    #[arg(short = 'f', long, global = true, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Suppress non-essential output.
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Print debug logs to stderr.
    #[arg(long, global = true)]
    pub verbose: bool,
}

/// Output format variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Full result, pretty-printed JSON.
    Json,
    /// Just `valid` or `invalid`.
    Compact,
    /// Human-readable report.
    #[default]
    Table,
}

/// All subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Verify a single email address.
    Verify(VerifyArgs),
    /// Verify emails from a file (one per line).
    Bulk(BulkArgs),
    /// Manage ValidKit configuration.
    Config(ConfigArgs),
}

/// Arguments for `validkit verify`.
#[derive(Debug, Clone, Parser)]
pub struct VerifyArgs {
    /// Email address to verify.
    pub email: String,

    /// Include debug information.
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Trace ID for agent tracking.
    #[arg(short = 't', long, value_name = "ID")]
    pub trace_id: Option<String>,
}

/// Arguments for `validkit bulk`.
#[derive(Debug, Clone, Parser)]
pub struct BulkArgs {
    /// File with one email address per line.
    pub file: PathBuf,

    /// Save raw JSON results to this file.
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Process asynchronously (implied above 1000 emails).
    #[arg(short = 'a', long = "async")]
    pub run_async: bool,

    /// Webhook URL for async results.
    #[arg(short = 'w', long, value_name = "URL")]
    pub webhook: Option<String>,

    /// Trace ID for agent tracking.
    #[arg(short = 't', long, value_name = "ID")]
    pub trace_id: Option<String>,

    /// Contribute results to the Agent Signal Pool.
    #[arg(long)]
    pub share_signals: bool,
}

/// Arguments for `validkit config`.
#[derive(Debug, Clone, Parser)]
pub struct ConfigArgs {
    /// Set and save the API key.
    #[arg(short = 's', long, value_name = "KEY")]
    pub set_key: Option<String>,

    /// Show current configuration (the default action).
    #[arg(short = 'g', long)]
    pub get: bool,

    /// Delete the stored configuration.
    #[arg(short = 'r', long)]
    pub reset: bool,
}
