//! Command-line interface definitions.
//!
//! Defines the CLI structure for the sharpline application using `clap`.
//! Subcommands scan snapshot sources once, run the refresh loop, convert
//! odds and manage configuration.

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG: &str = "config.toml";

/// Cross-venue odds normalization and arbitrage detection
#[derive(Parser, Debug)]
#[command(name = "sharpline")]
#[command(version)]
pub struct Cli {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands for the sharpline CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Refresh every category once and print opportunities
    Scan(ScanArgs),

    /// Refresh categories on an interval until Ctrl-C
    Run(RunArgs),

    /// Convert American odds to implied probability
    Odds(OddsArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Subcommands for `sharpline config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display the effective configuration with defaults applied.
    Show(ConfigPathArg),
    /// Validate a configuration file for correctness.
    Validate(ConfigPathArg),
}

/// Shared argument struct for commands that require only a configuration path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to the configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
}

/// Arguments for the `scan` subcommand.
#[derive(Parser, Debug)]
pub struct ScanArgs {
    /// Path to the configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Only scan this category.
    #[arg(long)]
    pub category: Option<String>,

    /// Also list value signals.
    #[arg(long)]
    pub value: bool,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Scheduler poll interval in seconds (overrides config).
    #[arg(long)]
    pub interval: Option<u64>,

    /// Emit logs as JSON.
    #[arg(long)]
    pub json_logs: bool,
}

/// Arguments for the `odds` subcommand.
#[derive(Parser, Debug)]
pub struct OddsArgs {
    /// American odds, e.g. -110 or +150.
    #[arg(allow_negative_numbers = true)]
    pub american: Decimal,
}
