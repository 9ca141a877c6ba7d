//! Command-line parsing for the gold macro dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the pipeline code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::Lookback;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "gd", version, about = "Gold macro regime dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one cycle and print cards, regime, alerts and commentary.
    Report(ReportArgs),
    /// Run one cycle and write the aligned table and/or the signal to disk.
    Export(ExportArgs),
    /// Launch the interactive dashboard (default).
    Tui(RunArgs),
}

/// Options shared by every command.
#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    /// Display lookback.
    #[arg(short = 'l', long, value_enum, default_value_t = Lookback::ThreeMonths)]
    pub lookback: Lookback,

    /// TOML file overriding symbols, thresholds and derivation constants.
    #[arg(short = 'c', long, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Use seeded synthetic data instead of the network.
    #[arg(long)]
    pub offline: bool,

    /// Seed for `--offline` data.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Evaluate as of this date (YYYY-MM-DD) instead of today.
    #[arg(long, value_name = "DATE")]
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Print a plot of price against its moving average.
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Write the display-window table (raw + derived columns) to CSV.
    #[arg(long, value_name = "CSV")]
    pub table: Option<PathBuf>,

    /// Write the classifier output to JSON.
    #[arg(long, value_name = "JSON")]
    pub signal: Option<PathBuf>,
}
