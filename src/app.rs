//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads configuration and sets up logging
//! - picks live or synthetic providers
//! - runs one evaluation cycle (or the TUI loop)
//! - prints reports/plots and writes optional exports

use std::path::Path;

use chrono::NaiveDate;
use clap::Parser;

use crate::cli::{Command, ExportArgs, ReportArgs, RunArgs};
use crate::config::DashboardConfig;
use crate::data::{FredClient, MacroSource, MarketSource, SyntheticSource, YahooClient};
use crate::error::AppError;
use crate::logging::{LogTarget, init_logging};

pub mod pipeline;

/// Log file used while the TUI owns the terminal.
const TUI_LOG_FILE: &str = "gd.log";

/// The two providers a cycle reads from.
pub struct Sources {
    pub market: Box<dyn MarketSource>,
    pub macro_source: Box<dyn MacroSource>,
}

impl Sources {
    /// Yahoo + FRED, or one seeded synthetic source behind both traits.
    pub fn from_args(args: &RunArgs, today: NaiveDate) -> Result<Self, AppError> {
        if args.offline {
            let src = SyntheticSource::new(args.seed, today);
            return Ok(Self {
                market: Box::new(src.clone()),
                macro_source: Box::new(src),
            });
        }

        let yahoo = YahooClient::new().map_err(|e| AppError::new(4, e.to_string()))?;
        Ok(Self {
            market: Box::new(yahoo),
            macro_source: Box::new(FredClient::from_env()),
        })
    }

    pub fn label(&self) -> String {
        format!("{} + {}", self.market.name(), self.macro_source.name())
    }
}

/// Entry point for the `gd` binary.
pub fn run() -> Result<(), AppError> {
    // We want `gd` and `gd -l 1y` to behave like `gd tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Report(args) => handle_report(args),
        Command::Export(args) => handle_export(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn today(args: &RunArgs) -> NaiveDate {
    args.as_of.unwrap_or_else(|| chrono::Local::now().date_naive())
}

fn load_config(args: &RunArgs) -> Result<DashboardConfig, AppError> {
    DashboardConfig::load(args.config.as_deref())
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    init_logging(LogTarget::Stderr)?;
    let config = load_config(&args.run)?;
    let today = today(&args.run);
    let sources = Sources::from_args(&args.run, today)?;

    let output = pipeline::run_cycle(
        &config,
        args.run.lookback,
        today,
        sources.market.as_ref(),
        sources.macro_source.as_ref(),
    )?;

    println!("{}", crate::report::format_report(&output, &config));

    if args.plot && !args.no_plot {
        println!("{}", crate::plot::render_price_plot(&output.table, args.width, args.height));
    }

    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    init_logging(LogTarget::Stderr)?;
    if args.table.is_none() && args.signal.is_none() {
        return Err(AppError::new(2, "Nothing to export: pass --table and/or --signal."));
    }

    let config = load_config(&args.run)?;
    let today = today(&args.run);
    let sources = Sources::from_args(&args.run, today)?;

    let output = pipeline::run_cycle(
        &config,
        args.run.lookback,
        today,
        sources.market.as_ref(),
        sources.macro_source.as_ref(),
    )?;

    if let Some(path) = &args.table {
        crate::io::write_table_csv(path, &output.table)?;
    }
    if let Some(path) = &args.signal {
        crate::io::write_signal_json(path, &output)?;
    }

    Ok(())
}

fn handle_tui(args: RunArgs) -> Result<(), AppError> {
    init_logging(LogTarget::File(Path::new(TUI_LOG_FILE)))?;
    let config = load_config(&args)?;
    let sources = Sources::from_args(&args, today(&args))?;
    crate::tui::run(config, args.lookback, args.as_of, sources)
}

/// Rewrite argv so `gd` defaults to `gd tui`.
///
/// Rules:
/// - `gd`                      -> `gd tui`
/// - `gd -l 1y ...`            -> `gd tui -l 1y ...`
/// - `gd --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "report" | "export" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_tui() {
        assert_eq!(rewrite_args(argv(&["gd"])), argv(&["gd", "tui"]));
    }

    #[test]
    fn leading_flags_go_to_tui() {
        assert_eq!(
            rewrite_args(argv(&["gd", "-l", "1y", "--offline"])),
            argv(&["gd", "tui", "-l", "1y", "--offline"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        assert_eq!(rewrite_args(argv(&["gd", "report", "-l", "1m"])), argv(&["gd", "report", "-l", "1m"]));
        assert_eq!(rewrite_args(argv(&["gd", "--help"])), argv(&["gd", "--help"]));
    }

    #[test]
    fn offline_sources_share_one_generator() {
        let args = RunArgs {
            lookback: crate::domain::Lookback::OneMonth,
            config: None,
            offline: true,
            seed: 1,
            as_of: None,
        };
        let today = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        let sources = Sources::from_args(&args, today).unwrap();
        assert_eq!(sources.label(), "synthetic + synthetic");
    }
}
