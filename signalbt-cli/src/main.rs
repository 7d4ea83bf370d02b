//! signalbt CLI: run a classifier-driven backtest and emit JSON statistics.
//!
//! The report goes to `$OUTPUT_DIR/output.json` when `OUTPUT_DIR` is set,
//! otherwise to stdout as one line of compact JSON. Logs go to stderr.
//! Exit status is 0 on success and 1 on any failure.

mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use signalbt_core::classifier::HttpClassifier;
use signalbt_core::policy::OrderMode;
use signalbt_runner::{
    read_symbols, run_backtest, write_fallback, write_report, OutputTarget, RunConfig, RunFailure,
    RunReport,
};
use tracing::error;

const DEFAULT_SYMBOLS_FILE: &str = "symbols.txt";
const DEFAULT_START: &str = "2023-01-01";
const DEFAULT_END: &str = "2024-12-31";
const DEFAULT_RISK_FREE_RATE: f64 = 0.01;

const EXIT_OK: u8 = 0;
const EXIT_FAILED: u8 = 1;

#[derive(Debug, Parser)]
#[command(
    name = "signalbt",
    about = "Backtest a sequence-classifier trading signal over daily bars"
)]
struct Cli {
    /// Newline-delimited symbol list. Defaults to ./symbols.txt unless the config lists symbols.
    #[arg(long)]
    symbols: Option<PathBuf>,

    /// Path to a TOML run config. Flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start date (YYYY-MM-DD), inclusive. Defaults to 2023-01-01.
    #[arg(long)]
    start: Option<String>,

    /// End date (YYYY-MM-DD), inclusive. Defaults to 2024-12-31.
    #[arg(long)]
    end: Option<String>,

    /// Starting cash. Defaults to 10000.
    #[arg(long)]
    cash: Option<f64>,

    /// Annual risk-free rate for the Sharpe ratio. Defaults to 0.01.
    #[arg(long)]
    risk_free_rate: Option<f64>,

    /// Directory holding <SYMBOL>.csv files. Defaults to ./data.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Classifier inference URL; `{model}` is replaced by the model name.
    #[arg(long)]
    classifier_url: Option<String>,

    /// Classifier model name.
    #[arg(long)]
    model: Option<String>,

    /// literal: entries issue a close and exits buy; intended: entries buy and exits close.
    #[arg(long)]
    order_mode: Option<OrderMode>,

    /// Log level used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = logging::init_logging(&cli.log_level) {
        eprintln!("{e:#}");
    }

    match run(&cli) {
        Ok(status) => ExitCode::from(status),
        Err(e) => {
            error!("{e:#}");
            ExitCode::from(EXIT_FAILED)
        }
    }
}

fn run(cli: &Cli) -> Result<u8> {
    let config = build_config(cli)?;
    let classifier = HttpClassifier::new(&config.policy.model_name, &config.classifier)
        .context("cannot build classifier client")?;
    let target = OutputTarget::from_env();
    Ok(finish(run_backtest(&config, classifier), &target))
}

/// Emit the outcome of a run and pick the exit status.
fn finish(outcome: Result<RunReport, RunFailure>, target: &OutputTarget) -> u8 {
    match outcome {
        Ok(report) => emit(&report, target),
        Err(failure) => {
            error!(error = %failure.source, "backtest failed");
            write_fallback(&failure_message(&failure), &failure.report);
            EXIT_FAILED
        }
    }
}

fn failure_message(failure: &RunFailure) -> String {
    format!("backtest failed: {}", failure.source)
}

fn emit(report: &RunReport, target: &OutputTarget) -> u8 {
    match write_report(report, target) {
        Ok(()) => EXIT_OK,
        Err(e) => {
            error!(error = %e, "failed to write results");
            write_fallback(&format_args!("JSON serialization failed: {e}"), report);
            EXIT_FAILED
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'"))
}

/// TOML config (if any) first, then flags on top.
fn build_config(cli: &Cli) -> Result<RunConfig> {
    let mut config = match &cli.config {
        Some(path) => RunConfig::from_file(path)?,
        None => {
            let mut config = RunConfig::new(
                Vec::new(),
                parse_date(DEFAULT_START)?,
                parse_date(DEFAULT_END)?,
            );
            config.risk_free_rate = DEFAULT_RISK_FREE_RATE;
            config
        }
    };

    match &cli.symbols {
        Some(path) => config.symbols = read_symbols(path)?,
        None if config.symbols.is_empty() => {
            config.symbols = read_symbols(&PathBuf::from(DEFAULT_SYMBOLS_FILE))?;
        }
        None => {}
    }
    if let Some(start) = &cli.start {
        config.start_date = parse_date(start)?;
    }
    if let Some(end) = &cli.end {
        config.end_date = parse_date(end)?;
    }
    if let Some(cash) = cli.cash {
        config.starting_cash = cash;
    }
    if let Some(rate) = cli.risk_free_rate {
        config.risk_free_rate = rate;
    }
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(url) = &cli.classifier_url {
        config.classifier.endpoint = url.clone();
    }
    if let Some(model) = &cli.model {
        config.policy.model_name = model.clone();
    }
    if let Some(mode) = cli.order_mode {
        config.policy.order_mode = mode;
    }

    config.validate()?;
    Ok(config)
}
