//! signalbt runner: backtest orchestration, result reduction, JSON output.
//!
//! This crate builds on `signalbt-core` to provide:
//! - Run configuration loaded from TOML and validated
//! - The orchestrator wiring feeds, analyzers and the signal policy together
//! - A never-failing nested lookup over analyzer output
//! - The flat result record and its report envelope
//! - Compact JSON output to a directory or stdout, with a fallback writer

pub mod config;
pub mod lookup;
pub mod output;
pub mod report;
pub mod runner;

pub use config::{parse_symbols, read_symbols, ConfigError, RunConfig};
pub use lookup::{lookup, safe_count, safe_f64, safe_get, safe_u64};
pub use output::{
    render_fallback, to_compact_json, write_fallback, write_report, OutputError, OutputTarget,
};
pub use report::{reduce, ResultRecord, RunParameters, RunReport};
pub use runner::{run_backtest, RunError, RunFailure, ANALYZER_NAMES};
