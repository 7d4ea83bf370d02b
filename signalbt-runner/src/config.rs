//! Run configuration: what to backtest, with which money, against which model.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use signalbt_core::classifier::HttpClassifierConfig;
use signalbt_core::policy::{PolicyConfig, PolicyError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid run config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid run config: {0}")]
    Invalid(String),

    #[error(transparent)]
    Policy(#[from] PolicyError),
}

fn default_starting_cash() -> f64 {
    10_000.0
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

/// Everything a single run needs. Dates are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub symbols: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default = "default_starting_cash")]
    pub starting_cash: f64,
    /// Annual rate used by the Sharpe ratio.
    #[serde(default)]
    pub risk_free_rate: f64,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub classifier: HttpClassifierConfig,
}

impl RunConfig {
    pub fn new(symbols: Vec<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            symbols,
            start_date,
            end_date,
            starting_cash: default_starting_cash(),
            risk_free_rate: 0.0,
            data_dir: default_data_dir(),
            policy: PolicyConfig::default(),
            classifier: HttpClassifierConfig::default(),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::Invalid("no symbols given".into()));
        }
        for symbol in &self.symbols {
            if symbol.is_empty() || symbol.contains(['/', '\\']) {
                return Err(ConfigError::Invalid(format!("bad symbol '{symbol}'")));
            }
        }
        if self.start_date > self.end_date {
            return Err(ConfigError::Invalid(format!(
                "start date {} is after end date {}",
                self.start_date, self.end_date
            )));
        }
        if !self.starting_cash.is_finite() || self.starting_cash < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "starting cash must be a non-negative number, got {}",
                self.starting_cash
            )));
        }
        if !self.risk_free_rate.is_finite() {
            return Err(ConfigError::Invalid("risk-free rate must be finite".into()));
        }
        if self.classifier.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("classifier endpoint is empty".into()));
        }
        if self.classifier.timeout_secs == 0 {
            return Err(ConfigError::Invalid("classifier timeout must be positive".into()));
        }
        self.policy.validate()?;
        Ok(())
    }
}

/// Read a newline-delimited symbol list; blank lines are skipped.
pub fn read_symbols(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_symbols(&content))
}

pub fn parse_symbols(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
