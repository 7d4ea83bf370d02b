//! Sharpe ratio over per-bar portfolio returns.

use chrono::NaiveDate;
use serde_json::{json, Value};

use super::stats::{mean, period_returns, pstdev};
use super::{optional, Analyzer, PERIODS_PER_YEAR};

/// Non-annualized Sharpe ratio of daily returns.
///
/// The annual risk-free rate is converted to a per-bar rate with
/// `(1 + r)^(1/252) - 1`. Undefined (`null`) with fewer than two returns
/// or a zero standard deviation.
#[derive(Debug, Clone)]
pub struct SharpeRatio {
    risk_free_rate: f64,
    start: f64,
    values: Vec<f64>,
}

impl SharpeRatio {
    pub fn new(risk_free_rate: f64) -> Self {
        Self {
            risk_free_rate,
            start: 0.0,
            values: Vec::new(),
        }
    }

    pub fn ratio(&self) -> Option<f64> {
        let returns = period_returns(self.start, &self.values);
        if returns.len() < 2 {
            return None;
        }
        let per_bar_rf = (1.0 + self.risk_free_rate).powf(1.0 / PERIODS_PER_YEAR) - 1.0;
        let excess: Vec<f64> = returns.iter().map(|r| r - per_bar_rf).collect();
        let std = pstdev(&excess);
        if std < 1e-15 {
            return None;
        }
        Some(mean(&excess) / std)
    }
}

impl Analyzer for SharpeRatio {
    fn start(&mut self, starting_value: f64) {
        self.start = starting_value;
    }

    fn on_bar(&mut self, _date: NaiveDate, value: f64) {
        self.values.push(value);
    }

    fn analysis(&self) -> Value {
        json!({ "sharperatio": optional(self.ratio()) })
    }
}
