//! Calmar ratio: annualized return over maximum drawdown.

use chrono::NaiveDate;
use serde_json::{json, Value};

use super::stats::{annualized_return, max_drawdown};
use super::{optional, Analyzer};

#[derive(Debug, Clone, Default)]
pub struct Calmar {
    start: f64,
    values: Vec<f64>,
}

impl Calmar {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` when the run never drew down or the return is undefined.
    pub fn ratio(&self) -> Option<f64> {
        let dd = max_drawdown(self.start, &self.values);
        if dd <= 0.0 {
            return None;
        }
        annualized_return(self.start, &self.values).map(|r| r / dd)
    }
}

impl Analyzer for Calmar {
    fn start(&mut self, starting_value: f64) {
        self.start = starting_value;
    }

    fn on_bar(&mut self, _date: NaiveDate, value: f64) {
        self.values.push(value);
    }

    fn analysis(&self) -> Value {
        json!({ "calmar": optional(self.ratio()) })
    }
}
