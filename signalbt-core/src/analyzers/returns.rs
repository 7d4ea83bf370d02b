//! Log returns of the portfolio value, total and annualized.

use chrono::NaiveDate;
use serde_json::{json, Value};

use super::{number, Analyzer, PERIODS_PER_YEAR};

#[derive(Debug, Clone, Default)]
pub struct Returns {
    start: f64,
    last: f64,
    bars: u64,
}

impl Returns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total log return; NaN when either endpoint is non-positive.
    pub fn rtot(&self) -> f64 {
        if self.start > 0.0 && self.last > 0.0 {
            (self.last / self.start).ln()
        } else {
            f64::NAN
        }
    }

    pub fn ravg(&self) -> f64 {
        if self.bars == 0 {
            return 0.0;
        }
        self.rtot() / self.bars as f64
    }

    /// Annualized compound return as a fraction.
    pub fn rnorm(&self) -> f64 {
        (self.ravg() * PERIODS_PER_YEAR).exp() - 1.0
    }
}

impl Analyzer for Returns {
    fn start(&mut self, starting_value: f64) {
        self.start = starting_value;
        self.last = starting_value;
    }

    fn on_bar(&mut self, _date: NaiveDate, value: f64) {
        self.last = value;
        self.bars += 1;
    }

    fn analysis(&self) -> Value {
        let rnorm100 = self.rnorm() * 100.0;
        json!({
            "rtot": number(self.rtot()),
            "ravg": number(self.ravg()),
            "rnorm": number(self.rnorm()),
            "rnorm100": number(rnorm100),
            "rannually": number(rnorm100),
        })
    }
}
