//! Drawdown tracking: current and maximum, in percent, money and bars.

use chrono::NaiveDate;
use serde_json::{json, Value};

use super::{number, Analyzer};

#[derive(Debug, Clone, Default)]
pub struct DrawDown {
    peak: f64,
    len: u64,
    drawdown: f64,
    moneydown: f64,
    max_len: u64,
    max_drawdown: f64,
    max_moneydown: f64,
}

impl DrawDown {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Analyzer for DrawDown {
    fn start(&mut self, starting_value: f64) {
        self.peak = starting_value;
    }

    fn on_bar(&mut self, _date: NaiveDate, value: f64) {
        if value > self.peak {
            self.peak = value;
        }
        self.moneydown = self.peak - value;
        self.drawdown = if self.peak > 0.0 {
            100.0 * self.moneydown / self.peak
        } else {
            0.0
        };
        self.len = if self.drawdown > 0.0 { self.len + 1 } else { 0 };

        self.max_len = self.max_len.max(self.len);
        self.max_drawdown = self.max_drawdown.max(self.drawdown);
        self.max_moneydown = self.max_moneydown.max(self.moneydown);
    }

    fn analysis(&self) -> Value {
        json!({
            "len": self.len,
            "drawdown": number(self.drawdown),
            "moneydown": number(self.moneydown),
            "max": {
                "len": self.max_len,
                "drawdown": number(self.max_drawdown),
                "moneydown": number(self.max_moneydown),
            }
        })
    }
}
