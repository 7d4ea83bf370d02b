//! System Quality Number over closed-trade PnL.

use serde_json::{json, Value};

use super::stats::{mean, pstdev};
use super::{optional, Analyzer};
use crate::domain::TradeEvent;

#[derive(Debug, Clone, Default)]
pub struct Sqn {
    pnls: Vec<f64>,
}

impl Sqn {
    pub fn new() -> Self {
        Self::default()
    }

    /// `sqrt(n) * mean / std`; 0 with fewer than two trades, `None` with no dispersion.
    pub fn value(&self) -> Option<f64> {
        let n = self.pnls.len();
        if n < 2 {
            return Some(0.0);
        }
        let std = pstdev(&self.pnls);
        if std < 1e-15 {
            return None;
        }
        Some((n as f64).sqrt() * mean(&self.pnls) / std)
    }
}

impl Analyzer for Sqn {
    fn on_trade(&mut self, event: &TradeEvent) {
        if let TradeEvent::Closed(trade) = event {
            self.pnls.push(trade.pnl);
        }
    }

    fn analysis(&self) -> Value {
        json!({ "sqn": optional(self.value()), "trades": self.pnls.len() })
    }
}
