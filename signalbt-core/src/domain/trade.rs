//! Trades: open round trips and completed ones.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A trade still in progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenTrade {
    pub symbol: String,
    pub entry_bar: usize,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    /// Largest absolute size reached while open.
    pub max_size: u64,
    pub realized_pnl: f64,
}

/// A closed round-trip trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub symbol: String,

    pub entry_bar: usize,
    pub entry_date: NaiveDate,
    pub entry_price: f64,

    pub exit_bar: usize,
    pub exit_date: NaiveDate,
    pub exit_price: f64,

    pub size: u64,
    pub pnl: f64,

    /// Bars between entry fill and exit fill.
    pub bars_held: usize,
}

impl TradeRecord {
    /// Break-even trades count as winners.
    pub fn is_winner(&self) -> bool {
        self.pnl >= 0.0
    }
}

/// Trade lifecycle notification delivered to analyzers.
#[derive(Debug, Clone)]
pub enum TradeEvent {
    Opened { symbol: String, bar_index: usize },
    Closed(TradeRecord),
}
