//! Daily OHLCV bar, plus the void placeholder used for gaps.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily OHLCV bar for a single symbol.
///
/// The source timestamp carries a UTC offset; the simulation clock only
/// needs the calendar date it falls on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: f64,
}

impl Bar {
    /// Placeholder for a date on which the symbol has no data.
    pub fn void(symbol: &str, date: NaiveDate) -> Self {
        Self {
            symbol: symbol.to_string(),
            date,
            open: f64::NAN,
            high: f64::NAN,
            low: f64::NAN,
            close: f64::NAN,
            adj_close: f64::NAN,
            volume: 0.0,
        }
    }

    /// Returns true if any price field is NaN (void bar).
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> Bar {
        Bar {
            symbol: "SPY".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            adj_close: 103.0,
            volume: 50_000.0,
        }
    }

    #[test]
    fn real_bar_is_not_void() {
        assert!(!sample_bar().is_void());
    }

    #[test]
    fn void_bar_detected() {
        let bar = Bar::void("SPY", NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert!(bar.is_void());
        assert_eq!(bar.symbol, "SPY");
    }

    #[test]
    fn nan_close_is_void() {
        let mut bar = sample_bar();
        bar.close = f64::NAN;
        assert!(bar.is_void());
    }
}
