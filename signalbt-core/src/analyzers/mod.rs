//! Streaming statistics over the portfolio value and trades.
//!
//! Each analyzer is fed the starting value, then per bar any trade events
//! followed by the bar's portfolio value. Its output is a nested JSON
//! mapping; undefined statistics are `null`.

pub mod annual_return;
pub mod calmar;
pub mod drawdown;
pub mod returns;
pub mod sharpe;
pub mod sqn;
pub mod stats;
pub mod trades;

pub use annual_return::AnnualReturn;
pub use calmar::Calmar;
pub use drawdown::DrawDown;
pub use returns::Returns;
pub use sharpe::SharpeRatio;
pub use sqn::Sqn;
pub use trades::TradeAnalyzer;

use chrono::NaiveDate;
use serde_json::Value;

use crate::domain::TradeEvent;

/// Trading periods per year used for annualization.
pub const PERIODS_PER_YEAR: f64 = 252.0;

/// Streaming statistic registered with a simulation.
pub trait Analyzer {
    fn start(&mut self, _starting_value: f64) {}

    fn on_trade(&mut self, _event: &TradeEvent) {}

    fn on_bar(&mut self, _date: NaiveDate, _value: f64) {}

    fn analysis(&self) -> Value;
}

/// JSON number, or `null` for NaN / infinite values.
pub(crate) fn number(x: f64) -> Value {
    serde_json::Number::from_f64(x).map_or(Value::Null, Value::Number)
}

/// JSON number for `Some(finite)`, `null` otherwise.
pub(crate) fn optional(x: Option<f64>) -> Value {
    x.map_or(Value::Null, number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_numbers_become_null() {
        assert_eq!(number(f64::NAN), Value::Null);
        assert_eq!(number(f64::INFINITY), Value::Null);
        assert_eq!(number(1.5), serde_json::json!(1.5));
        assert_eq!(optional(None), Value::Null);
    }
}
