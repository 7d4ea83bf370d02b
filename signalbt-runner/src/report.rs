//! Result reducer: analyzer output flattened into one stable record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use signalbt_core::engine::Analyses;

use crate::config::RunConfig;
use crate::lookup::{lookup, safe_count, safe_f64, safe_u64};

/// Inputs echoed into every report, successful or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunParameters {
    pub symbols: Vec<String>,
    pub start_date: String,
    pub end_date: String,
}

impl RunParameters {
    pub fn from_config(config: &RunConfig) -> Self {
        Self {
            symbols: config.symbols.clone(),
            start_date: config.start_date.format("%Y-%m-%d").to_string(),
            end_date: config.end_date.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Flat performance summary of one run. `None` fields serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub initial_value: f64,
    pub final_value: f64,
    pub portfolio_return_pct: f64,
    pub portfolio_net_pnl: f64,

    pub annualized_return_pct: Option<f64>,
    pub sharpe_ratio: Option<f64>,
    pub calmar_ratio: Option<f64>,
    pub sqn: Option<f64>,

    pub max_drawdown_pct: Option<f64>,
    pub max_drawdown_money: Option<f64>,
    pub max_drawdown_duration_bars: Option<u64>,

    pub total_trades: u64,
    pub trades_open: u64,
    pub trades_closed: u64,
    pub win_trades: u64,
    pub loss_trades: u64,
    pub win_rate_pct: f64,

    pub total_net_pnl: f64,
    pub average_win_pnl: f64,
    pub average_loss_pnl: f64,
    pub profit_factor: Option<f64>,

    pub max_consecutive_wins: u64,
    pub max_consecutive_losses: u64,
    pub average_trade_duration_bars: Option<f64>,

    pub annual_returns: BTreeMap<String, Option<f64>>,
}

/// The document written at the end of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub parameters: RunParameters,
    pub results: Option<ResultRecord>,
    pub error: Option<String>,
}

impl RunReport {
    pub fn pending(parameters: RunParameters) -> Self {
        Self {
            parameters,
            results: None,
            error: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.results.is_some()
    }
}

/// Overall return in percent; 0 when the initial value is 0.
pub fn portfolio_return_pct(initial: f64, final_value: f64) -> f64 {
    if initial == 0.0 {
        return 0.0;
    }
    (final_value - initial) / initial * 100.0
}

/// `abs(won / lost)`; `None` when the loss total is absent or 0.
pub fn profit_factor(won_total: Option<f64>, lost_total: Option<f64>) -> Option<f64> {
    let lost = lost_total.filter(|l| *l != 0.0)?;
    let won = won_total.unwrap_or(0.0);
    Some((won / lost).abs())
}

/// Reduce analyzer output by registration name into a [`ResultRecord`].
pub fn reduce(initial_value: f64, final_value: f64, analyses: &Analyses) -> ResultRecord {
    let root = Value::Object(
        analyses
            .clone()
            .into_inner()
            .into_iter()
            .collect::<serde_json::Map<String, Value>>(),
    );
    let trades_closed = safe_count(&root, &["trades", "total", "closed"]);
    let win_trades = safe_count(&root, &["trades", "won", "total"]);
    let win_rate_pct = if trades_closed == 0 {
        0.0
    } else {
        win_trades as f64 / trades_closed as f64 * 100.0
    };

    let annual_returns = lookup(&root, &["annualreturn"])
        .and_then(Value::as_object)
        .map(|years| {
            years
                .iter()
                .map(|(year, r)| (year.clone(), r.as_f64().filter(|n| n.is_finite())))
                .collect()
        })
        .unwrap_or_default();

    ResultRecord {
        initial_value,
        final_value,
        portfolio_return_pct: portfolio_return_pct(initial_value, final_value),
        portfolio_net_pnl: final_value - initial_value,

        annualized_return_pct: safe_f64(&root, &["returns", "rannually"]),
        sharpe_ratio: safe_f64(&root, &["sharpe", "sharperatio"]),
        calmar_ratio: safe_f64(&root, &["calmar", "calmar"]),
        sqn: safe_f64(&root, &["sqn", "sqn"]),

        max_drawdown_pct: safe_f64(&root, &["drawdown", "max", "drawdown"]),
        max_drawdown_money: safe_f64(&root, &["drawdown", "max", "moneydown"]),
        max_drawdown_duration_bars: safe_u64(&root, &["drawdown", "max", "len"]),

        total_trades: safe_count(&root, &["trades", "total", "total"]),
        trades_open: safe_count(&root, &["trades", "total", "open"]),
        trades_closed,
        win_trades,
        loss_trades: safe_count(&root, &["trades", "lost", "total"]),
        win_rate_pct,

        total_net_pnl: safe_f64(&root, &["trades", "pnl", "net", "total"]).unwrap_or(0.0),
        average_win_pnl: safe_f64(&root, &["trades", "won", "pnl", "average"]).unwrap_or(0.0),
        average_loss_pnl: safe_f64(&root, &["trades", "lost", "pnl", "average"]).unwrap_or(0.0),
        profit_factor: profit_factor(
            safe_f64(&root, &["trades", "won", "pnl", "total"]),
            safe_f64(&root, &["trades", "lost", "pnl", "total"]),
        ),

        max_consecutive_wins: safe_count(&root, &["trades", "streak", "won", "longest"]),
        max_consecutive_losses: safe_count(&root, &["trades", "streak", "lost", "longest"]),
        average_trade_duration_bars: safe_f64(&root, &["trades", "len", "average"]),

        annual_returns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn analyses(pairs: Vec<(&str, Value)>) -> Analyses {
        pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn no_trades_defaults() {
        let a = analyses(vec![
            ("trades", json!({ "total": { "total": 0 } })),
            ("sharpe", json!({ "sharperatio": null })),
            ("annualreturn", json!({ "2024": 0.0 })),
        ]);
        let r = reduce(10_000.0, 10_000.0, &a);
        assert_eq!(r.total_trades, 0);
        assert_eq!(r.trades_closed, 0);
        assert_eq!(r.win_rate_pct, 0.0);
        assert_eq!(r.profit_factor, None);
        assert_eq!(r.sharpe_ratio, None);
        assert_eq!(r.calmar_ratio, None);
        assert_eq!(r.average_trade_duration_bars, None);
        assert_eq!(r.total_net_pnl, 0.0);
        assert_eq!(r.portfolio_return_pct, 0.0);
        assert_eq!(r.annual_returns.get("2024"), Some(&Some(0.0)));
    }

    #[test]
    fn full_trade_analysis() {
        let a = analyses(vec![(
            "trades",
            json!({
                "total": { "total": 5, "open": 1, "closed": 4 },
                "streak": { "won": { "longest": 2 }, "lost": { "longest": 1 } },
                "pnl": { "net": { "total": 150.0 } },
                "won": { "total": 3, "pnl": { "total": 200.0, "average": 66.6 } },
                "lost": { "total": 1, "pnl": { "total": -50.0, "average": -50.0 } },
                "len": { "average": 4.25 }
            }),
        )]);
        let r = reduce(10_000.0, 10_150.0, &a);
        assert_eq!(r.total_trades, 5);
        assert_eq!(r.trades_open, 1);
        assert_eq!(r.win_trades, 3);
        assert_eq!(r.loss_trades, 1);
        assert_eq!(r.win_rate_pct, 75.0);
        assert_eq!(r.profit_factor, Some(4.0));
        assert_eq!(r.max_consecutive_wins, 2);
        assert_eq!(r.average_loss_pnl, -50.0);
        assert_eq!(r.average_trade_duration_bars, Some(4.25));
        assert!((r.portfolio_return_pct - 1.5).abs() < 1e-12);
        assert_eq!(r.portfolio_net_pnl, 150.0);
    }

    #[test]
    fn zero_initial_value_has_zero_return() {
        assert_eq!(portfolio_return_pct(0.0, 500.0), 0.0);
        let r = reduce(0.0, 0.0, &Analyses::default());
        assert_eq!(r.portfolio_return_pct, 0.0);
    }

    #[test]
    fn profit_factor_edges() {
        assert_eq!(profit_factor(Some(10.0), Some(0.0)), None);
        assert_eq!(profit_factor(Some(10.0), None), None);
        assert_eq!(profit_factor(None, Some(-5.0)), Some(0.0));
        assert_eq!(profit_factor(Some(30.0), Some(-10.0)), Some(3.0));
    }

    #[test]
    fn empty_analyses_never_panic() {
        let r = reduce(1.0, 2.0, &Analyses::default());
        assert_eq!(r.max_drawdown_pct, None);
        assert!(r.annual_returns.is_empty());
    }

    #[test]
    fn parameters_format_dates() {
        let cfg = RunConfig::new(
            vec!["SPY".into()],
            chrono::NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        );
        let p = RunParameters::from_config(&cfg);
        assert_eq!(p.start_date, "2023-01-01");
        assert_eq!(p.end_date, "2024-12-31");
    }
}
