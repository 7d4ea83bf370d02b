//! Simulation driver: lock-step bar loop over every registered feed.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use super::broker::Broker;
use super::strategy::{BarContext, Strategy};
use super::EngineError;
use crate::analyzers::Analyzer;
use crate::data::align_feeds;
use crate::domain::{Bar, TradeEvent};

/// Analyzer outputs keyed by the name given at registration.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Analyses(BTreeMap<String, Value>);

impl Analyses {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }

    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.0
    }
}

impl FromIterator<(String, Value)> for Analyses {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A single backtest: starting cash, daily feeds, named analyzers.
///
/// Meant to be run once; the broker keeps its end-of-run state so the
/// final portfolio value can be read after [`Simulation::run`].
pub struct Simulation {
    broker: Broker,
    feeds: Vec<(String, Vec<Bar>)>,
    analyzers: Vec<(String, Box<dyn Analyzer>)>,
}

impl Simulation {
    pub fn new(starting_cash: f64) -> Self {
        Self {
            broker: Broker::new(starting_cash),
            feeds: Vec::new(),
            analyzers: Vec::new(),
        }
    }

    /// Attach a daily bar feed. Feed order is the order the strategy sees.
    pub fn add_feed(&mut self, symbol: impl Into<String>, bars: Vec<Bar>) {
        self.feeds.push((symbol.into(), bars));
    }

    /// Register an analyzer under a name used to retrieve its output.
    pub fn add_analyzer(
        &mut self,
        name: impl Into<String>,
        analyzer: Box<dyn Analyzer>,
    ) -> Result<(), EngineError> {
        let name = name.into();
        if self.analyzers.iter().any(|(n, _)| *n == name) {
            return Err(EngineError::DuplicateAnalyzer(name));
        }
        self.analyzers.push((name, analyzer));
        Ok(())
    }

    pub fn feeds(&self) -> &[(String, Vec<Bar>)] {
        &self.feeds
    }

    pub fn broker(&self) -> &Broker {
        &self.broker
    }

    /// Current portfolio value (starting cash before the run).
    pub fn value(&self) -> f64 {
        self.broker.value()
    }

    /// Drive every bar through the broker, analyzers and strategy.
    pub fn run<S: Strategy>(&mut self, strategy: &mut S) -> Result<Analyses, EngineError> {
        if self.feeds.is_empty() {
            return Err(EngineError::NoData);
        }

        let aligned = align_feeds(&self.feeds);
        let start_date = aligned.dates.first().copied().unwrap_or(chrono::NaiveDate::MIN);
        strategy
            .start(&aligned.symbols)
            .map_err(|e| EngineError::Strategy {
                date: start_date,
                source: Box::new(e),
            })?;

        let starting_value = self.broker.value();
        for (_, analyzer) in &mut self.analyzers {
            analyzer.start(starting_value);
        }

        info!(
            symbols = aligned.symbols.len(),
            bars = aligned.len(),
            "simulation started"
        );

        for (t, &date) in aligned.dates.iter().enumerate() {
            let step = aligned.step(t);

            let opens: HashMap<&str, f64> = step
                .iter()
                .filter(|b| !b.is_void())
                .map(|b| (b.symbol.as_str(), b.open))
                .collect();
            let events = self.broker.fill_pending(&opens, t, date);

            let closes: HashMap<&str, f64> = step
                .iter()
                .filter(|b| !b.is_void())
                .map(|b| (b.symbol.as_str(), b.close))
                .collect();
            self.broker.mark(&closes);
            let value = self.broker.value();

            for (_, analyzer) in &mut self.analyzers {
                for event in &events {
                    analyzer.on_trade(event);
                }
                analyzer.on_bar(date, value);
            }
            for event in &events {
                if let TradeEvent::Closed(trade) = event {
                    debug!(symbol = %trade.symbol, pnl = trade.pnl, "trade closed");
                }
            }

            let mut ctx = BarContext::new(t, date, &step, &mut self.broker);
            strategy.next(&mut ctx).map_err(|e| EngineError::Strategy {
                date,
                source: Box::new(e),
            })?;
        }

        info!(
            value = self.broker.value(),
            closed_trades = self.broker.closed_trades().len(),
            open_trades = self.broker.open_trade_count(),
            "simulation finished"
        );

        Ok(self
            .analyzers
            .iter()
            .map(|(name, analyzer)| (name.clone(), analyzer.analysis()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::TradeAnalyzer;
    use chrono::NaiveDate;

    #[derive(Debug, thiserror::Error)]
    #[error("boom")]
    struct Boom;

    struct Idle;

    impl Strategy for Idle {
        type Error = Boom;
        fn next(&mut self, _ctx: &mut BarContext<'_>) -> Result<(), Boom> {
            Ok(())
        }
    }

    struct FailOnThird(usize);

    impl Strategy for FailOnThird {
        type Error = Boom;
        fn next(&mut self, _ctx: &mut BarContext<'_>) -> Result<(), Boom> {
            self.0 += 1;
            if self.0 == 3 {
                return Err(Boom);
            }
            Ok(())
        }
    }

    fn bars(symbol: &str, closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar {
                symbol: symbol.into(),
                date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap() + chrono::Duration::days(i as i64),
                open: c,
                high: c,
                low: c,
                close: c,
                adj_close: c,
                volume: 100.0,
            })
            .collect()
    }

    #[test]
    fn duplicate_analyzer_rejected() {
        let mut sim = Simulation::new(1_000.0);
        sim.add_analyzer("trades", Box::new(TradeAnalyzer::new()))
            .unwrap();
        let err = sim
            .add_analyzer("trades", Box::new(TradeAnalyzer::new()))
            .unwrap_err();
        assert!(matches!(err, EngineError::DuplicateAnalyzer(name) if name == "trades"));
    }

    #[test]
    fn run_without_feeds_fails() {
        let mut sim = Simulation::new(1_000.0);
        assert!(matches!(sim.run(&mut Idle), Err(EngineError::NoData)));
    }

    #[test]
    fn idle_run_keeps_value_and_returns_named_analyses() {
        let mut sim = Simulation::new(1_000.0);
        sim.add_feed("SPY", bars("SPY", &[100.0, 101.0, 99.0]));
        sim.add_analyzer("trades", Box::new(TradeAnalyzer::new()))
            .unwrap();
        let analyses = sim.run(&mut Idle).unwrap();
        assert_eq!(sim.value(), 1_000.0);
        assert_eq!(analyses.names().collect::<Vec<_>>(), vec!["trades"]);
        assert_eq!(analyses.get("trades").unwrap()["total"]["total"], 0);
    }

    #[test]
    fn strategy_error_aborts_with_date() {
        let mut sim = Simulation::new(1_000.0);
        sim.add_feed("SPY", bars("SPY", &[1.0, 2.0, 3.0, 4.0]));
        let err = sim.run(&mut FailOnThird(0)).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("2024-01-04"), "{msg}");
        assert!(msg.contains("boom"), "{msg}");
    }
}
