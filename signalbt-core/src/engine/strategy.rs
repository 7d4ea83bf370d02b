//! Strategy trait and the per-bar context handed to it.

use chrono::NaiveDate;

use super::broker::Broker;
use crate::domain::{Bar, OrderIntent, PendingOrder};

/// A decision-maker called once per aligned bar-set.
///
/// Strategies read broker state through [`BarContext`] and queue intents;
/// they never mutate positions directly.
pub trait Strategy {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Called once before the first bar with the symbols in feed order.
    fn start(&mut self, _symbols: &[String]) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called for every bar-set, after pending orders filled at the open.
    fn next(&mut self, ctx: &mut BarContext<'_>) -> Result<(), Self::Error>;
}

/// View of the simulation at one bar-set.
pub struct BarContext<'a> {
    bar_index: usize,
    date: NaiveDate,
    bars: &'a [&'a Bar],
    broker: &'a mut Broker,
}

impl<'a> BarContext<'a> {
    pub fn new(
        bar_index: usize,
        date: NaiveDate,
        bars: &'a [&'a Bar],
        broker: &'a mut Broker,
    ) -> Self {
        Self {
            bar_index,
            date,
            bars,
            broker,
        }
    }

    pub fn bar_index(&self) -> usize {
        self.bar_index
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// One bar per symbol, in feed order. Void bars mark closed markets.
    pub fn bars(&self) -> &'a [&'a Bar] {
        self.bars
    }

    pub fn cash(&self) -> f64 {
        self.broker.cash()
    }

    pub fn value(&self) -> f64 {
        self.broker.value()
    }

    pub fn position_size(&self, symbol: &str) -> i64 {
        self.broker.position_size(symbol)
    }

    /// Orders still waiting for a fill, including any queued on this bar.
    pub fn pending(&self) -> &[PendingOrder] {
        self.broker.pending()
    }

    /// Queue a market buy of `size` shares for the next bar.
    pub fn buy(&mut self, symbol: &str, size: u64) -> u64 {
        self.broker.submit(
            OrderIntent::Buy {
                symbol: symbol.to_string(),
                size,
            },
            self.bar_index,
        )
    }

    /// Queue a market order flattening `symbol` on the next bar.
    pub fn close(&mut self, symbol: &str) -> u64 {
        self.broker.submit(
            OrderIntent::Close {
                symbol: symbol.to_string(),
            },
            self.bar_index,
        )
    }
}
