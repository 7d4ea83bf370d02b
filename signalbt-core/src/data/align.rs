//! Multi-symbol time alignment.
//!
//! Feeds are advanced in lock-step on the union of their dates. A symbol
//! missing a date gets a void bar (NaN prices); nothing is forward-filled.

use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

use crate::domain::Bar;

/// Bar data for several symbols on a common timeline.
#[derive(Debug)]
pub struct AlignedFeeds {
    /// The common date axis (sorted ascending).
    pub dates: Vec<NaiveDate>,
    /// Symbols in registration order.
    pub symbols: Vec<String>,
    /// `bars[i]` belongs to `symbols[i]` and has the same length as `dates`.
    pub bars: Vec<Vec<Bar>>,
}

impl AlignedFeeds {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// One bar per symbol for step `t`, in symbol order.
    pub fn step(&self, t: usize) -> Vec<&Bar> {
        self.bars.iter().map(|bars| &bars[t]).collect()
    }
}

/// Align feeds to the union of their dates, preserving symbol order.
pub fn align_feeds(feeds: &[(String, Vec<Bar>)]) -> AlignedFeeds {
    let dates: Vec<NaiveDate> = feeds
        .iter()
        .flat_map(|(_, bars)| bars.iter().map(|b| b.date))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let symbols: Vec<String> = feeds.iter().map(|(s, _)| s.clone()).collect();

    let bars = feeds
        .iter()
        .map(|(symbol, bars)| {
            let by_date: HashMap<NaiveDate, &Bar> = bars.iter().map(|b| (b.date, b)).collect();
            dates
                .iter()
                .map(|date| {
                    by_date
                        .get(date)
                        .map(|b| (*b).clone())
                        .unwrap_or_else(|| Bar::void(symbol, *date))
                })
                .collect()
        })
        .collect();

    AlignedFeeds {
        dates,
        symbols,
        bars,
    }
}
