//! Trade statistics: counts, streaks, PnL split by winners and losers, lengths.

use serde_json::{json, Value};

use super::{number, Analyzer};
use crate::domain::{TradeEvent, TradeRecord};

#[derive(Debug, Clone, Copy, Default)]
struct Streak {
    current: u64,
    longest: u64,
}

impl Streak {
    fn extend(&mut self) {
        self.current += 1;
        self.longest = self.longest.max(self.current);
    }

    fn reset(&mut self) {
        self.current = 0;
    }
}

/// Collects every opened and closed trade of a run.
#[derive(Debug, Clone, Default)]
pub struct TradeAnalyzer {
    opened: u64,
    closed: Vec<TradeRecord>,
    won_streak: Streak,
    lost_streak: Streak,
}

impl TradeAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn closed(&self) -> &[TradeRecord] {
        &self.closed
    }

    fn open_count(&self) -> u64 {
        self.opened - self.closed.len() as u64
    }
}

fn pnl_block(pnls: &[f64]) -> Value {
    let total: f64 = pnls.iter().sum();
    let average = if pnls.is_empty() {
        0.0
    } else {
        total / pnls.len() as f64
    };
    json!({ "total": number(total), "average": number(average) })
}

fn side_block(pnls: &[f64], pick_max: fn(f64, f64) -> f64) -> Value {
    let max = pnls.iter().copied().reduce(pick_max).unwrap_or(0.0);
    let mut pnl = pnl_block(pnls);
    pnl["max"] = number(max);
    json!({ "total": pnls.len(), "pnl": pnl })
}

impl Analyzer for TradeAnalyzer {
    fn on_trade(&mut self, event: &TradeEvent) {
        match event {
            TradeEvent::Opened { .. } => self.opened += 1,
            TradeEvent::Closed(trade) => {
                if trade.is_winner() {
                    self.won_streak.extend();
                    self.lost_streak.reset();
                } else {
                    self.lost_streak.extend();
                    self.won_streak.reset();
                }
                self.closed.push(trade.clone());
            }
        }
    }

    fn analysis(&self) -> Value {
        if self.opened == 0 {
            return json!({ "total": { "total": 0 } });
        }

        let pnls: Vec<f64> = self.closed.iter().map(|t| t.pnl).collect();
        let (won, lost): (Vec<&TradeRecord>, Vec<&TradeRecord>) =
            self.closed.iter().partition(|t| t.is_winner());
        let won: Vec<f64> = won.iter().map(|t| t.pnl).collect();
        let lost: Vec<f64> = lost.iter().map(|t| t.pnl).collect();
        let lens: Vec<u64> = self.closed.iter().map(|t| t.bars_held as u64).collect();
        let len_total: u64 = lens.iter().sum();
        let len_average = if lens.is_empty() {
            0.0
        } else {
            len_total as f64 / lens.len() as f64
        };

        json!({
            "total": {
                "total": self.opened,
                "open": self.open_count(),
                "closed": self.closed.len(),
            },
            "streak": {
                "won": { "current": self.won_streak.current, "longest": self.won_streak.longest },
                "lost": { "current": self.lost_streak.current, "longest": self.lost_streak.longest },
            },
            "pnl": {
                "gross": pnl_block(&pnls),
                "net": pnl_block(&pnls),
            },
            // winners: largest gain; losers: deepest loss
            "won": side_block(&won, f64::max),
            "lost": side_block(&lost, f64::min),
            "len": {
                "total": len_total,
                "average": number(len_average),
                "max": lens.iter().copied().max().unwrap_or(0),
                "min": lens.iter().copied().min().unwrap_or(0),
            }
        })
    }
}
