//! Cash broker: queued market orders, whole-share positions, trade lifecycle.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::domain::{OpenTrade, OrderIntent, PendingOrder, Position, TradeEvent, TradeRecord};

/// Broker state owned by the simulation.
///
/// The accounting identity holds after every mark:
/// `value == cash + sum(position size * last valid close)`.
#[derive(Debug, Clone)]
pub struct Broker {
    cash: f64,
    positions: HashMap<String, Position>,
    last_close: HashMap<String, f64>,
    pending: Vec<PendingOrder>,
    open_trades: HashMap<String, OpenTrade>,
    closed_trades: Vec<TradeRecord>,
    next_order_id: u64,
}

impl Broker {
    pub fn new(starting_cash: f64) -> Self {
        Self {
            cash: starting_cash,
            positions: HashMap::new(),
            last_close: HashMap::new(),
            pending: Vec::new(),
            open_trades: HashMap::new(),
            closed_trades: Vec::new(),
            next_order_id: 1,
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    /// Cash plus positions valued at each symbol's last valid close.
    pub fn value(&self) -> f64 {
        let positions: f64 = self
            .positions
            .values()
            .filter(|p| !p.is_flat())
            .map(|p| {
                let price = self.last_close.get(&p.symbol).copied().unwrap_or(p.avg_price);
                p.market_value(price)
            })
            .sum();
        self.cash + positions
    }

    /// Signed share count held in `symbol` (0 when flat or unknown).
    pub fn position_size(&self, symbol: &str) -> i64 {
        self.positions.get(symbol).map_or(0, |p| p.size)
    }

    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol).filter(|p| !p.is_flat())
    }

    /// Queue an intent; it fills at the next open of its instrument.
    pub fn submit(&mut self, intent: OrderIntent, bar_index: usize) -> u64 {
        let order = PendingOrder {
            id: self.next_order_id,
            intent,
            created_bar: bar_index,
        };
        self.next_order_id += 1;
        self.pending.push(order);
        self.next_order_id - 1
    }

    /// Orders not yet filled, in submission order.
    pub fn pending(&self) -> &[PendingOrder] {
        &self.pending
    }

    pub fn closed_trades(&self) -> &[TradeRecord] {
        &self.closed_trades
    }

    pub fn open_trade_count(&self) -> usize {
        self.open_trades.len()
    }

    /// Fill queued orders at the open price of their instrument's bar.
    ///
    /// `opens` maps symbol → open price for instruments trading this bar;
    /// orders for instruments without a price stay queued.
    pub fn fill_pending(
        &mut self,
        opens: &HashMap<&str, f64>,
        bar_index: usize,
        date: NaiveDate,
    ) -> Vec<TradeEvent> {
        let mut events = Vec::new();
        let mut still_pending = Vec::new();

        for order in std::mem::take(&mut self.pending) {
            let Some(&price) = opens.get(order.intent.symbol()) else {
                still_pending.push(order);
                continue;
            };

            let delta = match &order.intent {
                OrderIntent::Buy { symbol, size } => {
                    let cost = *size as f64 * price;
                    if cost > self.cash {
                        warn!(
                            order_id = order.id,
                            symbol = %symbol,
                            size,
                            cost,
                            cash = self.cash,
                            "order rejected: insufficient cash"
                        );
                        continue;
                    }
                    *size as i64
                }
                OrderIntent::Close { symbol } => {
                    let held = self.position_size(symbol);
                    if held == 0 {
                        debug!(order_id = order.id, symbol = %symbol, "close on flat position ignored");
                        continue;
                    }
                    -held
                }
            };

            let symbol = order.intent.symbol().to_string();
            events.extend(self.execute(&symbol, delta, price, bar_index, date));
        }

        self.pending = still_pending;
        events
    }

    /// Record the close of every trading instrument for valuation.
    pub fn mark(&mut self, closes: &HashMap<&str, f64>) {
        for (symbol, close) in closes {
            self.last_close.insert((*symbol).to_string(), *close);
        }
    }

    fn execute(
        &mut self,
        symbol: &str,
        delta: i64,
        price: f64,
        bar_index: usize,
        date: NaiveDate,
    ) -> Vec<TradeEvent> {
        let mut events = Vec::new();
        let position = self
            .positions
            .entry(symbol.to_string())
            .or_insert_with(|| Position::flat(symbol));
        let was_flat = position.is_flat();

        self.cash -= delta as f64 * price;
        let realized = position.apply(delta, price);
        let size_now = position.size;

        debug!(symbol, delta, price, size = size_now, "order filled");

        if was_flat {
            self.open_trades.insert(
                symbol.to_string(),
                OpenTrade {
                    symbol: symbol.to_string(),
                    entry_bar: bar_index,
                    entry_date: date,
                    entry_price: price,
                    max_size: size_now.unsigned_abs(),
                    realized_pnl: 0.0,
                },
            );
            events.push(TradeEvent::Opened {
                symbol: symbol.to_string(),
                bar_index,
            });
            return events;
        }

        if let Some(trade) = self.open_trades.get_mut(symbol) {
            trade.realized_pnl += realized;
            trade.max_size = trade.max_size.max(size_now.unsigned_abs());
        }

        if size_now == 0 {
            if let Some(trade) = self.open_trades.remove(symbol) {
                let record = TradeRecord {
                    symbol: trade.symbol,
                    entry_bar: trade.entry_bar,
                    entry_date: trade.entry_date,
                    entry_price: trade.entry_price,
                    exit_bar: bar_index,
                    exit_date: date,
                    exit_price: price,
                    size: trade.max_size,
                    pnl: trade.realized_pnl,
                    bars_held: bar_index - trade.entry_bar,
                };
                self.closed_trades.push(record.clone());
                events.push(TradeEvent::Closed(record));
            }
        }
        events
    }
}
