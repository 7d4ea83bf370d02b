//! Domain types for signalbt

pub mod bar;
pub mod order;
pub mod position;
pub mod trade;

pub use bar::Bar;
pub use order::{OrderIntent, PendingOrder};
pub use position::Position;
pub use trade::{OpenTrade, TradeEvent, TradeRecord};
