//! Order intents issued by a strategy and queued at the broker.

use serde::{Deserialize, Serialize};

/// What a strategy asks the broker to do.
///
/// Intents are market orders: they fill at the open of the next bar on
/// which the instrument trades.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderIntent {
    /// Buy an explicit number of shares.
    Buy { symbol: String, size: u64 },
    /// Flatten whatever position is held when the order fills.
    Close { symbol: String },
}

impl OrderIntent {
    pub fn symbol(&self) -> &str {
        match self {
            Self::Buy { symbol, .. } | Self::Close { symbol } => symbol,
        }
    }
}

/// An intent waiting for its fill bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOrder {
    pub id: u64,
    pub intent: OrderIntent,
    /// Bar index on which the intent was issued.
    pub created_bar: usize,
}
