use serde::{Deserialize, Serialize};

/// Position tracking (whole shares, signed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub size: i64,
    pub avg_price: f64,
}

impl Position {
    pub fn flat(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            size: 0,
            avg_price: 0.0,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.size == 0
    }

    pub fn market_value(&self, current_price: f64) -> f64 {
        self.size as f64 * current_price
    }

    /// Apply a signed fill. Returns realized PnL for any reduced portion.
    pub fn apply(&mut self, delta: i64, price: f64) -> f64 {
        if delta == 0 {
            return 0.0;
        }
        let same_direction = self.size == 0 || (self.size > 0) == (delta > 0);
        if same_direction {
            let new_size = self.size + delta;
            self.avg_price = (self.avg_price * self.size as f64 + price * delta as f64)
                / new_size as f64;
            self.size = new_size;
            return 0.0;
        }

        let closed = delta.abs().min(self.size.abs());
        let direction = self.size.signum() as f64;
        let realized = (price - self.avg_price) * closed as f64 * direction;
        let new_size = self.size + delta;
        if new_size == 0 {
            self.avg_price = 0.0;
        } else if new_size.signum() != self.size.signum() {
            // flipped through zero: the remainder opens at the fill price
            self.avg_price = price;
        }
        self.size = new_size;
        realized
    }
}
