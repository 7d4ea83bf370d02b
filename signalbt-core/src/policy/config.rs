//! Policy parameters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::PolicyError;

/// How the entry and exit branches translate into orders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderMode {
    /// Entry issues a close (no-op when flat); exit buys the remembered size.
    #[default]
    Literal,
    /// Entry buys the computed size; exit closes the position.
    Intended,
}

impl FromStr for OrderMode {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "literal" => Ok(Self::Literal),
            "intended" => Ok(Self::Intended),
            other => Err(PolicyError::InvalidConfig(format!(
                "order mode must be 'literal' or 'intended', got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for OrderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal => write!(f, "literal"),
            Self::Intended => write!(f, "intended"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub model_name: String,
    /// Closes required before the first classification.
    pub seq_length: usize,
    /// Minimum confidence (exclusive) for entries and exits.
    pub threshold: f64,
    /// Fraction of cash committed per entry.
    pub position_size: f64,
    pub order_mode: OrderMode,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            model_name: "distilbert-base-uncased".into(),
            seq_length: 10,
            threshold: 0.6,
            position_size: 0.15,
            order_mode: OrderMode::Literal,
        }
    }
}

impl PolicyConfig {
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.model_name.trim().is_empty() {
            return Err(PolicyError::InvalidConfig("model_name is empty".into()));
        }
        if self.seq_length < 1 {
            return Err(PolicyError::InvalidConfig(
                "seq_length must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(PolicyError::InvalidConfig(format!(
                "threshold must be within [0, 1], got {}",
                self.threshold
            )));
        }
        if !(self.position_size > 0.0 && self.position_size <= 1.0) {
            return Err(PolicyError::InvalidConfig(format!(
                "position_size must be within (0, 1], got {}",
                self.position_size
            )));
        }
        Ok(())
    }
}
