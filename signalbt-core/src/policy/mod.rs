//! Classifier-driven signal policy.
//!
//! For every non-void bar the policy buffers the close, and once
//! `seq_length` closes are buffered it encodes their simple returns as text,
//! asks the classifier for a direction and applies the entry/exit rule.

pub mod config;
pub mod feature;
pub mod lookback;

pub use config::{OrderMode, PolicyConfig};
pub use feature::{encode_feature, simple_returns};
pub use lookback::Lookback;

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::classifier::{Classifier, ClassifierError, Prediction, SignalClass};
use crate::engine::{BarContext, Strategy};

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error("invalid policy config: {0}")]
    InvalidConfig(String),
}

/// What the decision rule did for one instrument on one bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Entry,
    Exit,
    Hold,
}

/// Per-instrument lookback, last signal and remembered entry size.
pub struct ClassifierPolicy<C> {
    config: PolicyConfig,
    classifier: C,
    lookbacks: HashMap<String, Lookback>,
    signals: HashMap<String, Prediction>,
    entry_sizes: HashMap<String, u64>,
}

impl<C: Classifier> ClassifierPolicy<C> {
    pub fn new(config: PolicyConfig, classifier: C) -> Result<Self, PolicyError> {
        config.validate()?;
        Ok(Self {
            config,
            classifier,
            lookbacks: HashMap::new(),
            signals: HashMap::new(),
            entry_sizes: HashMap::new(),
        })
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Most recent prediction for `symbol`, if it was ever classified.
    pub fn last_signal(&self, symbol: &str) -> Option<&Prediction> {
        self.signals.get(symbol)
    }

    /// Entry size last computed for `symbol`.
    pub fn entry_size(&self, symbol: &str) -> Option<u64> {
        self.entry_sizes.get(symbol).copied()
    }

    fn lookback(&mut self, symbol: &str) -> &mut Lookback {
        let capacity = self.config.seq_length;
        self.lookbacks
            .entry(symbol.to_string())
            .or_insert_with(|| Lookback::new(capacity))
    }

    fn decide(
        &mut self,
        ctx: &mut BarContext<'_>,
        symbol: &str,
        close: f64,
        prediction: &Prediction,
    ) -> Action {
        let threshold = self.config.threshold;
        let position = ctx.position_size(symbol);
        let confident = prediction.confidence > threshold;

        if position == 0 && prediction.class == SignalClass::Up && confident {
            if close <= 0.0 {
                return Action::Hold;
            }
            let size = (ctx.cash() * self.config.position_size / close).floor();
            if size.is_nan() || size < 1.0 {
                return Action::Hold;
            }
            let size = size as u64;
            self.entry_sizes.insert(symbol.to_string(), size);
            match self.config.order_mode {
                OrderMode::Literal => ctx.close(symbol),
                OrderMode::Intended => ctx.buy(symbol, size),
            };
            info!(
                "BUY {symbol} at {close:.2}, confidence: {:.2}",
                prediction.confidence
            );
            return Action::Entry;
        }

        if position != 0 && prediction.class == SignalClass::Down && confident {
            match self.config.order_mode {
                OrderMode::Literal => match self.entry_sizes.get(symbol).copied() {
                    Some(size) => {
                        ctx.buy(symbol, size);
                    }
                    None => {
                        warn!(symbol, "exit signal with no remembered entry size; skipped");
                        return Action::Hold;
                    }
                },
                OrderMode::Intended => {
                    ctx.close(symbol);
                }
            }
            info!(
                "SELL {symbol} at {close:.2}, confidence: {:.2}",
                prediction.confidence
            );
            return Action::Exit;
        }

        Action::Hold
    }
}

impl<C: Classifier> Strategy for ClassifierPolicy<C> {
    type Error = PolicyError;

    fn start(&mut self, symbols: &[String]) -> Result<(), PolicyError> {
        info!(
            model = self.classifier.model_name(),
            symbols = symbols.len(),
            seq_length = self.config.seq_length,
            threshold = self.config.threshold,
            order_mode = %self.config.order_mode,
            "signal policy started"
        );
        Ok(())
    }

    fn next(&mut self, ctx: &mut BarContext<'_>) -> Result<(), PolicyError> {
        for bar in ctx.bars() {
            if bar.is_void() {
                continue;
            }
            let symbol = bar.symbol.as_str();

            let lookback = self.lookback(symbol);
            lookback.push(bar.close);
            if !lookback.is_full() {
                continue;
            }
            let text = encode_feature(&simple_returns(&lookback.to_vec()));

            let prediction = self.classifier.classify(&text)?;
            debug!(
                symbol,
                date = %ctx.date(),
                class = ?prediction.class,
                confidence = prediction.confidence,
                "signal"
            );
            self.signals.insert(symbol.to_string(), prediction);

            self.decide(ctx, symbol, bar.close, &prediction);
        }
        Ok(())
    }
}
