//! Bar-by-bar simulation: broker accounting, strategy callback, analyzers.
//!
//! Per bar:
//! 1. Fill pending market orders at the open
//! 2. Mark positions to market at the close
//! 3. Notify analyzers of trade events and the bar's portfolio value
//! 4. Call the strategy, which may queue intents for the next bar

pub mod broker;
pub mod simulation;
pub mod strategy;

pub use broker::Broker;
pub use simulation::{Analyses, Simulation};
pub use strategy::{BarContext, Strategy};

use thiserror::Error;

/// Errors raised while running a simulation.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("analyzer '{0}' is already registered")]
    DuplicateAnalyzer(String),

    #[error("no bar data to simulate")]
    NoData,

    #[error("strategy failed on {date}: {source}")]
    Strategy {
        date: chrono::NaiveDate,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
