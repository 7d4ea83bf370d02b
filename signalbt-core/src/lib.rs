//! signalbt core: bar feeds, simulation, analyzers, classifier-driven policy.
//!
//! This crate contains everything a single backtest needs:
//! - Domain types (bars, order intents, positions, trades)
//! - CSV bar loading and lock-step alignment across symbols
//! - A cash broker and the bar-by-bar simulation loop
//! - Streaming analyzers producing nested JSON statistics
//! - The [`classifier::Classifier`] seam and an HTTP implementation
//! - The signal policy mapping classifier output to order intents

pub mod analyzers;
pub mod classifier;
pub mod data;
pub mod domain;
pub mod engine;
pub mod policy;
