//! Sequence classifier seam: text in, three-way distribution out.
//!
//! The policy only depends on [`Classifier`]. The shipped implementation
//! talks to a text-classification inference server over HTTP; tests use
//! scripted classifiers.

pub mod http;

pub use http::{HttpClassifier, HttpClassifierConfig};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Predicted direction of the next move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalClass {
    Down = 0,
    Neutral = 1,
    Up = 2,
}

impl SignalClass {
    pub const ALL: [SignalClass; 3] = [SignalClass::Down, SignalClass::Neutral, SignalClass::Up];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Argmax class of a distribution plus its probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub class: SignalClass,
    pub confidence: f64,
    pub probabilities: [f64; 3],
}

impl Prediction {
    /// Normalize `scores` and take the argmax (lowest index wins ties).
    pub fn from_probabilities(scores: [f64; 3]) -> Result<Self, ClassifierError> {
        if scores.iter().any(|s| !s.is_finite() || *s < 0.0) {
            return Err(ClassifierError::InvalidScores(format!("{scores:?}")));
        }
        let sum: f64 = scores.iter().sum();
        if sum <= 0.0 {
            return Err(ClassifierError::InvalidScores(format!("{scores:?}")));
        }
        let probabilities = scores.map(|s| s / sum);

        let mut best = 0;
        for i in 1..3 {
            if probabilities[i] > probabilities[best] {
                best = i;
            }
        }
        Ok(Self {
            class: SignalClass::ALL[best],
            confidence: probabilities[best],
            probabilities,
        })
    }
}

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classifier request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("classifier returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected classifier response: {0}")]
    Response(String),

    #[error("unknown label '{0}'")]
    UnknownLabel(String),

    #[error("invalid class scores {0}")]
    InvalidScores(String),
}

/// Maps an encoded price-movement text to a class distribution.
pub trait Classifier {
    fn model_name(&self) -> &str;

    fn classify(&self, text: &str) -> Result<Prediction, ClassifierError>;
}

impl<T: Classifier + ?Sized> Classifier for &T {
    fn model_name(&self) -> &str {
        (**self).model_name()
    }

    fn classify(&self, text: &str) -> Result<Prediction, ClassifierError> {
        (**self).classify(text)
    }
}

impl<T: Classifier + ?Sized> Classifier for Box<T> {
    fn model_name(&self) -> &str {
        (**self).model_name()
    }

    fn classify(&self, text: &str) -> Result<Prediction, ClassifierError> {
        (**self).classify(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_and_confidence() {
        let p = Prediction::from_probabilities([0.1, 0.2, 0.7]).unwrap();
        assert_eq!(p.class, SignalClass::Up);
        assert!((p.confidence - 0.7).abs() < 1e-12);
    }

    #[test]
    fn normalizes_unscaled_scores() {
        let p = Prediction::from_probabilities([2.0, 1.0, 1.0]).unwrap();
        assert_eq!(p.class, SignalClass::Down);
        assert!((p.confidence - 0.5).abs() < 1e-12);
    }

    #[test]
    fn ties_pick_lowest_index() {
        let p = Prediction::from_probabilities([0.4, 0.4, 0.2]).unwrap();
        assert_eq!(p.class, SignalClass::Down);
        let p = Prediction::from_probabilities([0.2, 0.4, 0.4]).unwrap();
        assert_eq!(p.class, SignalClass::Neutral);
    }

    #[test]
    fn rejects_degenerate_scores() {
        assert!(Prediction::from_probabilities([0.0, 0.0, 0.0]).is_err());
        assert!(Prediction::from_probabilities([f64::NAN, 0.5, 0.5]).is_err());
        assert!(Prediction::from_probabilities([-0.1, 0.5, 0.6]).is_err());
    }

    #[test]
    fn class_indices() {
        assert_eq!(SignalClass::Up.index(), 2);
        assert_eq!(SignalClass::from_index(0), Some(SignalClass::Down));
        assert_eq!(SignalClass::from_index(3), None);
    }
}
