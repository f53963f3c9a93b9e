// src/detection/validator.rs
//
// Structural checks on a raw keypoint frame before any math runs on it.

use crate::types::DetectorConfig;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameRejection {
    Empty,
    /// Length is not a whole number of landmarks
    ArityMismatch { len: usize, arity: usize },
    WrongLength { len: usize, expected: usize },
    NonFinite,
    /// Every component is near zero: the extractor saw no hand
    NoHand,
}

impl fmt::Display for FrameRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameRejection::Empty => write!(f, "empty frame"),
            FrameRejection::ArityMismatch { len, arity } => {
                write!(f, "length {} not divisible by arity {}", len, arity)
            }
            FrameRejection::WrongLength { len, expected } => {
                write!(f, "length {} (expected {})", len, expected)
            }
            FrameRejection::NonFinite => write!(f, "non-finite component"),
            FrameRejection::NoHand => write!(f, "near-zero values, no hand present"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FrameValidator {
    dimensions: usize,
    arity: usize,
    zero_epsilon: f64,
}

impl FrameValidator {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            dimensions: config.dimensions,
            arity: config.coordinate_arity.max(1),
            zero_epsilon: config.zero_epsilon,
        }
    }

    pub fn validate(&self, frame: &[f64]) -> Result<(), FrameRejection> {
        if frame.is_empty() {
            return Err(FrameRejection::Empty);
        }
        if frame.len() % self.arity != 0 {
            return Err(FrameRejection::ArityMismatch {
                len: frame.len(),
                arity: self.arity,
            });
        }
        if frame.len() != self.dimensions {
            return Err(FrameRejection::WrongLength {
                len: frame.len(),
                expected: self.dimensions,
            });
        }
        if frame.iter().any(|v| !v.is_finite()) {
            return Err(FrameRejection::NonFinite);
        }
        if frame.iter().all(|v| v.abs() < self.zero_epsilon) {
            return Err(FrameRejection::NoHand);
        }
        Ok(())
    }
}
