// src/detection/gate.rs
//
// Decides whether the best-ranked candidate is trustworthy enough to vote.
// Three checks, in order, any failure rejects the frame:
//   1. the candidate passes its own signature threshold
//   2. confidence (margin inside that threshold) reaches the configured minimum
//   3. it beats the runner-up by at least the minimum separation ratio

use super::ranker::{Candidate, ScoringMetric};
use crate::types::DetectorConfig;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateRejection {
    NoCandidates,
    AboveThreshold { score: f64, threshold: f64 },
    LowConfidence { confidence: f64 },
    Ambiguous { separation: f64 },
}

impl fmt::Display for GateRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateRejection::NoCandidates => write!(f, "no valid candidates"),
            GateRejection::AboveThreshold { score, threshold } => {
                write!(f, "score {:.4} outside threshold {:.4}", score, threshold)
            }
            GateRejection::LowConfidence { confidence } => {
                write!(f, "confidence {:.2} too low", confidence)
            }
            GateRejection::Ambiguous { separation } => {
                write!(f, "separation {:.2}x too small", separation)
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Accepted<'a> {
    pub candidate: Candidate<'a>,
    pub confidence: f64,
    pub separation: f64,
}

#[derive(Debug, Clone)]
pub struct AmbiguityGate {
    min_confidence: f64,
    min_separation: f64,
}

impl AmbiguityGate {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            min_confidence: config.min_confidence,
            min_separation: config.min_separation,
        }
    }

    pub fn min_separation(&self) -> f64 {
        self.min_separation
    }

    /// `ranked` must be ordered best-first by the same `metric`.
    pub fn evaluate<'a>(
        &self,
        metric: &dyn ScoringMetric,
        ranked: &[Candidate<'a>],
    ) -> Result<Accepted<'a>, GateRejection> {
        let best = *ranked.first().ok_or(GateRejection::NoCandidates)?;
        let second = ranked.get(1);

        debug!(
            "Best: '{}' (score={:.4}, threshold={:.4}), second: {}",
            best.signature.name,
            best.score,
            best.signature.threshold,
            second
                .map(|c| format!("'{}' (score={:.4})", c.signature.name, c.score))
                .unwrap_or_else(|| "none".to_string())
        );

        let threshold = best.signature.threshold;
        if !metric.passes_threshold(best.score, threshold) {
            return Err(GateRejection::AboveThreshold {
                score: best.score,
                threshold,
            });
        }

        let confidence = metric.confidence(best.score, threshold);
        if confidence < self.min_confidence {
            return Err(GateRejection::LowConfidence { confidence });
        }

        let separation = metric.separation(best.score, second.map(|c| c.score));
        if separation < self.min_separation {
            return Err(GateRejection::Ambiguous { separation });
        }

        Ok(Accepted {
            candidate: best,
            confidence,
            separation,
        })
    }
}
