// src/detection/ranker.rs
//
// Scores a normalized frame against every loaded signature and orders the
// candidates best-first. The metric owns its polarity: smaller is better for
// distances, larger is better for similarities. Everything downstream asks
// the metric instead of assuming one or the other.

use crate::signature::GestureSignature;
use crate::types::MetricKind;
use ndarray::Array1;
use std::cmp::Ordering;
use std::fmt;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreError {
    DimensionMismatch { frame: usize, signature: usize },
    NonFinite,
}

impl fmt::Display for ScoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreError::DimensionMismatch { frame, signature } => {
                write!(f, "incompatible dimensions: {} vs {}", frame, signature)
            }
            ScoreError::NonFinite => write!(f, "score is not finite"),
        }
    }
}

pub trait ScoringMetric: Send + Sync + fmt::Debug {
    fn kind(&self) -> MetricKind;

    fn score(&self, frame: &Array1<f64>, reference: &Array1<f64>) -> Result<f64, ScoreError>;

    /// `Less` when `a` is the better score
    fn compare(&self, a: f64, b: f64) -> Ordering;

    fn passes_threshold(&self, score: f64, threshold: f64) -> bool;

    /// How far inside its threshold a passing score sits, in [0, 1]
    fn confidence(&self, score: f64, threshold: f64) -> f64;

    /// Margin of the best candidate over the runner-up; infinite without one
    fn separation(&self, best: f64, second: Option<f64>) -> f64;

    /// Score expressed as a distance (0 = identical)
    fn as_distance(&self, score: f64) -> f64;
}

fn check_dims(frame: &Array1<f64>, reference: &Array1<f64>) -> Result<(), ScoreError> {
    if frame.len() != reference.len() {
        return Err(ScoreError::DimensionMismatch {
            frame: frame.len(),
            signature: reference.len(),
        });
    }
    Ok(())
}

fn finite(score: f64) -> Result<f64, ScoreError> {
    if score.is_finite() {
        Ok(score)
    } else {
        Err(ScoreError::NonFinite)
    }
}

/// Ratio of two "gaps" where a smaller gap is better. Two zero gaps are a
/// tie, not a perfect separation.
fn gap_ratio(best_gap: f64, second_gap: f64) -> f64 {
    if best_gap <= 0.0 {
        if second_gap <= 0.0 {
            1.0
        } else {
            f64::INFINITY
        }
    } else {
        second_gap / best_gap
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean;

impl ScoringMetric for Euclidean {
    fn kind(&self) -> MetricKind {
        MetricKind::Euclidean
    }

    fn score(&self, frame: &Array1<f64>, reference: &Array1<f64>) -> Result<f64, ScoreError> {
        check_dims(frame, reference)?;
        let diff = frame - reference;
        finite(diff.dot(&diff).sqrt())
    }

    fn compare(&self, a: f64, b: f64) -> Ordering {
        a.partial_cmp(&b).unwrap_or(Ordering::Equal)
    }

    fn passes_threshold(&self, score: f64, threshold: f64) -> bool {
        score <= threshold
    }

    fn confidence(&self, score: f64, threshold: f64) -> f64 {
        (1.0 - score / threshold).clamp(0.0, 1.0)
    }

    fn separation(&self, best: f64, second: Option<f64>) -> f64 {
        match second {
            Some(second) => gap_ratio(best, second),
            None => f64::INFINITY,
        }
    }

    fn as_distance(&self, score: f64) -> f64 {
        score
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Cosine;

impl ScoringMetric for Cosine {
    fn kind(&self) -> MetricKind {
        MetricKind::Cosine
    }

    fn score(&self, frame: &Array1<f64>, reference: &Array1<f64>) -> Result<f64, ScoreError> {
        check_dims(frame, reference)?;
        let norm_a = frame.dot(frame).sqrt();
        let norm_b = reference.dot(reference).sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            return Ok(0.0);
        }
        finite((frame.dot(reference) / (norm_a * norm_b)).clamp(-1.0, 1.0))
    }

    fn compare(&self, a: f64, b: f64) -> Ordering {
        b.partial_cmp(&a).unwrap_or(Ordering::Equal)
    }

    fn passes_threshold(&self, score: f64, threshold: f64) -> bool {
        score >= threshold
    }

    fn confidence(&self, score: f64, threshold: f64) -> f64 {
        if threshold >= 1.0 {
            return if score >= threshold { 1.0 } else { 0.0 };
        }
        ((score - threshold) / (1.0 - threshold)).clamp(0.0, 1.0)
    }

    fn separation(&self, best: f64, second: Option<f64>) -> f64 {
        match second {
            Some(second) => gap_ratio(1.0 - best, 1.0 - second),
            None => f64::INFINITY,
        }
    }

    fn as_distance(&self, score: f64) -> f64 {
        1.0 - score
    }
}

pub fn metric_for(kind: MetricKind) -> Box<dyn ScoringMetric> {
    match kind {
        MetricKind::Euclidean => Box::new(Euclidean),
        MetricKind::Cosine => Box::new(Cosine),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub signature: &'a GestureSignature,
    pub score: f64,
}

#[derive(Debug)]
pub struct CandidateRanker {
    metric: Box<dyn ScoringMetric>,
}

impl CandidateRanker {
    pub fn new(kind: MetricKind) -> Self {
        Self {
            metric: metric_for(kind),
        }
    }

    pub fn metric(&self) -> &dyn ScoringMetric {
        self.metric.as_ref()
    }

    /// Best candidate first. A signature that cannot be scored against this
    /// frame is logged and left out; the rest are still ranked.
    pub fn rank<'a, I>(&self, vector: &Array1<f64>, signatures: I) -> Vec<Candidate<'a>>
    where
        I: IntoIterator<Item = &'a GestureSignature>,
    {
        let mut candidates: Vec<Candidate<'a>> = signatures
            .into_iter()
            .filter_map(|signature| match self.metric.score(vector, &signature.average) {
                Ok(score) => Some(Candidate { signature, score }),
                Err(e) => {
                    error!("Error scoring '{}': {}", signature.name, e);
                    None
                }
            })
            .collect();

        candidates.sort_by(|a, b| self.metric.compare(a.score, b.score));
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::test_support::signature;

    #[test]
    fn test_euclidean_ranks_ascending() {
        let sigs = vec![
            signature("far", vec![1.0, 0.0, 0.0], 0.5),
            signature("near", vec![0.0, 0.9, 0.0], 0.5),
        ];
        let ranker = CandidateRanker::new(MetricKind::Euclidean);
        let ranked = ranker.rank(&Array1::from(vec![0.0, 1.0, 0.0]), &sigs);
        assert_eq!(ranked[0].signature.name, "near");
        assert!((ranked[0].score - 0.1).abs() < 1e-12);
        assert!(ranked[0].score < ranked[1].score);
    }

    #[test]
    fn test_cosine_ranks_descending() {
        let sigs = vec![
            signature("orthogonal", vec![1.0, 0.0], 0.9),
            signature("aligned", vec![0.0, 2.0], 0.9),
        ];
        let ranker = CandidateRanker::new(MetricKind::Cosine);
        let ranked = ranker.rank(&Array1::from(vec![0.0, 1.0]), &sigs);
        assert_eq!(ranked[0].signature.name, "aligned");
        assert!((ranked[0].score - 1.0).abs() < 1e-12);
        assert!(ranked[1].score.abs() < 1e-12);
    }

    #[test]
    fn test_mismatched_signature_is_excluded_not_fatal() {
        let sigs = vec![
            signature("short", vec![0.0, 1.0], 0.5),
            signature("ok", vec![0.0, 1.0, 0.0], 0.5),
        ];
        for kind in [MetricKind::Euclidean, MetricKind::Cosine] {
            let ranked = CandidateRanker::new(kind).rank(&Array1::from(vec![0.0, 1.0, 0.0]), &sigs);
            assert_eq!(ranked.len(), 1);
            assert_eq!(ranked[0].signature.name, "ok");
        }
    }

    #[test]
    fn test_cosine_zero_norm_is_zero() {
        let score = Cosine
            .score(&Array1::from(vec![0.0, 0.0]), &Array1::from(vec![1.0, 0.0]))
            .unwrap();
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_confidence_formulas() {
        assert!((Euclidean.confidence(0.05, 0.3) - (1.0 - 0.05 / 0.3)).abs() < 1e-12);
        assert_eq!(Euclidean.confidence(0.6, 0.3), 0.0);
        assert!((Cosine.confidence(0.95, 0.9) - 0.5).abs() < 1e-9);
        assert_eq!(Cosine.confidence(0.8, 0.9), 0.0);
    }

    #[test]
    fn test_separation_edge_cases() {
        assert!(Euclidean.separation(0.1, None).is_infinite());
        assert!((Euclidean.separation(0.1, Some(0.25)) - 2.5).abs() < 1e-12);
        assert!(Euclidean.separation(0.0, Some(0.2)).is_infinite());
        assert_eq!(Euclidean.separation(0.0, Some(0.0)), 1.0);
        assert!((Cosine.separation(0.9, Some(0.7)) - 3.0).abs() < 1e-9);
    }
}
