// src/detection/mod.rs

mod consensus;
mod detector;
mod gate;
mod normalizer;
mod ranker;
mod types;
mod validator;

// Re-export public APIs
pub use consensus::{ConsensusState, ConsensusTracker, Vote};
pub use detector::{FrameOutcome, GestureDetector};
pub use gate::{Accepted, AmbiguityGate, GateRejection};
pub use normalizer::normalize;
pub use ranker::{
    metric_for, Candidate, CandidateRanker, Cosine, Euclidean, ScoreError, ScoringMetric,
};
pub use types::*;
pub use validator::{FrameRejection, FrameValidator};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::signature::{GestureCategory, GestureSignature, TrainingMetadata};
    use ndarray::Array1;

    pub(crate) fn signature(name: &str, average: Vec<f64>, threshold: f64) -> GestureSignature {
        GestureSignature {
            name: name.to_string(),
            category: GestureCategory::default(),
            hands: 1,
            dimensions: average.len(),
            total_frames: 0,
            displacements: 0,
            sigma: 0.0,
            k: 0.0,
            threshold,
            threshold_percent: threshold * 100.0,
            average: Array1::from(average),
            description: String::new(),
            version: "test".to_string(),
            metadata: TrainingMetadata::default(),
        }
    }
}
