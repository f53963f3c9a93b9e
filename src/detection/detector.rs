// src/detection/detector.rs
//
// Per-frame entry point:
//   raw frame → validate → normalize → rank → gate → consensus → result
//
// The detector itself is immutable and shared by every session; the only
// mutable state is the caller's ConsensusTracker. Nothing past construction
// returns an error: bad frames resolve to "no detection".

use super::consensus::{ConsensusTracker, Vote};
use super::gate::{Accepted, AmbiguityGate, GateRejection};
use super::normalizer::normalize;
use super::ranker::{Candidate, CandidateRanker};
use super::types::DetectionResult;
use super::validator::{FrameRejection, FrameValidator};
use crate::signature::SignatureStore;
use crate::types::DetectorConfig;
use anyhow::{bail, Result};
use ndarray::Array1;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// What happened to one frame, for callers that need more than the result
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    Invalid(FrameRejection),
    Rejected(GateRejection),
    Pending { leader: String, votes: usize },
    Suppressed { gesture: String },
    Confirmed(DetectionResult),
}

impl FrameOutcome {
    pub fn into_result(self) -> DetectionResult {
        match self {
            FrameOutcome::Confirmed(result) => result,
            _ => DetectionResult::no_detection(),
        }
    }

    pub fn is_detection(&self) -> bool {
        matches!(self, FrameOutcome::Confirmed(_))
    }
}

#[derive(Debug)]
pub struct GestureDetector {
    store: Arc<SignatureStore>,
    /// Indices into `store.all()` of signatures with the configured dimensions
    comparable: Vec<usize>,
    config: DetectorConfig,
    validator: FrameValidator,
    ranker: CandidateRanker,
    gate: AmbiguityGate,
}

impl GestureDetector {
    pub fn new(store: Arc<SignatureStore>, config: DetectorConfig) -> Result<Self> {
        config.validate()?;

        if store.is_empty() {
            bail!("no gestures loaded; check the signature directory");
        }

        let comparable: Vec<usize> = store
            .all()
            .iter()
            .enumerate()
            .filter(|(_, s)| s.dimensions == config.dimensions)
            .map(|(i, _)| i)
            .collect();
        if comparable.is_empty() {
            bail!(
                "none of the {} loaded gestures has dimensions {}",
                store.len(),
                config.dimensions
            );
        }
        for s in store.all().iter().filter(|s| s.dimensions != config.dimensions) {
            warn!(
                "'{}' has dimensions {} (detector expects {}), excluded from ranking",
                s.name, s.dimensions, config.dimensions
            );
        }

        info!(
            "GestureDetector ready ({} gestures loaded, {} comparable)",
            store.len(),
            comparable.len()
        );
        info!(
            "Config: metric={:?}, separation={:.2}x, consensus={}/{}, cooldown={}ms, min_confidence={:.0}%",
            config.metric,
            config.min_separation,
            config.required_votes,
            config.consensus_window,
            config.cooldown_ms,
            config.min_confidence * 100.0
        );
        for s in store.all() {
            info!("'{}': threshold={:.4}", s.name, s.threshold);
        }

        Ok(Self {
            validator: FrameValidator::new(&config),
            ranker: CandidateRanker::new(config.metric),
            gate: AmbiguityGate::new(&config),
            store,
            comparable,
            config,
        })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn store(&self) -> &SignatureStore {
        &self.store
    }

    /// Fresh per-session voting state
    pub fn new_tracker(&self) -> ConsensusTracker {
        ConsensusTracker::from_config(&self.config)
    }

    pub fn process_frame(
        &self,
        tracker: &mut ConsensusTracker,
        frame: &[f64],
        now: Instant,
    ) -> DetectionResult {
        self.evaluate(tracker, frame, now).into_result()
    }

    pub fn evaluate(
        &self,
        tracker: &mut ConsensusTracker,
        frame: &[f64],
        now: Instant,
    ) -> FrameOutcome {
        if let Err(rejection) = self.validator.validate(frame) {
            warn!("Invalid keypoints: {}", rejection);
            tracker.reset();
            return FrameOutcome::Invalid(rejection);
        }

        let vector = normalize(frame);
        let ranked = self.rank(&vector);

        let accepted = match self.gate.evaluate(self.ranker.metric(), &ranked) {
            Ok(accepted) => accepted,
            Err(rejection) => {
                debug!("Frame rejected: {}", rejection);
                tracker.reset();
                return FrameOutcome::Rejected(rejection);
            }
        };

        match tracker.record(&accepted.candidate.signature.name, now) {
            Vote::Pending { leader, votes } => FrameOutcome::Pending { leader, votes },
            Vote::Suppressed { gesture, .. } => FrameOutcome::Suppressed { gesture },
            Vote::Confirmed { gesture, .. } => {
                FrameOutcome::Confirmed(self.build_result(&gesture, &accepted, &ranked))
            }
        }
    }

    fn rank(&self, vector: &Array1<f64>) -> Vec<Candidate<'_>> {
        let all = self.store.all();
        self.ranker
            .rank(vector, self.comparable.iter().map(|&i| &all[i]))
    }

    /// The window winner is usually this frame's best candidate. When it is
    /// not, report the winner's own score from this frame's ranking.
    fn build_result(
        &self,
        gesture: &str,
        accepted: &Accepted<'_>,
        ranked: &[Candidate<'_>],
    ) -> DetectionResult {
        let metric = self.ranker.metric();
        let min_separation = self.gate.min_separation();

        if accepted.candidate.signature.name == gesture {
            return DetectionResult::confirmed(
                gesture,
                accepted.confidence,
                accepted.candidate.signature.threshold,
                accepted.separation,
                metric.as_distance(accepted.candidate.score),
                min_separation,
            );
        }

        match ranked.iter().find(|c| c.signature.name == gesture) {
            Some(c) => DetectionResult::confirmed(
                gesture,
                metric.confidence(c.score, c.signature.threshold),
                c.signature.threshold,
                accepted.separation,
                metric.as_distance(c.score),
                min_separation,
            ),
            None => {
                let threshold = self
                    .store
                    .by_name(gesture)
                    .map(|s| s.threshold)
                    .unwrap_or(0.0);
                DetectionResult::confirmed(
                    gesture,
                    accepted.confidence,
                    threshold,
                    accepted.separation,
                    metric.as_distance(accepted.candidate.score),
                    min_separation,
                )
            }
        }
    }
}
