// src/pipeline/metrics.rs
//
// Counters for every frame outcome. Cheap to clone and share; totals are
// read through `summary()`.

use crate::detection::{FrameOutcome, FrameRejection, GateRejection};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct PipelineMetrics {
    pub total_frames: Arc<AtomicU64>,
    pub invalid_frames: Arc<AtomicU64>,
    pub no_hand_frames: Arc<AtomicU64>,
    pub above_threshold: Arc<AtomicU64>,
    pub low_confidence: Arc<AtomicU64>,
    pub ambiguous: Arc<AtomicU64>,
    pub no_candidates: Arc<AtomicU64>,
    pub pending_votes: Arc<AtomicU64>,
    pub cooldown_suppressed: Arc<AtomicU64>,
    pub detections: Arc<AtomicU64>,
    pub frame_time_us: Arc<AtomicU64>,
    pub started_at: Instant,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            total_frames: Arc::new(AtomicU64::new(0)),
            invalid_frames: Arc::new(AtomicU64::new(0)),
            no_hand_frames: Arc::new(AtomicU64::new(0)),
            above_threshold: Arc::new(AtomicU64::new(0)),
            low_confidence: Arc::new(AtomicU64::new(0)),
            ambiguous: Arc::new(AtomicU64::new(0)),
            no_candidates: Arc::new(AtomicU64::new(0)),
            pending_votes: Arc::new(AtomicU64::new(0)),
            cooldown_suppressed: Arc::new(AtomicU64::new(0)),
            detections: Arc::new(AtomicU64::new(0)),
            frame_time_us: Arc::new(AtomicU64::new(0)),
            started_at: Instant::now(),
        }
    }

    pub fn inc(&self, counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_timing(&self, counter: &AtomicU64, duration_us: u64) {
        counter.store(duration_us, Ordering::Relaxed);
    }

    pub fn record(&self, outcome: &FrameOutcome) {
        self.inc(&self.total_frames);
        let counter = match outcome {
            FrameOutcome::Invalid(FrameRejection::NoHand) => &self.no_hand_frames,
            FrameOutcome::Invalid(_) => &self.invalid_frames,
            FrameOutcome::Rejected(GateRejection::NoCandidates) => &self.no_candidates,
            FrameOutcome::Rejected(GateRejection::AboveThreshold { .. }) => &self.above_threshold,
            FrameOutcome::Rejected(GateRejection::LowConfidence { .. }) => &self.low_confidence,
            FrameOutcome::Rejected(GateRejection::Ambiguous { .. }) => &self.ambiguous,
            FrameOutcome::Pending { .. } => &self.pending_votes,
            FrameOutcome::Suppressed { .. } => &self.cooldown_suppressed,
            FrameOutcome::Confirmed(_) => &self.detections,
        };
        self.inc(counter);
    }

    pub fn fps(&self) -> f64 {
        let frames = self.total_frames.load(Ordering::Relaxed);
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed > 0.01 {
            frames as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_frames: self.total_frames.load(Ordering::Relaxed),
            fps: self.fps(),
            invalid_frames: self.invalid_frames.load(Ordering::Relaxed),
            no_hand_frames: self.no_hand_frames.load(Ordering::Relaxed),
            above_threshold: self.above_threshold.load(Ordering::Relaxed),
            low_confidence: self.low_confidence.load(Ordering::Relaxed),
            ambiguous: self.ambiguous.load(Ordering::Relaxed),
            no_candidates: self.no_candidates.load(Ordering::Relaxed),
            pending_votes: self.pending_votes.load(Ordering::Relaxed),
            cooldown_suppressed: self.cooldown_suppressed.load(Ordering::Relaxed),
            detections: self.detections.load(Ordering::Relaxed),
            last_frame_us: self.frame_time_us.load(Ordering::Relaxed),
            elapsed_secs: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSummary {
    pub total_frames: u64,
    pub fps: f64,
    pub invalid_frames: u64,
    pub no_hand_frames: u64,
    pub above_threshold: u64,
    pub low_confidence: u64,
    pub ambiguous: u64,
    pub no_candidates: u64,
    pub pending_votes: u64,
    pub cooldown_suppressed: u64,
    pub detections: u64,
    pub last_frame_us: u64,
    pub elapsed_secs: f64,
}

impl MetricsSummary {
    pub fn rejected_frames(&self) -> u64 {
        self.invalid_frames
            + self.no_hand_frames
            + self.above_threshold
            + self.low_confidence
            + self.ambiguous
            + self.no_candidates
    }
}
