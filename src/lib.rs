//! Real-time hand gesture recognition.
//!
//! Keypoint frames from an external landmark extractor are validated,
//! normalized, ranked against trained signatures, filtered for ambiguity
//! and debounced per session before a gesture is reported.
//!
//! Signal flow:
//!   raw frame → FrameValidator → normalize → CandidateRanker
//!             → AmbiguityGate → ConsensusTracker → DetectionResult

pub mod config;
pub mod detection;
pub mod pipeline;
pub mod signature;
pub mod types;

pub use detection::{DetectionResult, GestureDetector};
pub use pipeline::SessionRegistry;
pub use signature::{GestureSignature, SignatureStore};
pub use types::{Config, DetectorConfig, MetricKind};
