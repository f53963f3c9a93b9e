// src/pipeline/session.rs
//
// Session id → independent voting state. The detector and its signatures
// are shared; each session gets its own ConsensusTracker, created on its
// first frame and dropped when the transport reports the session closed.

use super::event_bus::{EventBus, GestureEvent};
use super::metrics::PipelineMetrics;
use crate::detection::{ConsensusTracker, DetectionResult, GestureDetector};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

const DEFAULT_EVENT_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
pub struct SessionContext {
    pub id: String,
    pub tracker: ConsensusTracker,
    pub frames: u64,
    pub detections: u64,
    pub started_at: Instant,
}

impl SessionContext {
    fn new(id: &str, tracker: ConsensusTracker, now: Instant) -> Self {
        Self {
            id: id.to_string(),
            tracker,
            frames: 0,
            detections: 0,
            started_at: now,
        }
    }
}

pub struct SessionRegistry {
    detector: Arc<GestureDetector>,
    sessions: HashMap<String, SessionContext>,
    metrics: PipelineMetrics,
    events: EventBus,
}

impl SessionRegistry {
    pub fn new(detector: Arc<GestureDetector>) -> Self {
        Self::with_metrics(detector, PipelineMetrics::new())
    }

    pub fn with_metrics(detector: Arc<GestureDetector>, metrics: PipelineMetrics) -> Self {
        Self {
            detector,
            sessions: HashMap::new(),
            metrics,
            events: EventBus::new(DEFAULT_EVENT_CAPACITY),
        }
    }

    /// Run one frame for `session_id`, opening the session if needed.
    pub fn process(&mut self, session_id: &str, frame: &[f64], now: Instant) -> DetectionResult {
        let frame_start = Instant::now();

        if !self.sessions.contains_key(session_id) {
            info!("Session opened: {}", session_id);
            self.sessions.insert(
                session_id.to_string(),
                SessionContext::new(session_id, self.detector.new_tracker(), now),
            );
            self.events.publish(GestureEvent::SessionStarted {
                session: session_id.to_string(),
            });
        }

        let detector = Arc::clone(&self.detector);
        let (outcome, timestamp_ms) = match self.sessions.get_mut(session_id) {
            Some(session) => {
                session.frames += 1;
                let outcome = detector.evaluate(&mut session.tracker, frame, now);
                if outcome.is_detection() {
                    session.detections += 1;
                }
                let ts = now.saturating_duration_since(session.started_at).as_secs_f64() * 1000.0;
                (outcome, ts)
            }
            None => return DetectionResult::no_detection(),
        };

        self.metrics.record(&outcome);
        self.metrics.set_timing(
            &self.metrics.frame_time_us,
            frame_start.elapsed().as_micros() as u64,
        );

        let result = outcome.into_result();
        if result.detected {
            info!(
                "Gesture '{}' | session {} | confidence {:.0}% ({}) | separation {:.2}x",
                result.gesture_name,
                session_id,
                result.similarity * 100.0,
                result.state.description(),
                result.separation
            );
            self.events.publish(GestureEvent::GestureDetected {
                session: session_id.to_string(),
                timestamp_ms,
                result: result.clone(),
            });
        }
        result
    }

    /// Drop a session's state. Returns false for unknown ids.
    pub fn end_session(&mut self, session_id: &str) -> bool {
        match self.sessions.remove(session_id) {
            Some(session) => {
                info!(
                    "Session closed: {} ({} frames, {} detections)",
                    session.id, session.frames, session.detections
                );
                self.events.publish(GestureEvent::SessionEnded {
                    session: session.id,
                    frames: session.frames,
                });
                true
            }
            None => {
                debug!("end_session for unknown session {}", session_id);
                false
            }
        }
    }

    pub fn session(&self, session_id: &str) -> Option<&SessionContext> {
        self.sessions.get(session_id)
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    pub fn session_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sessions.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    pub fn drain_events(&mut self) -> Vec<GestureEvent> {
        self.events.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::normalize;
    use crate::detection::test_support::signature;
    use crate::signature::SignatureStore;
    use crate::types::DetectorConfig;
    use std::time::Duration;

    fn registry() -> (SessionRegistry, Vec<f64>) {
        let frame: Vec<f64> = (0..42).map(|i| 0.2 + 0.015 * (i % 5) as f64).collect();
        let avg = normalize(&frame).to_vec();
        let store = Arc::new(SignatureStore::from_signatures(vec![signature("A", avg, 0.3)]).unwrap());
        let detector = Arc::new(GestureDetector::new(store, DetectorConfig::default()).unwrap());
        (SessionRegistry::new(detector), frame)
    }

    #[test]
    fn test_each_session_votes_independently() {
        let (mut registry, frame) = registry();
        let now = Instant::now();

        registry.process("cam-1", &frame, now);
        registry.process("cam-1", &frame, now);
        // cam-2's first frame must not complete cam-1's window
        assert!(!registry.process("cam-2", &frame, now).detected);
        assert!(registry.process("cam-1", &frame, now).detected);
        assert_eq!(registry.active_sessions(), 2);
    }

    #[test]
    fn test_end_session_discards_state() {
        let (mut registry, frame) = registry();
        let now = Instant::now();

        registry.process("cam-1", &frame, now);
        registry.process("cam-1", &frame, now);
        assert!(registry.end_session("cam-1"));
        assert!(!registry.end_session("cam-1"));

        // Fresh session starts counting from zero again
        assert!(!registry.process("cam-1", &frame, now).detected);
        assert_eq!(registry.session("cam-1").unwrap().frames, 1);
    }

    #[test]
    fn test_events_and_metrics() {
        let (mut registry, frame) = registry();
        let start = Instant::now();
        for i in 0..3 {
            registry.process("cam-1", &frame, start + Duration::from_millis(40 * i));
        }
        registry.process("cam-1", &[0.1; 10], start);
        registry.end_session("cam-1");

        let events = registry.drain_events();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], GestureEvent::SessionStarted { .. }));
        match &events[1] {
            GestureEvent::GestureDetected {
                result,
                timestamp_ms,
                ..
            } => {
                assert_eq!(result.gesture_name, "A");
                assert!((timestamp_ms - 80.0).abs() < 1e-6);
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(matches!(events[2], GestureEvent::SessionEnded { frames: 4, .. }));

        let summary = registry.metrics().summary();
        assert_eq!(summary.total_frames, 4);
        assert_eq!(summary.detections, 1);
        assert_eq!(summary.invalid_frames, 1);
    }
}
