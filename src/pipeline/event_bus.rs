// src/pipeline/event_bus.rs
//
// Outbound queue for the transport layer. The registry publishes
// confirmed gestures and session lifecycle changes; the transport drains
// and broadcasts them.

use crate::detection::DetectionResult;
use serde::Serialize;
use std::collections::VecDeque;
use tracing::warn;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GestureEvent {
    SessionStarted {
        session: String,
    },
    GestureDetected {
        session: String,
        timestamp_ms: f64,
        #[serde(flatten)]
        result: DetectionResult,
    },
    SessionEnded {
        session: String,
        frames: u64,
    },
}

pub struct EventBus {
    events: VecDeque<GestureEvent>,
    max_pending: usize,
}

impl EventBus {
    pub fn new(max_pending: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_pending),
            max_pending: max_pending.max(1),
        }
    }

    pub fn publish(&mut self, event: GestureEvent) {
        if self.events.len() >= self.max_pending {
            warn!(
                "Event bus full ({} events), dropping oldest",
                self.max_pending
            );
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn drain(&mut self) -> Vec<GestureEvent> {
        self.events.drain(..).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.events.len()
    }
}
