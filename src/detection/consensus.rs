// src/detection/consensus.rs
//
// Per-session temporal voting. A gesture is only confirmed after it wins
// `required_votes` of the last `window` accepted frames, and the same
// gesture cannot re-fire until its cooldown has elapsed. Any rejected frame
// wipes the window.
//
// One tracker per session.

use crate::types::DetectorConfig;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsensusState {
    Idle,
    Accumulating,
    Confirmed,
    Cooldown,
}

/// Outcome of feeding one accepted candidate into the tracker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Vote {
    /// Not enough agreement yet
    Pending { leader: String, votes: usize },
    /// Emit a detection for this gesture
    Confirmed { gesture: String, votes: usize },
    /// Enough votes, but the same gesture fired too recently
    Suppressed { gesture: String, remaining: Duration },
}

#[derive(Debug, Clone)]
pub struct ConsensusTracker {
    window: VecDeque<String>,
    capacity: usize,
    required_votes: usize,
    cooldown: Duration,
    state: ConsensusState,
    last_confirmed: Option<String>,
    last_confirmed_at: Option<Instant>,
}

impl ConsensusTracker {
    pub fn new(window: usize, required_votes: usize, cooldown: Duration) -> Self {
        let capacity = window.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
            required_votes: required_votes.clamp(1, capacity),
            cooldown,
            state: ConsensusState::Idle,
            last_confirmed: None,
            last_confirmed_at: None,
        }
    }

    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::new(
            config.consensus_window,
            config.required_votes,
            Duration::from_millis(config.cooldown_ms),
        )
    }

    pub fn record(&mut self, gesture: &str, now: Instant) -> Vote {
        self.window.push_back(gesture.to_string());
        if self.window.len() > self.capacity {
            self.window.pop_front();
        }

        let (leader, votes) = match self.mode() {
            Some(winner) => winner,
            None => {
                self.state = ConsensusState::Idle;
                return Vote::Pending {
                    leader: gesture.to_string(),
                    votes: 0,
                };
            }
        };

        if votes < self.required_votes {
            self.state = ConsensusState::Accumulating;
            return Vote::Pending { leader, votes };
        }

        if let Some(remaining) = self.cooldown_remaining(&leader, now) {
            debug!(
                "'{}' in cooldown ({}ms left), suppressed",
                leader,
                remaining.as_millis()
            );
            self.state = ConsensusState::Cooldown;
            return Vote::Suppressed {
                gesture: leader,
                remaining,
            };
        }

        debug!("Gesture '{}' confirmed ({}/{} votes)", leader, votes, self.capacity);
        self.window.clear();
        self.last_confirmed = Some(leader.clone());
        self.last_confirmed_at = Some(now);
        self.state = ConsensusState::Confirmed;
        Vote::Confirmed {
            gesture: leader,
            votes,
        }
    }

    /// Drop every pending vote. Last confirmation (and its cooldown) survives.
    pub fn reset(&mut self) {
        if !self.window.is_empty() {
            debug!("Consensus reset ({} pending votes dropped)", self.window.len());
        }
        self.window.clear();
        self.state = ConsensusState::Idle;
    }

    /// Time left before `gesture` may confirm again, if it is cooling down
    pub fn cooldown_remaining(&self, gesture: &str, now: Instant) -> Option<Duration> {
        match (&self.last_confirmed, self.last_confirmed_at) {
            (Some(last), Some(at)) if last == gesture => {
                let elapsed = now.saturating_duration_since(at);
                if elapsed < self.cooldown {
                    Some(self.cooldown - elapsed)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    pub fn state(&self) -> ConsensusState {
        self.state
    }

    pub fn votes(&self) -> impl Iterator<Item = &str> {
        self.window.iter().map(|s| s.as_str())
    }

    pub fn last_confirmed(&self) -> Option<&str> {
        self.last_confirmed.as_deref()
    }

    /// Most frequent name in the window; ties go to the name that entered
    /// the window first
    fn mode(&self) -> Option<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for name in &self.window {
            *counts.entry(name.as_str()).or_insert(0) += 1;
        }

        let max = counts.values().copied().max()?;
        self.window
            .iter()
            .find(|name| counts.get(name.as_str()) == Some(&max))
            .map(|name| (name.clone(), max))
    }
}
