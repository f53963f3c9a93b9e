// src/detection/types.rs
use serde::Serialize;

const EXCELLENT_CONFIDENCE: f64 = 0.85;
const GOOD_CONFIDENCE: f64 = 0.75;
const ACCEPTABLE_CONFIDENCE: f64 = 0.65;

/// Qualitative label attached to a confirmed gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureState {
    None,
    Excellent,
    Good,
    Acceptable,
    Low,
}

impl GestureState {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= EXCELLENT_CONFIDENCE {
            GestureState::Excellent
        } else if confidence >= GOOD_CONFIDENCE {
            GestureState::Good
        } else if confidence >= ACCEPTABLE_CONFIDENCE {
            GestureState::Acceptable
        } else {
            GestureState::Low
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            GestureState::None => "no gesture",
            GestureState::Excellent => "very precise recognition",
            GestureState::Good => "reliable recognition",
            GestureState::Acceptable => "fair recognition",
            GestureState::Low => "unreliable recognition",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub detected: bool,
    pub gesture_name: String,
    /// Confidence in [0, 1]
    pub similarity: f64,
    pub threshold: f64,
    pub state: GestureState,
    /// Best vs second-best margin; infinite (serialized as null) without a runner-up
    pub separation: f64,
    pub distance: f64,
    pub is_clear: bool,
}

impl DetectionResult {
    pub fn no_detection() -> Self {
        Self {
            detected: false,
            gesture_name: String::new(),
            similarity: 0.0,
            threshold: 0.0,
            state: GestureState::None,
            separation: 0.0,
            distance: 0.0,
            is_clear: false,
        }
    }

    /// A gesture is "clear" when it is at least reliable and twice as
    /// separated from the runner-up as the gate demands.
    pub fn confirmed(
        gesture_name: &str,
        confidence: f64,
        threshold: f64,
        separation: f64,
        distance: f64,
        min_separation: f64,
    ) -> Self {
        let state = GestureState::from_confidence(confidence);
        Self {
            detected: true,
            gesture_name: gesture_name.to_string(),
            similarity: confidence.clamp(0.0, 1.0),
            threshold,
            state,
            separation,
            distance,
            is_clear: confidence >= GOOD_CONFIDENCE && separation >= 2.0 * min_separation,
        }
    }
}
