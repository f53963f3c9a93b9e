use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub signatures: SignatureConfig,
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub replay: ReplayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureConfig {
    /// Directory holding one `*.json` file per gesture
    pub dir: String,
}

/// Which scoring strategy ranks candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Euclidean,
    Cosine,
}

impl Default for MetricKind {
    fn default() -> Self {
        MetricKind::Euclidean
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Accepted frame length (42 = 21×2, 63 = 21×3, 126 = 2×21×3)
    pub dimensions: usize,
    /// Values per landmark: 2 for (x, y), 3 for (x, y, z)
    pub coordinate_arity: usize,
    pub metric: MetricKind,
    pub min_confidence: f64,
    pub min_separation: f64,
    pub consensus_window: usize,
    pub required_votes: usize,
    pub cooldown_ms: u64,
    /// Below this magnitude on every component the frame means "no hand"
    pub zero_epsilon: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            dimensions: 42,
            coordinate_arity: 2,
            metric: MetricKind::Euclidean,
            min_confidence: 0.70,
            min_separation: 1.8,
            consensus_window: 5,
            required_votes: 3,
            cooldown_ms: 1500,
            zero_epsilon: 0.001,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// JSON-lines frame file; stdin when empty
    pub input: String,
    /// Print every frame's result, not only confirmations
    pub emit_all: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            input: String::new(),
            emit_all: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
