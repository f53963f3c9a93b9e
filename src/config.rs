use crate::types::{Config, DetectorConfig};
use anyhow::{bail, Context, Result};
use std::fs;

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("reading config {}", path))?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing config {}", path))?;
        config.detector.validate()?;
        Ok(config)
    }
}

impl DetectorConfig {
    /// Reject parameter combinations under which no gesture could ever confirm
    pub fn validate(&self) -> Result<()> {
        if self.coordinate_arity == 0 {
            bail!("coordinate_arity must be at least 1");
        }
        if self.dimensions == 0 || self.dimensions % self.coordinate_arity != 0 {
            bail!(
                "dimensions {} is not a multiple of coordinate_arity {}",
                self.dimensions,
                self.coordinate_arity
            );
        }
        if self.consensus_window == 0 {
            bail!("consensus_window must be at least 1");
        }
        if self.required_votes == 0 || self.required_votes > self.consensus_window {
            bail!(
                "required_votes {} must be in 1..={}",
                self.required_votes,
                self.consensus_window
            );
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            bail!("min_confidence {} outside [0, 1]", self.min_confidence);
        }
        if !self.min_separation.is_finite() || self.min_separation < 0.0 {
            bail!("min_separation {} must be finite and >= 0", self.min_separation);
        }
        if self.zero_epsilon.is_nan() || self.zero_epsilon < 0.0 {
            bail!("zero_epsilon must be >= 0");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MetricKind;

    #[test]
    fn test_default_detector_config_is_valid() {
        assert!(DetectorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_votes_above_window_rejected() {
        let config = DetectorConfig {
            consensus_window: 3,
            required_votes: 4,
            ..DetectorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_dimensions_must_match_arity() {
        let config = DetectorConfig {
            dimensions: 64,
            coordinate_arity: 3,
            ..DetectorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_with_partial_detector_section() {
        let yaml = r#"
signatures:
  dir: gestures
detector:
  dimensions: 63
  coordinate_arity: 3
  metric: cosine
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.detector.dimensions, 63);
        assert_eq!(config.detector.metric, MetricKind::Cosine);
        assert_eq!(config.detector.required_votes, 3);
        assert_eq!(config.logging.level, "info");
        assert!(config.detector.validate().is_ok());
    }
}
