// src/signature/model.rs
//
// Trained gesture signatures. The on-disk record is parsed into
// `SignatureRecord` first and only becomes a `GestureSignature` once its
// invariants hold, so every signature the detector sees is usable.

use anyhow::{bail, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Motion {
    Static,
    Dynamic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Handedness {
    OneHanded,
    TwoHanded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GestureCategory {
    Known { motion: Motion, hands: Handedness },
    Other(String),
}

impl GestureCategory {
    /// Accepts labels such as "static-one-handed", "dinamico bimanual" or
    /// the training script's "unimanual".
    pub fn parse(label: &str) -> Self {
        let lower = label.trim().to_lowercase();
        if lower.is_empty() {
            return Self::default();
        }

        let tokens: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();
        let has = |prefixes: &[&str]| {
            tokens
                .iter()
                .any(|t| prefixes.iter().any(|p| t.starts_with(p)))
        };
        let is = |words: &[&str]| tokens.iter().any(|t| words.contains(t));

        let motion = if has(&["dynamic", "dinamic", "dinámic"]) {
            Some(Motion::Dynamic)
        } else if has(&["static", "estatic", "estátic"]) {
            Some(Motion::Static)
        } else {
            None
        };

        let hands = if is(&["two", "both", "bimanual"]) {
            Some(Handedness::TwoHanded)
        } else if is(&["one", "single", "unimanual", "monomanual"]) {
            Some(Handedness::OneHanded)
        } else {
            None
        };

        match (motion, hands) {
            (None, None) => GestureCategory::Other(label.trim().to_string()),
            (motion, hands) => GestureCategory::Known {
                motion: motion.unwrap_or(Motion::Static),
                hands: hands.unwrap_or(Handedness::OneHanded),
            },
        }
    }
}

impl Default for GestureCategory {
    fn default() -> Self {
        GestureCategory::Known {
            motion: Motion::Static,
            hands: Handedness::OneHanded,
        }
    }
}

impl fmt::Display for GestureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GestureCategory::Known { motion, hands } => {
                let motion = match motion {
                    Motion::Static => "static",
                    Motion::Dynamic => "dynamic",
                };
                let hands = match hands {
                    Handedness::OneHanded => "one-handed",
                    Handedness::TwoHanded => "two-handed",
                };
                write!(f, "{}/{}", motion, hands)
            }
            GestureCategory::Other(label) => write!(f, "{}", label),
        }
    }
}

/// Provenance of the training run that produced a signature
#[derive(Debug, Clone, Default)]
pub struct TrainingMetadata {
    pub training_date: Option<NaiveDateTime>,
    pub detection_rate: f64,
    pub interpolated_frames: u32,
    pub signature_norm: f64,
}

#[derive(Debug, Clone)]
pub struct GestureSignature {
    pub name: String,
    pub category: GestureCategory,
    pub hands: u32,
    pub dimensions: usize,
    pub total_frames: u32,
    pub displacements: u32,
    /// Calibration scalars carried from training; the detector only reads `threshold`
    pub sigma: f64,
    pub k: f64,
    pub threshold: f64,
    pub threshold_percent: f64,
    pub average: Array1<f64>,
    pub description: String,
    pub version: String,
    pub metadata: TrainingMetadata,
}

/// Raw JSON layout of a signature file. Accepts both the English keys and
/// the keys written by the training pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct SignatureRecord {
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(default, alias = "tipo")]
    pub category: String,
    #[serde(default, alias = "manos")]
    pub hands: Option<u32>,
    #[serde(alias = "dimensiones")]
    pub dimensions: usize,
    #[serde(default, alias = "frames_totales")]
    pub total_frames: u32,
    #[serde(default, alias = "desplazamientos")]
    pub displacements: u32,
    #[serde(default)]
    pub sigma: f64,
    #[serde(default)]
    pub k: f64,
    #[serde(alias = "umbral")]
    pub threshold: f64,
    #[serde(default, alias = "umbral_porcentaje")]
    pub threshold_percent: Option<f64>,
    #[serde(alias = "firma_promedio")]
    pub average_signature: Vec<f64>,
    #[serde(default, alias = "descripcion")]
    pub description: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub metadata: MetadataRecord,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetadataRecord {
    #[serde(default, alias = "fecha_entrenamiento")]
    pub training_date: Option<String>,
    #[serde(default, alias = "tasa_deteccion")]
    pub detection_rate: f64,
    #[serde(default, alias = "frames_interpolados")]
    pub interpolated_frames: u32,
    #[serde(default, alias = "norma_firma")]
    pub signature_norm: Option<f64>,
}

impl TryFrom<SignatureRecord> for GestureSignature {
    type Error = anyhow::Error;

    fn try_from(record: SignatureRecord) -> Result<Self> {
        let name = record.name.trim().to_string();
        if name.is_empty() {
            bail!("signature has an empty name");
        }
        if record.average_signature.len() != record.dimensions {
            bail!(
                "'{}': average signature has {} values, declared dimensions {}",
                name,
                record.average_signature.len(),
                record.dimensions
            );
        }
        if record.dimensions == 0 {
            bail!("'{}': zero-dimensional signature", name);
        }
        if !record.threshold.is_finite() || record.threshold <= 0.0 {
            bail!("'{}': threshold must be > 0, got {}", name, record.threshold);
        }
        if record.average_signature.iter().any(|v| !v.is_finite()) {
            bail!("'{}': average signature contains non-finite values", name);
        }

        let category = GestureCategory::parse(&record.category);
        let hands = record.hands.unwrap_or(match category {
            GestureCategory::Known {
                hands: Handedness::TwoHanded,
                ..
            } => 2,
            _ => 1,
        });

        let average = Array1::from(record.average_signature);
        let signature_norm = record
            .metadata
            .signature_norm
            .unwrap_or_else(|| average.dot(&average).sqrt());

        Ok(GestureSignature {
            name,
            category,
            hands,
            dimensions: record.dimensions,
            total_frames: record.total_frames,
            displacements: record.displacements,
            sigma: record.sigma,
            k: record.k,
            threshold: record.threshold,
            threshold_percent: record
                .threshold_percent
                .unwrap_or(record.threshold * 100.0),
            average,
            description: record.description,
            version: record.version,
            metadata: TrainingMetadata {
                training_date: record
                    .metadata
                    .training_date
                    .as_deref()
                    .and_then(parse_training_date),
                detection_rate: record.metadata.detection_rate,
                interpolated_frames: record.metadata.interpolated_frames,
                signature_norm,
            },
        })
    }
}

fn parse_training_date(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_json(len: usize, dims: usize, threshold: f64) -> String {
        let values: Vec<String> = (0..len).map(|i| format!("{:.3}", i as f64 * 0.01)).collect();
        format!(
            r#"{{"nombre": "hola", "tipo": "estatico unimanual", "dimensiones": {},
                "umbral": {}, "firma_promedio": [{}],
                "metadata": {{"fecha_entrenamiento": "2024-11-02T10:15:30.123456", "tasa_deteccion": 0.92}}}}"#,
            dims,
            threshold,
            values.join(",")
        )
    }

    #[test]
    fn test_training_keys_are_accepted() {
        let record: SignatureRecord = serde_json::from_str(&record_json(4, 4, 0.3)).unwrap();
        let sig = GestureSignature::try_from(record).unwrap();
        assert_eq!(sig.name, "hola");
        assert_eq!(sig.dimensions, 4);
        assert_eq!(sig.hands, 1);
        assert_eq!(
            sig.category,
            GestureCategory::Known {
                motion: Motion::Static,
                hands: Handedness::OneHanded
            }
        );
        assert!(sig.metadata.training_date.is_some());
        assert!((sig.metadata.detection_rate - 0.92).abs() < 1e-12);
        assert!((sig.threshold_percent - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let record: SignatureRecord = serde_json::from_str(&record_json(3, 4, 0.3)).unwrap();
        assert!(GestureSignature::try_from(record).is_err());
    }

    #[test]
    fn test_non_positive_threshold_rejected() {
        let record: SignatureRecord = serde_json::from_str(&record_json(4, 4, 0.0)).unwrap();
        assert!(GestureSignature::try_from(record).is_err());
    }

    #[test]
    fn test_norm_computed_when_missing() {
        let json = r#"{"name": "v", "dimensions": 2, "threshold": 0.5,
                       "average_signature": [3.0, 4.0]}"#;
        let record: SignatureRecord = serde_json::from_str(json).unwrap();
        let sig = GestureSignature::try_from(record).unwrap();
        assert!((sig.metadata.signature_norm - 5.0).abs() < 1e-12);
        assert_eq!(sig.category, GestureCategory::default());
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!(
            GestureCategory::parse("dynamic two-handed"),
            GestureCategory::Known {
                motion: Motion::Dynamic,
                hands: Handedness::TwoHanded
            }
        );
        assert_eq!(
            GestureCategory::parse("fingerspelling"),
            GestureCategory::Other("fingerspelling".to_string())
        );
        assert_eq!(GestureCategory::parse("bimanual").to_string(), "static/two-handed");
        assert_eq!(
            GestureCategory::parse("static one-handed"),
            GestureCategory::default()
        );
        for label in ["none", "phone", "twofold"] {
            assert_eq!(
                GestureCategory::parse(label),
                GestureCategory::Other(label.to_string())
            );
        }
    }
}
