// src/detection/normalizer.rs
//
// Position/scale invariance. Center first, then scale to unit length:
// signatures were trained with exactly this order, so changing it breaks
// every distance comparison.

use ndarray::Array1;

const MIN_NORM: f64 = 1e-6;

pub fn normalize(frame: &[f64]) -> Array1<f64> {
    let raw = Array1::from(frame.to_vec());
    if raw.is_empty() {
        return raw;
    }

    let mean = raw.sum() / raw.len() as f64;
    let centered = raw.mapv(|v| v - mean);

    let norm = centered.dot(&centered).sqrt();
    if norm < MIN_NORM {
        return centered;
    }

    centered / norm
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_is_centered_unit_vector() {
        let v = normalize(&[1.0, 2.0, 3.0, 6.0]);
        assert!(v.sum().abs() < 1e-12);
        assert!((v.dot(&v).sqrt() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_translation_and_scale_invariant() {
        let base = [0.2, 0.4, 0.5, 0.1, 0.9, 0.3];
        let moved: Vec<f64> = base.iter().map(|v| v * 3.5 + 0.25).collect();
        let a = normalize(&base);
        let b = normalize(&moved);
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn test_constant_frame_stays_centered_unscaled() {
        let v = normalize(&[0.5; 8]);
        assert!(v.iter().all(|x| x.abs() < 1e-12));
    }
}
