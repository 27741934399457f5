//! Circular statistics on bearings in degrees.
//!
//! Bearings live on the circle, so averages are taken over unit vectors
//! rather than over the raw numbers: the arithmetic mean of 350° and 10°
//! is 180°, while the bearing both observations point to is 0°.

use crate::constants::MIN_RESULTANT_LENGTH;

/// Wrap any angle into [0, 360)
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid rounds tiny negatives up to exactly 360.0
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Turn a "coming from" direction into the bearing it points to
pub fn reverse_direction(direction: f64) -> f64 {
    normalize_degrees(direction + 180.0)
}

/// Smallest absolute separation between two bearings, in [0, 180]
pub fn angular_difference(a: f64, b: f64) -> f64 {
    let diff = normalize_degrees(a - b);
    if diff > 180.0 { 360.0 - diff } else { diff }
}

/// Descriptive circular statistics of a bearing sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircularSummary {
    /// Number of finite values that contributed
    pub count: usize,
    /// Circular mean in [0, 360)
    pub mean: f64,
    /// Mean resultant length in [0, 1]; 1 means all values coincide
    pub resultant_length: f64,
    /// Circular standard deviation in degrees
    pub circular_std: f64,
}

/// Summarize a sample of bearings.
///
/// Non-finite values are ignored. Returns `None` when no finite value is
/// present or when the resultant vector vanishes (e.g. {0°, 180°}), since
/// the mean direction is undefined in both cases.
pub fn summarize<I>(values: I) -> Option<CircularSummary>
where
    I: IntoIterator<Item = f64>,
{
    let mut sum_sin = 0.0_f64;
    let mut sum_cos = 0.0_f64;
    let mut count = 0usize;

    for value in values.into_iter().filter(|v| v.is_finite()) {
        let radians = value.to_radians();
        sum_sin += radians.sin();
        sum_cos += radians.cos();
        count += 1;
    }

    if count == 0 {
        return None;
    }

    let mean_sin = sum_sin / count as f64;
    let mean_cos = sum_cos / count as f64;
    let resultant_length = mean_sin.hypot(mean_cos).min(1.0);
    if resultant_length < MIN_RESULTANT_LENGTH {
        return None;
    }

    let mut mean = normalize_degrees(mean_sin.atan2(mean_cos).to_degrees());
    // Snap round-off just below the wrap back onto 0°
    if 360.0 - mean < 1e-9 {
        mean = 0.0;
    }

    let circular_std = (-2.0 * resultant_length.ln()).max(0.0).sqrt().to_degrees();

    Some(CircularSummary {
        count,
        mean,
        resultant_length,
        circular_std,
    })
}

/// Circular mean of a sample of bearings, `None` when there is no data
pub fn circular_mean(values: &[f64]) -> Option<f64> {
    summarize(values.iter().copied()).map(|summary| summary.mean)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_angle_eq(actual: f64, expected: f64) {
        assert!(
            angular_difference(actual, expected) < EPS,
            "expected {expected}°, got {actual}°"
        );
    }

    #[test]
    fn test_mean_across_wrap_is_north() {
        let mean = circular_mean(&[350.0, 10.0]).unwrap();
        assert_angle_eq(mean, 0.0);
        assert!((0.0..360.0).contains(&mean));
        // The arithmetic mean would point the opposite way
        assert!(angular_difference(mean, 180.0) > 179.0);
    }

    #[test]
    fn test_rotation_equivariance() {
        let samples: [&[f64]; 4] = [
            &[10.0, 20.0, 30.0],
            &[350.0, 5.0, 15.0, 340.0],
            &[90.0, 91.5, 88.0],
            &[200.0, 260.0, 230.0, 245.0, 199.0],
        ];
        let rotations = [0.0, 17.0, 90.0, 179.5, 270.0, 359.0, -45.0];

        for sample in samples {
            let base = circular_mean(sample).unwrap();
            for rotation in rotations {
                let rotated: Vec<f64> = sample
                    .iter()
                    .map(|v| normalize_degrees(v + rotation))
                    .collect();
                let mean = circular_mean(&rotated).unwrap();
                assert_angle_eq(mean, normalize_degrees(base + rotation));
            }
        }
    }

    #[test]
    fn test_single_observation_returns_itself() {
        assert_angle_eq(circular_mean(&[123.4]).unwrap(), 123.4);
        assert_angle_eq(circular_mean(&[0.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_empty_input_has_no_mean() {
        assert_eq!(circular_mean(&[]), None);
        assert_eq!(circular_mean(&[f64::NAN, f64::INFINITY]), None);
    }

    #[test]
    fn test_opposite_bearings_have_no_mean() {
        assert_eq!(circular_mean(&[0.0, 180.0]), None);
        assert_eq!(circular_mean(&[45.0, 135.0, 225.0, 315.0]), None);
    }

    #[test]
    fn test_non_finite_values_are_ignored() {
        let summary = summarize([f64::NAN, 30.0, 50.0]).unwrap();
        assert_eq!(summary.count, 2);
        assert_angle_eq(summary.mean, 40.0);
    }

    #[test]
    fn test_summary_spread() {
        let tight = summarize([100.0, 100.0, 100.0]).unwrap();
        assert!((tight.resultant_length - 1.0).abs() < EPS);
        assert!(tight.circular_std < 1e-3);

        let wide = summarize([60.0, 120.0]).unwrap();
        assert!(wide.resultant_length < tight.resultant_length);
        assert!(wide.circular_std > 10.0);
    }

    #[test]
    fn test_reverse_direction_boundaries() {
        assert_eq!(reverse_direction(0.0), 180.0);
        assert_eq!(reverse_direction(179.0), 359.0);
        assert_eq!(reverse_direction(180.0), 0.0);
        assert_eq!(reverse_direction(359.0), 179.0);
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(725.0), 5.0);
        assert!(normalize_degrees(-1e-20) < 360.0);
    }

    #[test]
    fn test_angular_difference() {
        assert_eq!(angular_difference(350.0, 10.0), 20.0);
        assert_eq!(angular_difference(10.0, 350.0), 20.0);
        assert_eq!(angular_difference(0.0, 180.0), 180.0);
    }
}
