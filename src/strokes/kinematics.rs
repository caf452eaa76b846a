//! Kinematic metrics
//!
//! Speed, pressure and directional stability derived from consecutive pen
//! samples. A consecutive pair contributes only when time advances between
//! the two samples and the pair does not straddle a pen lift.

use crate::types::{Metrics, StrokeSample};

/// Ceiling of the stability score
pub const MAX_STABILITY: f64 = 10.0;

/// Keeps the stability score finite for perfectly straight paths
const STABILITY_EPSILON: f64 = 1e-5;

/// Minimum samples for a meaningful angle variance
const MIN_STABILITY_SAMPLES: usize = 3;

/// Displacement between two consecutive samples with positive elapsed time
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Step {
    pub distance: f64,
    pub dt_ms: f64,
}

impl Step {
    /// Speed in pixels per second
    pub fn speed(&self) -> f64 {
        self.distance / (self.dt_ms / 1000.0)
    }
}

/// Consecutive pairs that count toward speed computations
pub(crate) fn valid_steps(samples: &[StrokeSample]) -> impl Iterator<Item = Step> + '_ {
    samples.windows(2).filter_map(|pair| {
        let (prev, curr) = (&pair[0], &pair[1]);
        // Deltas too large to represent are skipped like non-positive ones
        let dt = match curr.timestamp.checked_sub(prev.timestamp) {
            Some(dt) if dt > 0 => dt,
            _ => return None,
        };
        if prev.crosses_boundary(curr) {
            return None;
        }
        Some(Step {
            distance: (curr.x - prev.x).hypot(curr.y - prev.y),
            dt_ms: dt as f64,
        })
    })
}

/// Instantaneous speeds (px/s) between consecutive samples
pub fn instantaneous_speeds(samples: &[StrokeSample]) -> Vec<f64> {
    valid_steps(samples).map(|step| step.speed()).collect()
}

/// Arithmetic mean, 0 for an empty slice
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance (divides by N), 0 for an empty slice
pub(crate) fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

/// Population variance of instantaneous speeds; 0 with fewer than 2 speeds
pub fn speed_variance(samples: &[StrokeSample]) -> f64 {
    let speeds = instantaneous_speeds(samples);
    if speeds.len() < 2 {
        return 0.0;
    }
    population_variance(&speeds)
}

/// Smoothness score in [0, 10]: inverse of the variance of heading angles.
///
/// Fewer than 3 samples score 0. The score is rounded to two decimals and
/// clamped at [`MAX_STABILITY`], so a perfectly straight path scores exactly 10.
pub fn stroke_stability(samples: &[StrokeSample]) -> f64 {
    if samples.len() < MIN_STABILITY_SAMPLES {
        return 0.0;
    }

    let angles: Vec<f64> = samples
        .windows(2)
        .filter(|pair| !pair[0].crosses_boundary(&pair[1]))
        .map(|pair| (pair[1].y - pair[0].y).atan2(pair[1].x - pair[0].x))
        .collect();
    if angles.is_empty() {
        return 0.0;
    }

    let stability = 1.0 / (population_variance(&angles) + STABILITY_EPSILON);
    ((stability * 100.0).round() / 100.0).min(MAX_STABILITY)
}

/// Compute the basic session metrics.
///
/// `avg_speed` is total path length over total elapsed time across valid
/// steps, not the mean of instantaneous speeds. The optional signal fields
/// are left empty; see [`crate::strokes::analyze_session`].
pub fn compute_metrics(samples: &[StrokeSample]) -> Metrics {
    let total_strokes = samples.len();

    if samples.len() < 2 {
        return Metrics {
            avg_pressure: samples.first().map(|s| s.pressure).unwrap_or(0.0),
            total_strokes,
            ..Metrics::default()
        };
    }

    let (total_distance, total_time_ms) = valid_steps(samples)
        .fold((0.0, 0.0), |(d, t), step| (d + step.distance, t + step.dt_ms));

    let avg_speed = if total_time_ms > 0.0 {
        total_distance / (total_time_ms / 1000.0)
    } else {
        0.0
    };
    let avg_pressure = samples.iter().map(|s| s.pressure).sum::<f64>() / total_strokes as f64;

    Metrics {
        avg_speed,
        avg_pressure,
        speed_variance: speed_variance(samples),
        total_strokes,
        stroke_stability: stroke_stability(samples),
        ..Metrics::default()
    }
}
