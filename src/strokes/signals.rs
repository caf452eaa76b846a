//! Secondary stroke signals used for richer reporting

use std::f64::consts::PI;

use crate::strokes::kinematics::{mean, valid_steps};
use crate::types::{MicrographiaData, StrokeSample, StrokeSpeedData, TremorData};

/// Number of index segments compared for micrographia
pub const MICROGRAPHIA_SEGMENTS: usize = 5;

/// Minimum samples for micrographia detection
const MIN_MICROGRAPHIA_SAMPLES: usize = 10;

/// Minimum samples for tremor detection (one interior point)
const MIN_TREMOR_SAMPLES: usize = 3;

/// Turning angle (radians) above which a sample is flagged
pub const TREMOR_ANGLE_THRESHOLD: f64 = 0.5;

/// Average, extreme speeds and path length.
///
/// `None` with fewer than 2 samples or when no step advances in time.
pub fn analyze_stroke_speed(samples: &[StrokeSample]) -> Option<StrokeSpeedData> {
    if samples.len() < 2 {
        return None;
    }

    let mut total_length = 0.0;
    let mut speeds = Vec::with_capacity(samples.len() - 1);
    for step in valid_steps(samples) {
        total_length += step.distance;
        speeds.push(step.speed());
    }

    if speeds.is_empty() {
        return None;
    }

    Some(StrokeSpeedData {
        average_speed: mean(&speeds),
        max_speed: speeds.iter().copied().fold(f64::MIN, f64::max),
        min_speed: speeds.iter().copied().fold(f64::MAX, f64::min),
        total_length,
    })
}

/// Diagonal of the bounding box of a group of samples
fn extent(samples: &[StrokeSample]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let (mut min_x, mut max_x) = (f64::MAX, f64::MIN);
    let (mut min_y, mut max_y) = (f64::MAX, f64::MIN);
    for s in samples {
        min_x = min_x.min(s.x);
        max_x = max_x.max(s.x);
        min_y = min_y.min(s.y);
        max_y = max_y.max(s.y);
    }
    (max_x - min_x).hypot(max_y - min_y)
}

/// Compare handwriting size at the start and end of a session.
///
/// Samples are split by index into five equal segments of `floor(N / 5)`
/// samples (any remainder is ignored). A first segment with no extent gives
/// the neutral ratio 1.0.
pub fn detect_micrographia(samples: &[StrokeSample]) -> Option<MicrographiaData> {
    if samples.len() < MIN_MICROGRAPHIA_SAMPLES {
        return None;
    }

    let segment_len = samples.len() / MICROGRAPHIA_SEGMENTS;
    let segment_sizes: Vec<f64> = samples
        .chunks_exact(segment_len)
        .take(MICROGRAPHIA_SEGMENTS)
        .map(extent)
        .collect();

    let first = segment_sizes[0];
    let last = segment_sizes[segment_sizes.len() - 1];
    let shrink_ratio = if first > 0.0 { last / first } else { 1.0 };

    Some(MicrographiaData {
        shrink_ratio,
        segment_sizes,
    })
}

/// Absolute angle between two headings, wrapped into [0, π]
fn turning_angle(from: f64, to: f64) -> f64 {
    let delta = (to - from).abs() % (2.0 * PI);
    if delta > PI {
        2.0 * PI - delta
    } else {
        delta
    }
}

/// Measure directional jitter at each interior sample.
///
/// Interior samples adjacent to a pen lift are skipped. `tremor_score` is the
/// mean turning angle (0 when every interior sample was skipped).
pub fn detect_tremor(samples: &[StrokeSample]) -> Option<TremorData> {
    if samples.len() < MIN_TREMOR_SAMPLES {
        return None;
    }

    let mut deviations = Vec::with_capacity(samples.len() - 2);
    let mut high_freq_segments = Vec::new();

    for triple in samples.windows(3) {
        let (prev, curr, next) = (&triple[0], &triple[1], &triple[2]);
        if prev.crosses_boundary(curr) || curr.crosses_boundary(next) {
            continue;
        }

        let incoming = (curr.y - prev.y).atan2(curr.x - prev.x);
        let outgoing = (next.y - curr.y).atan2(next.x - curr.x);
        let delta = turning_angle(incoming, outgoing);

        deviations.push(delta);
        if delta > TREMOR_ANGLE_THRESHOLD {
            high_freq_segments.push(*curr);
        }
    }

    Some(TremorData {
        tremor_score: mean(&deviations),
        high_freq_segments,
    })
}
