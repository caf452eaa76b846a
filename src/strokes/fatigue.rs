//! Fatigue detection
//!
//! Compares mean writing speed in the early and late halves of a session; a
//! large enough slowdown is taken as a proxy for motor fatigue.

use crate::strokes::kinematics::{instantaneous_speeds, mean};
use crate::types::{FatigueInfo, StrokeSample};

/// Default speed drop (percent) above which fatigue is reported
pub const DEFAULT_FATIGUE_THRESHOLD_PCT: f64 = 20.0;

/// Minimum samples before fatigue is assessed
const MIN_SAMPLES: usize = 5;

/// Minimum valid instantaneous speeds before fatigue is assessed
const MIN_SPEEDS: usize = 5;

/// Early-half mean speed (px/s) below which deceleration is not meaningful
const MIN_EARLY_SPEED: f64 = 10.0;

fn not_detected(reason: &str) -> FatigueInfo {
    FatigueInfo {
        detected: false,
        reason: reason.to_string(),
        drop_percent: None,
    }
}

/// Detect a slowdown between the first and second half of a session.
///
/// The speed sequence is split at `floor(N / 2)`; the late half receives the
/// extra element when N is odd.
pub fn detect_fatigue(samples: &[StrokeSample], threshold_percent: f64) -> FatigueInfo {
    if samples.len() < MIN_SAMPLES {
        return not_detected("Not enough data to detect fatigue.");
    }

    let speeds = instantaneous_speeds(samples);
    if speeds.len() < MIN_SPEEDS {
        return not_detected("Not enough movement to assess fatigue.");
    }

    let (early, late) = speeds.split_at(speeds.len() / 2);
    let early_mean = mean(early);
    let late_mean = mean(late);

    if early_mean < MIN_EARLY_SPEED {
        return not_detected("Movement too slow to reliably assess fatigue.");
    }

    let drop_percent = (early_mean - late_mean) / early_mean * 100.0;
    let detected = drop_percent > threshold_percent;
    log::debug!(
        "fatigue check: early={early_mean:.1} px/s late={late_mean:.1} px/s drop={drop_percent:.2}%"
    );

    FatigueInfo {
        detected,
        reason: format!(
            "Speed dropped by {:.2}% (Threshold: {}%)",
            drop_percent, threshold_percent
        ),
        drop_percent: Some(drop_percent),
    }
}
