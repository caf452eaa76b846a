//! Stroke analysis orchestration
//!
//! Reduces a recorded session to its metrics, the optional richer signals and
//! the fatigue verdict.

use crate::error::ComputeError;
use crate::strokes::adapter::parse_samples;
use crate::strokes::fatigue::detect_fatigue;
use crate::strokes::kinematics::compute_metrics;
use crate::strokes::signals::{analyze_stroke_speed, detect_micrographia, detect_tremor};
use crate::types::{SessionAnalysis, StrokeSample};

/// Analyze one recorded session.
///
/// # Arguments
/// * `samples` - Pen samples in capture order
/// * `threshold_percent` - Speed drop above which fatigue is reported
pub fn analyze_session(samples: &[StrokeSample], threshold_percent: f64) -> SessionAnalysis {
    // Stage 1: Basic kinematics
    let mut metrics = compute_metrics(samples);

    // Stage 2: Optional signals
    metrics.stroke_speed_data = analyze_stroke_speed(samples);
    metrics.micrographia_data = detect_micrographia(samples);
    metrics.tremor_data = detect_tremor(samples);

    // Stage 3: Fatigue
    let fatigue = detect_fatigue(samples, threshold_percent);

    log::debug!(
        "analyzed {} samples: avg_speed={:.1} stability={:.2} fatigue={}",
        samples.len(),
        metrics.avg_speed,
        metrics.stroke_stability,
        fatigue.detected
    );

    SessionAnalysis { metrics, fatigue }
}

/// Analyze a JSON sample payload and return the analysis as JSON (stateless, one-shot).
///
/// # Example
/// ```ignore
/// let analysis_json = analyze_session_json(samples_json, 20.0)?;
/// ```
pub fn analyze_session_json(json: &str, threshold_percent: f64) -> Result<String, ComputeError> {
    let samples = parse_samples(json)?;
    let analysis = analyze_session(&samples, threshold_percent);
    serde_json::to_string(&analysis).map_err(|e| ComputeError::EncodingError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strokes::fatigue::DEFAULT_FATIGUE_THRESHOLD_PCT;

    fn zigzag(n: usize) -> Vec<StrokeSample> {
        (0..n)
            .map(|i| {
                let y = if i % 2 == 0 { 0.0 } else { 8.0 };
                StrokeSample::new(i as f64 * 5.0, y, i as i64 * 20, 0.6)
            })
            .collect()
    }

    #[test]
    fn test_full_analysis_fills_signals() {
        let samples = zigzag(20);
        let analysis = analyze_session(&samples, DEFAULT_FATIGUE_THRESHOLD_PCT);

        assert_eq!(analysis.metrics.total_strokes, 20);
        assert!((analysis.metrics.avg_pressure - 0.6).abs() < 1e-12);
        assert!(analysis.metrics.stroke_speed_data.is_some());
        assert!(analysis.metrics.micrographia_data.is_some());
        let tremor = analysis.metrics.tremor_data.unwrap();
        assert!(tremor.tremor_score > 0.0);
        assert_eq!(tremor.high_freq_segments.len(), 18);
        // Constant speed
        assert!(!analysis.fatigue.detected);
    }

    #[test]
    fn test_empty_session() {
        let analysis = analyze_session(&[], DEFAULT_FATIGUE_THRESHOLD_PCT);
        assert_eq!(analysis.metrics.total_strokes, 0);
        assert_eq!(analysis.metrics.stroke_speed_data, None);
        assert_eq!(analysis.metrics.micrographia_data, None);
        assert_eq!(analysis.metrics.tremor_data, None);
        assert!(!analysis.fatigue.detected);
    }

    #[test]
    fn test_json_entry_point() {
        let json = r#"{"strokes": [
            {"x": 0, "y": 0, "timestamp": 0},
            {"x": 10, "y": 0, "timestamp": 100},
            {"x": 20, "y": 0, "timestamp": 200}
        ]}"#;
        let out = analyze_session_json(json, 20.0).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["metrics"]["total_strokes"], 3);
        assert!((value["metrics"]["avg_speed"].as_f64().unwrap() - 100.0).abs() < 1e-9);
        assert_eq!(value["fatigue"]["detected"], false);
        assert!(value["metrics"].get("micrographia_data").is_none());

        assert!(analyze_session_json("nope", 20.0).is_err());
    }

    #[test]
    fn test_json_with_extreme_timestamps() {
        let json = r#"[
            {"x": 0, "y": 0, "timestamp": -9223372036854775808},
            {"x": 1, "y": 0, "timestamp": 9223372036854775807}
        ]"#;
        let out = analyze_session_json(json, 20.0).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["metrics"]["avg_speed"], 0.0);
        assert!(value["metrics"].get("stroke_speed_data").is_none());
    }
}
