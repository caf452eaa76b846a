//! Stroke kinematics module
//!
//! Records timestamped pen samples and derives motor-control metrics from
//! them: speed, pressure, smoothness, handwriting size trend, jitter and
//! fatigue.
//!
//! Pipeline: Pointer events → Recorder → Samples → Kinematics / Signals /
//! Fatigue → SessionAnalysis

pub mod adapter;
pub mod fatigue;
pub mod kinematics;
pub mod pipeline;
pub mod recorder;
pub mod signals;

pub use adapter::{parse_ndjson, parse_samples};
pub use fatigue::{detect_fatigue, DEFAULT_FATIGUE_THRESHOLD_PCT};
pub use kinematics::{compute_metrics, instantaneous_speeds, speed_variance, stroke_stability};
pub use pipeline::{analyze_session, analyze_session_json};
pub use recorder::{PointerEvent, RecorderConfig, StrokeRecorder};
pub use signals::{analyze_stroke_speed, detect_micrographia, detect_tremor};
