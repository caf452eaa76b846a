//! Inkflux - Deterministic drawing normalization and pen-stroke metrics
//!
//! Inkflux supports handwriting therapy for people with motor impairments. It
//! turns freehand digit drawings into the fixed input a digit classifier
//! expects, and reduces recorded pen samples to motor-control metrics.
//!
//! ## Modules
//!
//! - **Preprocess**: drawing → crop → deskew → fit → pad → center → profile filters → 28×28 tensor
//! - **Strokes**: pen events → samples → speed, pressure, stability, micrographia, tremor, fatigue
//! - **Classifier**: per-language model cache around an external digit classifier
//! - **Session**: digit-by-digit therapy sessions and progress across sessions

pub mod classifier;
pub mod error;
pub mod feedback;
pub mod preprocess;
pub mod session;
pub mod strokes;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use classifier::{Classifier, DigitRecognizer, Language, ModelLoader, Prediction, Recognition};
pub use error::ComputeError;
pub use feedback::feedback_for_digit;
pub use preprocess::{normalize, ImageNormalizer, NormalizationOutput};
pub use session::{SessionHistory, SessionSummary, TherapySession};
pub use strokes::{analyze_session, compute_metrics, detect_fatigue, StrokeRecorder};
pub use types::{FatigueInfo, Metrics, NormalizedTensor, Profile, SessionAnalysis, StrokeSample};

/// Inkflux version
pub const INKFLUX_VERSION: &str = env!("CARGO_PKG_VERSION");
