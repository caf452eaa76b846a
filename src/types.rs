//! Core data types for Inkflux
//!
//! These types flow through the two pipelines: drawings are normalized into a
//! [`NormalizedTensor`], and recorded [`StrokeSample`] sequences are reduced to
//! [`Metrics`] and [`FatigueInfo`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ComputeError;

/// Side length of the classifier input grid
pub const TENSOR_SIDE: usize = 28;

/// Number of cells in the classifier input grid
pub const TENSOR_LEN: usize = TENSOR_SIDE * TENSOR_SIDE;

/// Batched tensor shape handed to the classifier: `[batch, height, width, channels]`
pub const TENSOR_SHAPE: [usize; 4] = [1, TENSOR_SIDE, TENSOR_SIDE, 1];

/// Pressure assumed when the input device does not report one
pub const DEFAULT_PRESSURE: f64 = 0.5;

fn default_pressure() -> f64 {
    DEFAULT_PRESSURE
}

/// One timestamped pen reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeSample {
    /// Horizontal position in canvas pixels
    pub x: f64,
    /// Vertical position in canvas pixels
    pub y: f64,
    /// Capture time in milliseconds, monotonic within a session
    pub timestamp: i64,
    /// Pen pressure in [0, 1]
    #[serde(default = "default_pressure")]
    pub pressure: f64,
    /// Pen-down segment this sample belongs to.
    ///
    /// Consecutive samples whose ids are both present and differ straddle a
    /// pen lift; the pair is excluded from kinematic computations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_id: Option<u32>,
}

impl StrokeSample {
    /// Create a sample without a stroke id
    pub fn new(x: f64, y: f64, timestamp: i64, pressure: f64) -> Self {
        Self {
            x,
            y,
            timestamp,
            pressure,
            stroke_id: None,
        }
    }

    /// Tag this sample with a stroke id
    pub fn in_stroke(mut self, stroke_id: u32) -> Self {
        self.stroke_id = Some(stroke_id);
        self
    }

    /// Check that coordinates are finite and pressure lies in [0, 1]
    pub fn validate(&self) -> Result<(), ComputeError> {
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(ComputeError::InvalidSample(format!(
                "non-finite position ({}, {}) at t={}",
                self.x, self.y, self.timestamp
            )));
        }
        if !(0.0..=1.0).contains(&self.pressure) {
            return Err(ComputeError::InvalidSample(format!(
                "pressure {} outside [0, 1] at t={}",
                self.pressure, self.timestamp
            )));
        }
        Ok(())
    }

    /// Whether the pair `(self, next)` spans a pen lift
    pub fn crosses_boundary(&self, next: &StrokeSample) -> bool {
        matches!((self.stroke_id, next.stroke_id), (Some(a), Some(b)) if a != b)
    }
}

/// Input device that produced a pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    Pen,
    Touch,
    Mouse,
}

/// Preprocessing intensity applied after centering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// Raw grayscale values are kept
    Standard,
    /// Smoothing, optional dilation and binarization for faint or shaky ink
    Enhanced,
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::Standard => write!(f, "standard"),
            Profile::Enhanced => write!(f, "enhanced"),
        }
    }
}

impl FromStr for Profile {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Profile::Standard),
            "enhanced" | "parkinson-enhanced" => Ok(Profile::Enhanced),
            other => Err(ComputeError::ParseError(format!("unknown profile: {other}"))),
        }
    }
}

/// Ink statistics of the padded 28×28 grid, used for profile selection
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InkStats {
    /// Cells with ink above the activity threshold
    pub active_pixels: u32,
    /// Total ink over all cells
    pub pixel_sum: f32,
}

/// Fixed 28×28 single-channel ink grid (1 = full ink, 0 = blank), row-major.
///
/// The length invariant is enforced on construction and deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct NormalizedTensor {
    data: Vec<f32>,
}

impl NormalizedTensor {
    /// An all-blank grid
    pub fn zeros() -> Self {
        Self {
            data: vec![0.0; TENSOR_LEN],
        }
    }

    /// Wrap a grid produced by the preprocessing stages
    pub(crate) fn from_grid(data: Vec<f32>) -> Self {
        debug_assert_eq!(data.len(), TENSOR_LEN);
        Self { data }
    }

    /// Value at column `x`, row `y`
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * TENSOR_SIDE + x]
    }

    /// Row-major cell values
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Shape including the batch and channel dimensions
    pub fn shape(&self) -> [usize; 4] {
        TENSOR_SHAPE
    }

    /// Total ink
    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }
}

impl TryFrom<Vec<f32>> for NormalizedTensor {
    type Error = ComputeError;

    fn try_from(data: Vec<f32>) -> Result<Self, Self::Error> {
        if data.len() != TENSOR_LEN {
            return Err(ComputeError::ParseError(format!(
                "tensor must have {} cells, got {}",
                TENSOR_LEN,
                data.len()
            )));
        }
        Ok(Self { data })
    }
}

impl From<NormalizedTensor> for Vec<f32> {
    fn from(tensor: NormalizedTensor) -> Self {
        tensor.data
    }
}

/// Speed summary over instantaneous speeds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeSpeedData {
    /// Mean instantaneous speed (px/s)
    pub average_speed: f64,
    /// Fastest instantaneous speed (px/s)
    pub max_speed: f64,
    /// Slowest instantaneous speed (px/s)
    pub min_speed: f64,
    /// Ink path length (px)
    pub total_length: f64,
}

/// Handwriting size trend across a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicrographiaData {
    /// Last segment size divided by first segment size
    pub shrink_ratio: f64,
    /// Bounding-box diagonal of each segment, in order
    pub segment_sizes: Vec<f64>,
}

/// Directional jitter across a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TremorData {
    /// Mean absolute turning angle (radians)
    pub tremor_score: f64,
    /// Samples where the path turned sharply
    pub high_freq_segments: Vec<StrokeSample>,
}

/// Kinematic and stability metrics of a session
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Metrics {
    /// Path length over elapsed time (px/s)
    pub avg_speed: f64,
    /// Mean pen pressure
    pub avg_pressure: f64,
    /// Population variance of instantaneous speeds (px²/s²)
    pub speed_variance: f64,
    /// Number of recorded samples
    pub total_strokes: usize,
    /// Smoothness score in [0, 10]
    pub stroke_stability: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_speed_data: Option<StrokeSpeedData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub micrographia_data: Option<MicrographiaData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tremor_data: Option<TremorData>,
}

/// Outcome of fatigue detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FatigueInfo {
    pub detected: bool,
    /// Human-readable explanation of the verdict
    pub reason: String,
    /// Early-to-late speed drop in percent, when it could be computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drop_percent: Option<f64>,
}

/// Full analysis of one recorded session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionAnalysis {
    pub metrics: Metrics,
    pub fatigue: FatigueInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_defaults_pressure() {
        let sample: StrokeSample =
            serde_json::from_str(r#"{"x": 1.0, "y": 2.0, "timestamp": 40}"#).unwrap();
        assert_eq!(sample.pressure, DEFAULT_PRESSURE);
        assert_eq!(sample.stroke_id, None);
    }

    #[test]
    fn test_sample_validation() {
        assert!(StrokeSample::new(0.0, 0.0, 0, 0.3).validate().is_ok());
        assert!(StrokeSample::new(0.0, 0.0, 0, 1.2).validate().is_err());
        assert!(StrokeSample::new(f64::NAN, 0.0, 0, 0.5).validate().is_err());
    }

    #[test]
    fn test_boundary_requires_both_ids() {
        let a = StrokeSample::new(0.0, 0.0, 0, 0.5);
        let b = StrokeSample::new(1.0, 0.0, 10, 0.5);
        assert!(!a.crosses_boundary(&b));
        assert!(!a.in_stroke(0).crosses_boundary(&b));
        assert!(!a.in_stroke(2).crosses_boundary(&b.in_stroke(2)));
        assert!(a.in_stroke(1).crosses_boundary(&b.in_stroke(2)));
    }

    #[test]
    fn test_profile_parsing() {
        assert_eq!("standard".parse::<Profile>().unwrap(), Profile::Standard);
        assert_eq!("Enhanced".parse::<Profile>().unwrap(), Profile::Enhanced);
        assert_eq!(
            "parkinson-enhanced".parse::<Profile>().unwrap(),
            Profile::Enhanced
        );
        assert!("auto".parse::<Profile>().is_err());
    }

    #[test]
    fn test_tensor_length_enforced() {
        assert!(NormalizedTensor::try_from(vec![0.0; 10]).is_err());
        let tensor = NormalizedTensor::try_from(vec![0.5; TENSOR_LEN]).unwrap();
        assert_eq!(tensor.shape(), [1, 28, 28, 1]);
        assert!((tensor.sum() - 392.0).abs() < 1e-3);

        let json = serde_json::to_string(&NormalizedTensor::zeros()).unwrap();
        let back: NormalizedTensor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, NormalizedTensor::zeros());
        assert!(serde_json::from_str::<NormalizedTensor>("[0.0, 1.0]").is_err());
    }
}
