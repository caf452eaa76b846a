//! Error types for Inkflux

use thiserror::Error;

/// Errors that can occur during computation
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Failed to decode drawing: {0}")]
    InputDecode(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid stroke sample: {0}")]
    InvalidSample(String),

    #[error("Failed to load classifier model: {0}")]
    ModelLoad(String),

    #[error("Classifier error: {0}")]
    Classifier(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<image::ImageError> for ComputeError {
    fn from(e: image::ImageError) -> Self {
        ComputeError::InputDecode(e.to_string())
    }
}
