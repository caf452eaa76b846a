//! Drawing normalization module
//!
//! Turns a raw canvas drawing into the fixed 28×28 ink grid a digit classifier
//! expects.
//!
//! Pipeline: Image bytes → Canvas (ink space) → Crop → Deskew → Fit 20×20 →
//! Pad 28×28 → Center → Profile filters → Tensor

pub mod canvas;
pub mod crop;
pub mod deskew;
pub mod filters;
pub mod pipeline;
pub mod profile;
pub mod resize;

pub use canvas::InkImage;
pub use pipeline::{normalize, render_preview, save_preview, ImageNormalizer, NormalizationOutput};

/// Round with ties toward positive infinity, the convention the model was
/// trained against (`round(-0.5) == 0`, `round(2.5) == 3`).
pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}
