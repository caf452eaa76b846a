//! Bounding-box crop
//!
//! Trims the drawing to the tight axis-aligned box around its ink pixels.

use image::{imageops, ImageBuffer};
use serde::{Deserialize, Serialize};

use crate::preprocess::canvas::{is_ink, InkImage};

/// Axis-aligned pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// Tight box around all ink pixels, or `None` for a blank canvas
pub fn ink_bounds(image: &InkImage) -> Option<BoundingBox> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;

    for (x, y, pixel) in image.enumerate_pixels() {
        if !is_ink(pixel.0[0]) {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((left, top, right, bottom)) => {
                (left.min(x), top.min(y), right.max(x), bottom.max(y))
            }
        });
    }

    bounds.map(|(left, top, right, bottom)| BoundingBox {
        left,
        top,
        width: right - left + 1,
        height: bottom - top + 1,
    })
}

/// Crop to the ink bounding box.
///
/// A blank canvas yields a 1×1 blank image so later stages never divide by a
/// zero dimension.
pub fn crop_to_ink(image: &InkImage) -> InkImage {
    match ink_bounds(image) {
        Some(b) => imageops::crop_imm(image, b.left, b.top, b.width, b.height).to_image(),
        None => {
            log::debug!("blank canvas, substituting 1x1 crop");
            ImageBuffer::new(1, 1)
        }
    }
}
