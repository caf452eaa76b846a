//! Shear-based deskewing
//!
//! Estimates the slant of the drawing from its ink-weighted second moments and
//! applies the opposite horizontal shear, pivoting around half the height.

use image::{ImageBuffer, Luma};

use crate::preprocess::canvas::InkImage;

/// Below this vertical variance the slant is undefined (single-row drawings)
const MIN_VERTICAL_VARIANCE: f64 = 1e-9;

/// Shears smaller than this move no pixel measurably
const MIN_SKEW: f64 = 1e-6;

/// Shear coefficient `cov(x, y) / var(y)` weighted by ink intensity.
///
/// Returns `None` when the image carries no ink or has no vertical extent.
pub fn shear_coefficient(image: &InkImage) -> Option<f64> {
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_yy = 0.0;
    let mut total = 0.0;

    for (x, y, pixel) in image.enumerate_pixels() {
        let intensity = pixel.0[0] as f64;
        let (x, y) = (x as f64, y as f64);
        sum_x += x * intensity;
        sum_y += y * intensity;
        sum_xy += x * y * intensity;
        sum_yy += y * y * intensity;
        total += intensity;
    }

    if total <= 0.0 {
        return None;
    }

    let mean_x = sum_x / total;
    let mean_y = sum_y / total;
    let cov_xy = sum_xy / total - mean_x * mean_y;
    let var_y = sum_yy / total - mean_y * mean_y;

    if var_y <= MIN_VERTICAL_VARIANCE {
        return None;
    }

    let skew = cov_xy / var_y;
    skew.is_finite().then_some(skew)
}

/// Deskew the drawing, or return it unchanged when no slant can be estimated
pub fn deskew(image: InkImage) -> InkImage {
    match shear_coefficient(&image) {
        Some(skew) if skew.abs() > MIN_SKEW => shear(&image, skew),
        _ => {
            log::debug!("deskew skipped: no measurable slant");
            image
        }
    }
}

/// Apply `x' = x - skew * (y - h/2)`, sampling the source with linear
/// interpolation along each row. Ink sheared past the edges is lost.
pub fn shear(image: &InkImage, skew: f64) -> InkImage {
    let (width, height) = image.dimensions();
    let pivot = height as f64 / 2.0;

    ImageBuffer::from_fn(width, height, |x, y| {
        let source_x = x as f64 + skew * (y as f64 + 0.5 - pivot);
        let left = source_x.floor();
        let frac = (source_x - left) as f32;
        let left = left as i64;

        let at = |col: i64| -> f32 {
            if col < 0 || col >= width as i64 {
                0.0
            } else {
                image.get_pixel(col as u32, y).0[0]
            }
        };

        Luma([at(left) * (1.0 - frac) + at(left + 1) * frac])
    })
}
