//! Fit the cropped drawing into a 20×20 box and pad it to the 28×28 grid

use image::imageops::{self, FilterType};

use crate::preprocess::canvas::InkImage;
use crate::preprocess::round_half_up;
use crate::types::{TENSOR_LEN, TENSOR_SIDE};

/// Side of the box the drawing is scaled into
pub const FIT_BOX: u32 = 20;

/// Blank border around the fit box
pub const MARGIN: u32 = (TENSOR_SIDE as u32 - FIT_BOX) / 2;

/// Target size preserving aspect ratio, longer side = [`FIT_BOX`]
pub fn fit_dimensions(width: u32, height: u32) -> (u32, u32) {
    let ratio = width.max(1) as f64 / height.max(1) as f64;
    let side = FIT_BOX as f64;

    if ratio > 1.0 {
        let h = round_half_up(side / ratio).clamp(1.0, side) as u32;
        (FIT_BOX, h)
    } else {
        let w = round_half_up(side * ratio).clamp(1.0, side) as u32;
        (w, FIT_BOX)
    }
}

/// Scale into the fit box, centered along the shorter side, and place the box
/// in the middle of a blank 28×28 canvas.
pub fn fit_and_pad(image: &InkImage) -> InkImage {
    let (width, height) = fit_dimensions(image.width(), image.height());
    let scaled = imageops::resize(image, width, height, FilterType::Triangle);

    let mut canvas = InkImage::new(TENSOR_SIDE as u32, TENSOR_SIDE as u32);
    let x = MARGIN + (FIT_BOX - width) / 2;
    let y = MARGIN + (FIT_BOX - height) / 2;
    imageops::replace(&mut canvas, &scaled, x as i64, y as i64);
    canvas
}

/// Flatten a 28×28 raster into a row-major grid of ink values in [0, 1]
pub fn to_grid(image: &InkImage) -> Vec<f32> {
    debug_assert_eq!(image.dimensions(), (TENSOR_SIDE as u32, TENSOR_SIDE as u32));
    let mut grid = Vec::with_capacity(TENSOR_LEN);
    grid.extend(image.pixels().map(|p| p.0[0].clamp(0.0, 1.0)));
    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_fit_dimensions() {
        assert_eq!(fit_dimensions(100, 100), (20, 20));
        assert_eq!(fit_dimensions(100, 50), (20, 10));
        assert_eq!(fit_dimensions(30, 120), (5, 20));
        // Extreme aspect ratios keep at least one pixel
        assert_eq!(fit_dimensions(1000, 1), (20, 1));
        assert_eq!(fit_dimensions(1, 1000), (1, 20));
        assert_eq!(fit_dimensions(1, 1), (20, 20));
    }

    #[test]
    fn test_pad_keeps_margin() {
        let image = InkImage::from_pixel(40, 40, Luma([1.0]));
        let padded = fit_and_pad(&image);
        assert_eq!(padded.dimensions(), (28, 28));

        for (x, y, p) in padded.enumerate_pixels() {
            let inside = (MARGIN..MARGIN + FIT_BOX).contains(&x)
                && (MARGIN..MARGIN + FIT_BOX).contains(&y);
            if inside {
                assert!((p.0[0] - 1.0).abs() < 1e-4, "({x}, {y}) = {}", p.0[0]);
            } else {
                assert_eq!(p.0[0], 0.0);
            }
        }
    }

    #[test]
    fn test_wide_drawing_centered_vertically() {
        let image = InkImage::from_pixel(80, 20, Luma([1.0]));
        let grid = to_grid(&fit_and_pad(&image));

        // 20×5 block starting at row 4 + 7
        let ink_rows: Vec<usize> = (0..TENSOR_SIDE)
            .filter(|row| grid[row * TENSOR_SIDE + 14] > 0.5)
            .collect();
        assert_eq!(ink_rows, (11..16).collect::<Vec<_>>());
    }

    #[test]
    fn test_grid_length() {
        let grid = to_grid(&InkImage::new(28, 28));
        assert_eq!(grid.len(), TENSOR_LEN);
        assert!(grid.iter().all(|&v| v == 0.0));
    }
}
