//! Normalization pipeline orchestration
//!
//! Runs the preprocessing stages in order and packages the classifier input.

use image::{DynamicImage, GrayImage, Luma};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ComputeError;
use crate::preprocess::canvas::{self, InkImage};
use crate::preprocess::crop::crop_to_ink;
use crate::preprocess::deskew::deskew;
use crate::preprocess::filters::{binarize, center_by_mass, dilate, smooth, BINARIZE_THRESHOLD};
use crate::preprocess::profile::ink_stats;
use crate::preprocess::resize::{fit_and_pad, to_grid};
use crate::types::{InkStats, NormalizedTensor, Profile, TENSOR_SIDE};

/// Enhanced drawings with less ink than this after smoothing get dilated
const DILATION_INK_LIMIT: f32 = 70.0;

/// Normalize encoded image bytes (stateless, one-shot).
///
/// # Arguments
/// * `bytes` - Encoded drawing (PNG, JPEG, BMP, GIF)
/// * `profile` - Preprocessing profile, `None` to auto-detect
///
/// # Returns
/// The 28×28 classifier input
pub fn normalize(bytes: &[u8], profile: Option<Profile>) -> Result<NormalizedTensor, ComputeError> {
    ImageNormalizer::new()
        .normalize_bytes(bytes, profile)
        .map(|output| output.tensor)
}

/// Result of normalizing one drawing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizationOutput {
    /// Classifier input
    pub tensor: NormalizedTensor,
    /// Profile actually applied
    pub profile: Profile,
    /// Ink statistics the profile decision was based on
    pub stats: InkStats,
    /// Rendered copy of the tensor, when requested
    #[serde(skip)]
    pub preview: Option<GrayImage>,
}

/// Drawing normalizer
#[derive(Debug, Clone, Default)]
pub struct ImageNormalizer {
    render_preview: bool,
}

impl ImageNormalizer {
    /// Create a normalizer that does not render previews
    pub fn new() -> Self {
        Self::default()
    }

    /// Also render a 28×28 preview image with every output
    pub fn with_preview(mut self, render_preview: bool) -> Self {
        self.render_preview = render_preview;
        self
    }

    /// Decode and normalize an encoded drawing
    pub fn normalize_bytes(
        &self,
        bytes: &[u8],
        profile: Option<Profile>,
    ) -> Result<NormalizationOutput, ComputeError> {
        let ink = canvas::decode(bytes)?;
        Ok(self.normalize_ink(ink, profile))
    }

    /// Normalize an already decoded drawing
    pub fn normalize_image(&self, image: &DynamicImage, profile: Option<Profile>) -> NormalizationOutput {
        self.normalize_ink(canvas::from_dynamic(image), profile)
    }

    /// Normalize an ink raster
    pub fn normalize_ink(&self, ink: InkImage, profile: Option<Profile>) -> NormalizationOutput {
        // Stage 1-2: Crop to the ink and remove slant
        let cropped = crop_to_ink(&ink);
        let straightened = deskew(cropped);

        // Stage 3-5: Fit into 20×20, pad to 28×28, flatten
        let grid = to_grid(&fit_and_pad(&straightened));

        // Statistics come from the padded grid; centering cannot move ink
        // across the margin so they are unaffected by stage 6
        let stats = ink_stats(&grid);
        let profile = Profile::resolve(profile, &stats);

        // Stage 6: Re-center by mass
        let grid = center_by_mass(&grid);

        // Stage 7: Profile filters
        let grid = match profile {
            Profile::Standard => grid,
            Profile::Enhanced => enhance(&grid, &stats),
        };

        let tensor = NormalizedTensor::from_grid(grid);
        let preview = self.render_preview.then(|| render_preview(&tensor));

        NormalizationOutput {
            tensor,
            profile,
            stats,
            preview,
        }
    }
}

/// Smooth, conditionally dilate, then binarize
fn enhance(grid: &[f32], stats: &InkStats) -> Vec<f32> {
    let smoothing = stats.smoothing();
    let mut grid = smooth(grid, smoothing);

    let smoothed_sum: f32 = grid.iter().sum();
    if !stats.is_very_small() && smoothed_sum < DILATION_INK_LIMIT {
        log::debug!("dilating thin drawing (ink after {smoothing:?} smoothing = {smoothed_sum:.2})");
        grid = dilate(&grid);
    }

    binarize(&grid, BINARIZE_THRESHOLD)
}

/// Render the tensor the way the classifier sees it: white ink on black
pub fn render_preview(tensor: &NormalizedTensor) -> GrayImage {
    let side = TENSOR_SIDE as u32;
    GrayImage::from_fn(side, side, |x, y| {
        let ink = tensor.get(x as usize, y as usize).clamp(0.0, 1.0);
        Luma([(ink * 255.0).round() as u8])
    })
}

/// Write a rendered preview; the format follows the file extension
pub fn save_preview(preview: &GrayImage, path: &Path) -> Result<(), ComputeError> {
    preview.save(path).map_err(|e| {
        ComputeError::EncodingError(format!("failed to write preview {}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TENSOR_LEN;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn encode_png(image: &RgbaImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    /// A thick ring, roughly a hand-drawn zero
    fn ring(width: u32, height: u32) -> RgbaImage {
        let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);
        let radius = width.min(height) as f64 * 0.35;
        RgbaImage::from_fn(width, height, |x, y| {
            let d = ((x as f64 - cx).powi(2) + (y as f64 - cy).powi(2)).sqrt();
            if (d - radius).abs() < radius * 0.2 {
                BLACK
            } else {
                WHITE
            }
        })
    }

    /// A thin vertical stroke, roughly a one
    fn bar(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            if x >= width / 2 && x < width / 2 + 2 && y > height / 4 && y < height * 3 / 4 {
                BLACK
            } else {
                WHITE
            }
        })
    }

    fn ink_bounds(tensor: &NormalizedTensor) -> Option<(usize, usize, usize, usize)> {
        let mut bounds: Option<(usize, usize, usize, usize)> = None;
        for y in 0..TENSOR_SIDE {
            for x in 0..TENSOR_SIDE {
                if tensor.get(x, y) > 0.1 {
                    bounds = Some(match bounds {
                        None => (x, y, x, y),
                        Some((l, t, r, b)) => (l.min(x), t.min(y), r.max(x), b.max(y)),
                    });
                }
            }
        }
        bounds
    }

    #[test]
    fn test_blank_canvas_gives_zero_tensor() {
        let bytes = encode_png(&RgbaImage::from_pixel(280, 280, WHITE));
        for profile in [None, Some(Profile::Standard), Some(Profile::Enhanced)] {
            let tensor = normalize(&bytes, profile).unwrap();
            assert_eq!(tensor.as_slice().len(), TENSOR_LEN);
            assert!(tensor.as_slice().iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn test_transparent_canvas_is_blank() {
        let bytes = encode_png(&RgbaImage::new(64, 64));
        let output = ImageNormalizer::new().normalize_bytes(&bytes, None).unwrap();
        assert_eq!(output.stats.active_pixels, 0);
        assert_eq!(output.tensor.sum(), 0.0);
    }

    #[test]
    fn test_output_always_28_by_28() {
        for (w, h) in [(1, 1), (3, 500), (500, 3), (280, 280), (640, 200)] {
            let bytes = encode_png(&ring(w, h));
            let tensor = normalize(&bytes, None).unwrap();
            assert_eq!(tensor.as_slice().len(), TENSOR_LEN);
            assert_eq!(tensor.shape(), [1, 28, 28, 1]);
            assert!(tensor.as_slice().iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn test_bold_drawing_keeps_grayscale() {
        let output = ImageNormalizer::new()
            .normalize_bytes(&encode_png(&ring(280, 280)), None)
            .unwrap();
        assert_eq!(output.profile, Profile::Standard);
        assert!(output.stats.active_pixels >= 120);
        // Resampling leaves anti-aliased edges
        assert!(output
            .tensor
            .as_slice()
            .iter()
            .any(|&v| v > 0.0 && v < 1.0));
    }

    #[test]
    fn test_thin_drawing_is_enhanced_and_binary() {
        let output = ImageNormalizer::new()
            .normalize_bytes(&encode_png(&bar(280, 280)), None)
            .unwrap();
        assert_eq!(output.profile, Profile::Enhanced);
        assert!(output
            .tensor
            .as_slice()
            .iter()
            .all(|&v| v == 0.0 || v == 1.0));
        assert!(output.tensor.sum() > 0.0);
    }

    #[test]
    fn test_explicit_profile_overrides_detection() {
        let output = ImageNormalizer::new()
            .normalize_bytes(&encode_png(&bar(280, 280)), Some(Profile::Standard))
            .unwrap();
        assert_eq!(output.profile, Profile::Standard);
    }

    #[test]
    fn test_ink_lands_inside_margin() {
        let tensor = normalize(&encode_png(&ring(300, 200)), Some(Profile::Standard)).unwrap();
        let (left, top, right, bottom) = ink_bounds(&tensor).unwrap();
        assert!(left >= 3 && top >= 3);
        assert!(right <= 24 && bottom <= 24);
    }

    #[test]
    fn test_renormalizing_stays_centered() {
        let normalizer = ImageNormalizer::new().with_preview(true);
        let first = normalizer
            .normalize_bytes(&encode_png(&ring(280, 280)), Some(Profile::Standard))
            .unwrap();

        // Feed the rendered output back in as a dark-on-white drawing
        let preview = first.preview.unwrap();
        let redrawn = RgbaImage::from_fn(28, 28, |x, y| {
            let v = 255 - preview.get_pixel(x, y).0[0];
            Rgba([v, v, v, 255])
        });
        let second = normalizer
            .normalize_bytes(&encode_png(&redrawn), Some(Profile::Standard))
            .unwrap();

        let (left, top, right, bottom) = ink_bounds(&second.tensor).unwrap();
        let mid_x = (left + right) as f64 / 2.0;
        let mid_y = (top + bottom) as f64 / 2.0;
        assert!((mid_x - 14.0).abs() <= 1.5, "mid_x = {mid_x}");
        assert!((mid_y - 14.0).abs() <= 1.5, "mid_y = {mid_y}");
    }

    #[test]
    fn test_deterministic() {
        let bytes = encode_png(&bar(200, 300));
        for profile in [None, Some(Profile::Standard), Some(Profile::Enhanced)] {
            let a = normalize(&bytes, profile).unwrap();
            let b = normalize(&bytes, profile).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_preview_matches_tensor() {
        let output = ImageNormalizer::new()
            .with_preview(true)
            .normalize_bytes(&encode_png(&bar(100, 100)), Some(Profile::Enhanced))
            .unwrap();
        let preview = output.preview.unwrap();
        assert_eq!(preview.dimensions(), (28, 28));
        for y in 0..28u32 {
            for x in 0..28u32 {
                let expected = if output.tensor.get(x as usize, y as usize) > 0.5 { 255 } else { 0 };
                assert_eq!(preview.get_pixel(x, y).0[0], expected);
            }
        }
        assert!(ImageNormalizer::new()
            .normalize_bytes(&encode_png(&bar(100, 100)), None)
            .unwrap()
            .preview
            .is_none());
    }

    #[test]
    fn test_undecodable_input() {
        assert!(matches!(
            normalize(b"\x89PNG but not really", None),
            Err(ComputeError::InputDecode(_))
        ));
    }

    #[test]
    fn test_preview_write_failure_is_encoding_error() {
        let tensor = normalize(&encode_png(&ring(100, 100)), None).unwrap();
        let preview = render_preview(&tensor);

        let unknown = std::env::temp_dir().join("inkflux-preview.notanimage");
        assert!(matches!(
            save_preview(&preview, &unknown),
            Err(ComputeError::EncodingError(_))
        ));

        let missing_dir = std::env::temp_dir()
            .join("inkflux-no-such-dir")
            .join("preview.png");
        let err = save_preview(&preview, &missing_dir).unwrap_err();
        assert!(matches!(err, ComputeError::EncodingError(_)));
        assert!(err.to_string().contains("preview.png"));
    }
}
