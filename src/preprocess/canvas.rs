//! Canvas decoding
//!
//! Drawings arrive as encoded bitmaps of dark ink on a white (or transparent)
//! background. Everything downstream works in ink space, where a pixel value of
//! `1 - brightness / 255` means 1.0 for black ink and 0.0 for blank paper, so
//! zero padding is the same as white fill.

use image::{DynamicImage, ImageBuffer, Luma, Rgba};

use crate::error::ComputeError;

/// Single-channel ink-density raster
pub type InkImage = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Pixels darker than this mean RGB brightness count as ink
pub const INK_BRIGHTNESS_THRESHOLD: f32 = 240.0;

/// Ink level equivalent to [`INK_BRIGHTNESS_THRESHOLD`]
const INK_FLOOR: f32 = (255.0 - INK_BRIGHTNESS_THRESHOLD) / 255.0;

/// Brightness quantization is 1/3 of a level, well above this tolerance
const INK_FLOOR_TOLERANCE: f32 = 1e-6;

/// Decode encoded image bytes into an ink raster
pub fn decode(bytes: &[u8]) -> Result<InkImage, ComputeError> {
    if bytes.is_empty() {
        return Err(ComputeError::InputDecode("empty image data".to_string()));
    }
    let image = image::load_from_memory(bytes)?;
    if image.width() == 0 || image.height() == 0 {
        return Err(ComputeError::InputDecode(format!(
            "degenerate image size {}x{}",
            image.width(),
            image.height()
        )));
    }
    Ok(from_dynamic(&image))
}

/// Convert any decoded image into an ink raster
pub fn from_dynamic(image: &DynamicImage) -> InkImage {
    let rgba = image.to_rgba8();
    ImageBuffer::from_fn(rgba.width(), rgba.height(), |x, y| {
        Luma([ink_of(rgba.get_pixel(x, y))])
    })
}

/// Ink level of an RGBA pixel composited over white
pub fn ink_of(pixel: &Rgba<u8>) -> f32 {
    let [r, g, b, a] = pixel.0;
    let alpha = a as f32 / 255.0;
    let brightness = (r as f32 + g as f32 + b as f32) / 3.0;
    let composited = brightness * alpha + 255.0 * (1.0 - alpha);
    1.0 - composited / 255.0
}

/// Whether an ink level would be judged user-drawn rather than background
pub fn is_ink(ink: f32) -> bool {
    ink > INK_FLOOR + INK_FLOOR_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbaImage};
    use std::io::Cursor;

    fn encode_png(image: &RgbaImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_ink_levels() {
        assert_eq!(ink_of(&Rgba([255, 255, 255, 255])), 0.0);
        assert_eq!(ink_of(&Rgba([0, 0, 0, 255])), 1.0);
        // Fully transparent pixels are blank paper, whatever their color
        assert_eq!(ink_of(&Rgba([0, 0, 0, 0])), 0.0);
    }

    #[test]
    fn test_ink_threshold() {
        assert!(!is_ink(ink_of(&Rgba([240, 240, 240, 255]))));
        assert!(is_ink(ink_of(&Rgba([239, 239, 239, 255]))));
        assert!(is_ink(ink_of(&Rgba([240, 240, 239, 255]))));
        assert!(!is_ink(0.0));
    }

    #[test]
    fn test_decode_png() {
        let mut image = RgbaImage::from_pixel(4, 3, Rgba([255, 255, 255, 255]));
        image.put_pixel(1, 2, Rgba([0, 0, 0, 255]));

        let ink = decode(&encode_png(&image)).unwrap();
        assert_eq!(ink.dimensions(), (4, 3));
        assert_eq!(ink.get_pixel(1, 2).0[0], 1.0);
        assert_eq!(ink.get_pixel(0, 0).0[0], 0.0);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode(b"definitely not an image"),
            Err(ComputeError::InputDecode(_))
        ));
        assert!(matches!(decode(&[]), Err(ComputeError::InputDecode(_))));
    }
}
