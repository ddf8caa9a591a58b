//! Conversion of decoded images to the canonical color model and resolution.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, RgbImage};

use crate::fetch::RawImage;

/// A square RGB image at the canonical resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalImage {
    pixels: RgbImage,
}

impl CanonicalImage {
    /// Side length in pixels.
    pub fn size(&self) -> u32 {
        self.pixels.width()
    }

    /// Borrow the RGB pixels.
    pub fn as_rgb(&self) -> &RgbImage {
        &self.pixels
    }

    /// Owned copy as a [`DynamicImage`], for hashers that take one.
    pub fn to_dynamic(&self) -> DynamicImage {
        DynamicImage::ImageRgb8(self.pixels.clone())
    }

    /// Luma conversion of the canonical pixels.
    pub fn to_luma(&self) -> GrayImage {
        imageops::grayscale(&self.pixels)
    }
}

/// Convert to 8-bit RGB (alpha dropped, palette and gray expanded) and
/// resample to `size × size` with a Lanczos filter.
pub fn normalize(raw: &RawImage, size: u32) -> CanonicalImage {
    let rgb = raw.as_dynamic().to_rgb8();
    let pixels = if rgb.dimensions() == (size, size) {
        rgb
    } else {
        imageops::resize(&rgb, size, size, FilterType::Lanczos3)
    };
    CanonicalImage { pixels }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgba, RgbaImage};

    #[test]
    fn grayscale_becomes_square_rgb() {
        let raw = RawImage::new(DynamicImage::ImageLuma8(GrayImage::from_pixel(
            600,
            400,
            Luma([90]),
        )));
        let canon = normalize(&raw, 256);
        assert_eq!(canon.size(), 256);
        assert_eq!(canon.as_rgb().dimensions(), (256, 256));
        let p = canon.as_rgb().get_pixel(128, 128);
        assert_eq!(p.0, [90, 90, 90]);
    }

    #[test]
    fn alpha_is_dropped() {
        let raw = RawImage::new(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            32,
            32,
            Rgba([200, 10, 10, 0]),
        )));
        let canon = normalize(&raw, 16);
        assert_eq!(canon.as_rgb().get_pixel(0, 0).0, [200, 10, 10]);
    }

    #[test]
    fn normalization_is_deterministic() {
        let img = RgbImage::from_fn(97, 61, |x, y| image::Rgb([(x * 2) as u8, (y * 3) as u8, 7]));
        let raw = RawImage::new(DynamicImage::ImageRgb8(img));
        assert_eq!(normalize(&raw, 256), normalize(&raw, 256));
    }
}
