//! Grayscale conversion and channel duplication.
//!
//! Every filter except glow works on a single luminance channel and
//! duplicates it back into three channels before returning, so all
//! filter outputs share the same 3-channel 8-bit shape and can be
//! stacked.

use image::{GrayImage, Luma, Rgb, RgbImage};

/// Fixed-point precision of the luma weights.
const SHIFT: u32 = 14;

/// Rec.601 weights scaled by `1 << SHIFT`: 0.299, 0.587, 0.114.
const R_WEIGHT: u32 = 4899;
const G_WEIGHT: u32 = 9617;
const B_WEIGHT: u32 = 1868;
const _: () = assert!(R_WEIGHT + G_WEIGHT + B_WEIGHT == 1 << SHIFT);

/// Convert an RGB image to single-channel luminance.
///
/// Uses the standard luma formula `0.299*R + 0.587*G + 0.114*B` in
/// 14-bit fixed point, rounded to nearest. The weights sum to exactly
/// `1 << 14`, so a neutral gray pixel keeps its value.
#[must_use = "returns the grayscale image"]
pub fn to_gray(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([luma(*image.get_pixel(x, y))])
    })
}

/// Luminance of one RGB pixel.
#[must_use]
pub fn luma(pixel: Rgb<u8>) -> u8 {
    let [r, g, b] = pixel.0;
    let weighted = u32::from(r) * R_WEIGHT + u32::from(g) * G_WEIGHT + u32::from(b) * B_WEIGHT;
    let rounded = (weighted + (1 << (SHIFT - 1))) >> SHIFT;
    // Max is 255 * (1 << SHIFT) + half, which shifts back to 255.
    u8::try_from(rounded).unwrap_or(u8::MAX)
}

/// Replicate a single channel into all three RGB channels.
#[must_use = "returns the 3-channel image"]
pub fn gray_to_rgb(gray: &GrayImage) -> RgbImage {
    RgbImage::from_fn(gray.width(), gray.height(), |x, y| {
        let v = gray.get_pixel(x, y).0[0];
        Rgb([v, v, v])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_gray_is_preserved() {
        for v in [0u8, 1, 77, 128, 200, 254, 255] {
            assert_eq!(luma(Rgb([v, v, v])), v, "gray level {v}");
        }
    }

    #[test]
    fn weighted_luminance_orders_primaries() {
        let r = luma(Rgb([255, 0, 0]));
        let g = luma(Rgb([0, 255, 0]));
        let b = luma(Rgb([0, 0, 255]));
        assert_eq!((r, g, b), (76, 150, 29));
        assert!(g > r && r > b);
    }

    #[test]
    fn output_dimensions_match_input() {
        let img = RgbImage::new(17, 31);
        let gray = to_gray(&img);
        assert_eq!(gray.dimensions(), (17, 31));
    }

    #[test]
    fn gray_to_rgb_duplicates_channel() {
        let gray = GrayImage::from_fn(3, 2, |x, y| Luma([u8::try_from(x * 10 + y).unwrap_or(0)]));
        let rgb = gray_to_rgb(&gray);
        assert_eq!(rgb.dimensions(), (3, 2));
        for (x, y, p) in rgb.enumerate_pixels() {
            let v = gray.get_pixel(x, y).0[0];
            assert_eq!(p.0, [v, v, v]);
        }
    }

    #[test]
    fn round_trip_through_gray_is_identity_for_gray_rgb() {
        let rgb = RgbImage::from_fn(4, 4, |x, y| {
            let v = u8::try_from((x + y) * 30).unwrap_or(255);
            Rgb([v, v, v])
        });
        assert_eq!(gray_to_rgb(&to_gray(&rgb)), rgb);
    }
}
