//! The filter library.
//!
//! Each function maps an RGB image to a new RGB image of the same size.
//! All filters except [`glow`] convert to grayscale, transform the
//! single channel, and duplicate it back into three channels, so every
//! output can be fed straight into the next filter.
//!
//! Window sizes, kernels, and iteration counts are fixed constants.

use image::{GrayImage, Rgb, RgbImage};
use imageproc::morphology::Mask;

use crate::grayscale::{gray_to_rgb, to_gray};
use crate::kernel::{self, Kernel3};

/// Gaussian sigma of the glow blur.
pub const GLOW_SIGMA: f32 = 8.0;

/// Weight of the original image in the glow blend.
pub const GLOW_ORIGINAL_WEIGHT: f64 = 0.7;

/// Weight of the blurred image in the glow blend.
pub const GLOW_BLUR_WEIGHT: f64 = 0.3;

/// Run a grayscale transform and return it as a 3-channel image.
fn on_gray(image: &RgbImage, transform: impl FnOnce(&GrayImage) -> GrayImage) -> RgbImage {
    gray_to_rgb(&transform(&to_gray(image)))
}

/// Mean filter: 3x3 box average.
#[must_use = "returns the filtered image"]
pub fn mean(image: &RgbImage) -> RgbImage {
    on_gray(image, kernel::box_mean)
}

/// Median filter over a 3x3 window.
///
/// Edge pixels see a replicated border.
#[must_use = "returns the filtered image"]
pub fn median(image: &RgbImage) -> RgbImage {
    on_gray(image, |gray| imageproc::filter::median_filter(gray, 1, 1))
}

/// Min filter: grayscale erosion with a flat 3x3 square.
#[must_use = "returns the filtered image"]
pub fn min(image: &RgbImage) -> RgbImage {
    on_gray(image, |gray| erode(gray, 1, 1))
}

/// Max filter: grayscale dilation with a flat 3x3 square.
#[must_use = "returns the filtered image"]
pub fn max(image: &RgbImage) -> RgbImage {
    on_gray(image, |gray| dilate(gray, 1, 1))
}

/// Pepper removal: the same 3x3 erosion as [`min`].
#[must_use = "returns the filtered image"]
pub fn pepper_removal(image: &RgbImage) -> RgbImage {
    on_gray(image, |gray| erode(gray, 1, 1))
}

/// Salt removal: 5x5 dilation applied twice.
#[must_use = "returns the filtered image"]
pub fn salt_removal(image: &RgbImage) -> RgbImage {
    on_gray(image, |gray| dilate(gray, 2, 2))
}

/// Horizontal Sobel gradient magnitude.
#[must_use = "returns the filtered image"]
pub fn sobel_x(image: &RgbImage) -> RgbImage {
    on_gray(image, |gray| gradient(gray, &kernel::SOBEL_X))
}

/// Vertical Sobel gradient magnitude.
#[must_use = "returns the filtered image"]
pub fn sobel_y(image: &RgbImage) -> RgbImage {
    on_gray(image, |gray| gradient(gray, &kernel::SOBEL_Y))
}

/// Bitwise OR of the Sobel x and y magnitude maps.
#[must_use = "returns the filtered image"]
pub fn sobel(image: &RgbImage) -> RgbImage {
    on_gray(image, |gray| {
        combined(gray, &kernel::SOBEL_X, &kernel::SOBEL_Y)
    })
}

/// Horizontal Prewitt gradient magnitude.
#[must_use = "returns the filtered image"]
pub fn prewitt_x(image: &RgbImage) -> RgbImage {
    on_gray(image, |gray| gradient(gray, &kernel::PREWITT_X))
}

/// Vertical Prewitt gradient magnitude.
#[must_use = "returns the filtered image"]
pub fn prewitt_y(image: &RgbImage) -> RgbImage {
    on_gray(image, |gray| gradient(gray, &kernel::PREWITT_Y))
}

/// Bitwise OR of the Prewitt x and y magnitude maps.
#[must_use = "returns the filtered image"]
pub fn prewitt(image: &RgbImage) -> RgbImage {
    on_gray(image, |gray| {
        combined(gray, &kernel::PREWITT_X, &kernel::PREWITT_Y)
    })
}

/// Laplacian magnitude.
#[must_use = "returns the filtered image"]
pub fn laplacian(image: &RgbImage) -> RgbImage {
    on_gray(image, |gray| gradient(gray, &kernel::LAPLACIAN))
}

/// Glow: blend 70% of the image with 30% of a Gaussian-blurred copy.
///
/// Unlike the other filters this keeps color. The blur runs on each
/// channel independently with sigma [`GLOW_SIGMA`]; `imageproc` derives
/// the kernel width from sigma.
#[must_use = "returns the filtered image"]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn glow(image: &RgbImage) -> RgbImage {
    let (w, h) = image.dimensions();

    let channels: [GrayImage; 3] = std::array::from_fn(|c| {
        GrayImage::from_fn(w, h, |x, y| image::Luma([image.get_pixel(x, y).0[c]]))
    });
    let blurred: [GrayImage; 3] =
        std::array::from_fn(|c| imageproc::filter::gaussian_blur_f32(&channels[c], GLOW_SIGMA));

    RgbImage::from_fn(w, h, |x, y| {
        let src = image.get_pixel(x, y).0;
        Rgb(std::array::from_fn(|c| {
            let soft = f64::from(blurred[c].get_pixel(x, y).0[0]) * GLOW_BLUR_WEIGHT;
            let blend = f64::from(src[c]).mul_add(GLOW_ORIGINAL_WEIGHT, soft);
            blend.round_ties_even().clamp(0.0, 255.0) as u8
        }))
    })
}

fn gradient(gray: &GrayImage, kernel: &Kernel3) -> GrayImage {
    kernel::magnitude(&kernel::correlate(gray, kernel))
}

fn combined(gray: &GrayImage, kx: &Kernel3, ky: &Kernel3) -> GrayImage {
    kernel::bitwise_or(&gradient(gray, kx), &gradient(gray, ky))
}

/// Flat square erosion of half-width `radius`, repeated `iterations` times.
///
/// Out-of-image samples do not take part in the minimum.
fn erode(gray: &GrayImage, radius: u8, iterations: usize) -> GrayImage {
    let mask = Mask::square(radius);
    (0..iterations).fold(gray.clone(), |acc, _| {
        imageproc::morphology::grayscale_erode(&acc, &mask)
    })
}

/// Flat square dilation of half-width `radius`, repeated `iterations` times.
fn dilate(gray: &GrayImage, radius: u8, iterations: usize) -> GrayImage {
    let mask = Mask::square(radius);
    (0..iterations).fold(gray.clone(), |acc, _| {
        imageproc::morphology::grayscale_dilate(&acc, &mask)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::dispatch::{Filter, FilterKind};

    fn luma_at(img: &RgbImage, x: u32, y: u32) -> u8 {
        let p = img.get_pixel(x, y).0;
        assert!(p[0] == p[1] && p[1] == p[2], "channels differ at ({x},{y})");
        p[0]
    }

    /// Gray test image: a single pixel of `spot` on a `background` field.
    fn spot_image(size: u32, background: u8, spot: u8, at: (u32, u32)) -> RgbImage {
        RgbImage::from_fn(size, size, |x, y| {
            let v = if (x, y) == at { spot } else { background };
            Rgb([v, v, v])
        })
    }

    fn gradient_image() -> RgbImage {
        RgbImage::from_fn(9, 7, |x, y| {
            let v = u8::try_from((x * 31 + y * 17) % 256).unwrap();
            Rgb([v, v.wrapping_mul(3), 255 - v])
        })
    }

    #[test]
    fn mean_of_flat_image_is_unchanged() {
        let img = spot_image(10, 128, 128, (0, 0));
        assert_eq!(mean(&img), img);
    }

    #[test]
    fn median_removes_isolated_spot() {
        let img = spot_image(5, 200, 0, (2, 2));
        let out = median(&img);
        assert_eq!(luma_at(&out, 2, 2), 200);
    }

    #[test]
    fn min_spreads_dark_pixel() {
        let img = spot_image(5, 255, 0, (2, 2));
        let out = min(&img);
        for y in 1..=3 {
            for x in 1..=3 {
                assert_eq!(luma_at(&out, x, y), 0);
            }
        }
        assert_eq!(luma_at(&out, 0, 0), 255);
    }

    #[test]
    fn max_removes_dark_pixel() {
        let img = spot_image(4, 255, 0, (1, 1));
        let out = max(&img);
        assert!(out.pixels().all(|p| p.0 == [255, 255, 255]));
    }

    #[test]
    fn pepper_removal_matches_min() {
        let img = gradient_image();
        assert_eq!(pepper_removal(&img), min(&img));
    }

    #[test]
    fn salt_removal_reaches_four_pixels() {
        // Two 5x5 dilations grow a bright pixel by 2 + 2 in every direction.
        let img = spot_image(11, 0, 255, (5, 5));
        let out = salt_removal(&img);
        assert_eq!(luma_at(&out, 1, 1), 255);
        assert_eq!(luma_at(&out, 9, 9), 255);
        assert_eq!(luma_at(&out, 0, 5), 0);
        assert_eq!(luma_at(&out, 5, 10), 0);
    }

    #[test]
    fn sobel_is_or_of_directional_maps() {
        let img = gradient_image();
        let (sx, sy, s) = (sobel_x(&img), sobel_y(&img), sobel(&img));
        for (x, y, p) in s.enumerate_pixels() {
            let expected = sx.get_pixel(x, y).0[0] | sy.get_pixel(x, y).0[0];
            assert_eq!(p.0, [expected; 3], "at ({x},{y})");
        }
    }

    #[test]
    fn prewitt_is_or_of_directional_maps() {
        let img = gradient_image();
        let (px, py, p) = (prewitt_x(&img), prewitt_y(&img), prewitt(&img));
        for (x, y, v) in p.enumerate_pixels() {
            let expected = px.get_pixel(x, y).0[0] | py.get_pixel(x, y).0[0];
            assert_eq!(v.0, [expected; 3], "at ({x},{y})");
        }
    }

    #[test]
    fn edge_filters_are_zero_on_flat_image() {
        let img = spot_image(6, 77, 77, (0, 0));
        for f in [sobel_x, sobel_y, sobel, prewitt_x, prewitt_y, prewitt, laplacian] {
            assert!(f(&img).pixels().all(|p| p.0 == [0, 0, 0]));
        }
    }

    #[test]
    fn laplacian_peaks_on_spot() {
        let img = spot_image(5, 0, 50, (2, 2));
        let out = laplacian(&img);
        assert_eq!(luma_at(&out, 2, 2), 200);
        assert_eq!(luma_at(&out, 2, 1), 50);
        assert_eq!(luma_at(&out, 1, 1), 0);
    }

    #[test]
    fn gradient_saturates_at_255() {
        let img = RgbImage::from_fn(6, 6, |x, _| {
            if x < 3 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) }
        });
        let out = sobel_x(&img);
        assert_eq!(luma_at(&out, 2, 2), 255);
    }

    #[test]
    fn glow_keeps_flat_color_image() {
        let img = RgbImage::from_pixel(12, 12, Rgb([40, 120, 220]));
        let out = glow(&img);
        for p in out.pixels() {
            for (c, exp) in [40i16, 120, 220].into_iter().enumerate() {
                assert!((i16::from(p.0[c]) - exp).abs() <= 1, "got {:?}", p.0);
            }
        }
    }

    #[test]
    fn glow_softens_bright_spot() {
        let img = spot_image(21, 0, 255, (10, 10));
        let out = glow(&img);
        let centre = out.get_pixel(10, 10).0[0];
        assert!(centre < 255 && centre >= 178, "got {centre}");
    }

    #[test]
    fn filters_are_deterministic() {
        let img = gradient_image();
        for kind in FilterKind::ALL {
            assert_eq!(kind.apply(&img), kind.apply(&img), "{kind}");
        }
    }
}
