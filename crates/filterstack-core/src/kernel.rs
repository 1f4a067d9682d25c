//! Fixed 3x3 kernels and the sliding-window primitives the filters are
//! built from.
//!
//! Correlation accumulates in `f64` so that derivative responses keep
//! their sign and range until [`magnitude`] folds them back into `u8`.
//! Out-of-image samples are mirrored without repeating the edge sample
//! (`gfedcb|abcdefgh|gfedcba`).

use image::{GrayImage, ImageBuffer, Luma};

/// A 3x3 kernel, indexed `[row][column]`.
pub type Kernel3 = [[f64; 3]; 3];

/// Signed, unclamped per-pixel response of a correlation.
pub type Response = ImageBuffer<Luma<f64>, Vec<f64>>;

/// Sobel first derivative in x (`dx = 1, dy = 0`, aperture 3).
pub const SOBEL_X: Kernel3 = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];

/// Sobel first derivative in y (`dx = 0, dy = 1`, aperture 3).
pub const SOBEL_Y: Kernel3 = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// Prewitt horizontal gradient.
pub const PREWITT_X: Kernel3 = [[-1.0, 0.0, 1.0], [-1.0, 0.0, 1.0], [-1.0, 0.0, 1.0]];

/// Prewitt vertical gradient.
pub const PREWITT_Y: Kernel3 = [[-1.0, -1.0, -1.0], [0.0, 0.0, 0.0], [1.0, 1.0, 1.0]];

/// Four-neighbour discrete Laplacian.
pub const LAPLACIAN: Kernel3 = [[0.0, 1.0, 0.0], [1.0, -4.0, 1.0], [0.0, 1.0, 0.0]];

/// Unnormalized 3x3 box.
pub const BOX: Kernel3 = [[1.0; 3]; 3];

/// Map a possibly out-of-range coordinate back into `0..len` by
/// mirroring about the edge sample without repeating it.
///
/// A single-sample axis always maps to 0.
#[must_use]
pub fn reflect_101(i: i64, len: u32) -> u32 {
    let n = i64::from(len);
    if n <= 1 {
        return 0;
    }
    let period = 2 * (n - 1);
    let m = i.rem_euclid(period);
    let folded = if m < n { m } else { period - m };
    u32::try_from(folded).unwrap_or(0)
}

/// Correlate a grayscale image with a 3x3 kernel.
///
/// The kernel is applied as written (not flipped), centred on each
/// pixel. Output has the input's dimensions.
#[must_use = "returns the kernel response"]
pub fn correlate(image: &GrayImage, kernel: &Kernel3) -> Response {
    let (w, h) = image.dimensions();
    Response::from_fn(w, h, |x, y| {
        let mut acc = 0.0;
        for (ky, row) in kernel.iter().enumerate() {
            let sy = reflect_101(i64::from(y) + offset(ky), h);
            for (kx, &weight) in row.iter().enumerate() {
                if weight == 0.0 {
                    continue;
                }
                let sx = reflect_101(i64::from(x) + offset(kx), w);
                acc += weight * f64::from(image.get_pixel(sx, sy).0[0]);
            }
        }
        Luma([acc])
    })
}

/// Kernel index 0..3 to a signed offset -1..=1.
fn offset(k: usize) -> i64 {
    match k {
        0 => -1,
        1 => 0,
        _ => 1,
    }
}

/// Absolute value of a response, rounded and clamped to `0..=255`.
#[must_use = "returns the 8-bit magnitude map"]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn magnitude(response: &Response) -> GrayImage {
    GrayImage::from_fn(response.width(), response.height(), |x, y| {
        let v = response.get_pixel(x, y).0[0].abs().round().clamp(0.0, 255.0);
        Luma([v as u8])
    })
}

/// Unweighted 3x3 average, rounded to nearest (ties to even).
#[must_use = "returns the averaged image"]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn box_mean(image: &GrayImage) -> GrayImage {
    let sums = correlate(image, &BOX);
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let v = (sums.get_pixel(x, y).0[0] / 9.0)
            .round_ties_even()
            .clamp(0.0, 255.0);
        Luma([v as u8])
    })
}

/// Per-pixel bitwise OR of two equally sized maps.
///
/// Combines the clamped magnitudes of a directional pair (x and y) into
/// one edge map.
#[must_use = "returns the combined map"]
pub fn bitwise_or(a: &GrayImage, b: &GrayImage) -> GrayImage {
    debug_assert_eq!(a.dimensions(), b.dimensions(), "map size mismatch");
    GrayImage::from_fn(a.width(), a.height(), |x, y| {
        Luma([a.get_pixel(x, y).0[0] | b.get_pixel(x, y).0[0]])
    })
}
