//! Image decoding and the lossless text-safe encoding used between
//! requests.
//!
//! Uploads arrive as raw bytes in any format the `image` crate can
//! read (PNG, JPEG, WebP). Everything the core stores is PNG, carried
//! as standard base64 so it can be kept in a string field and embedded
//! directly in a page as a data URI.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageEncoder, RgbImage};
use serde::{Deserialize, Serialize};

use crate::types::FilterError;

/// A PNG image carried as base64 text.
///
/// Produced by [`encode`], consumed by [`decode`]. The string is
/// opaque to everything but this module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedImage(String);

impl EncodedImage {
    /// Wrap a base64 payload produced elsewhere (e.g. read back from an
    /// external store). Validity is checked on [`decode`].
    #[must_use]
    pub const fn from_base64(payload: String) -> Self {
        Self(payload)
    }

    /// The base64 payload.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A `data:` URI suitable for an `<img src>` attribute.
    #[must_use]
    pub fn data_uri(&self) -> String {
        format!("data:image/png;base64,{}", self.0)
    }
}

impl fmt::Display for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decode raw uploaded bytes into an RGB image.
///
/// Any color type the decoder produces (grayscale, RGBA, 16-bit) is
/// converted to 8-bit RGB; alpha is dropped.
///
/// # Errors
///
/// Returns [`FilterError::EmptyInput`] if `bytes` is empty.
/// Returns [`FilterError::ImageDecode`] if the format is unrecognized or
/// the data is corrupt.
pub fn decode_upload(bytes: &[u8]) -> Result<RgbImage, FilterError> {
    if bytes.is_empty() {
        return Err(FilterError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    Ok(img.to_rgb8())
}

/// Encode an RGB image as base64 PNG.
///
/// # Errors
///
/// Returns [`FilterError::Encode`] if PNG encoding fails. This does not
/// happen for well-formed images and is treated as an internal error.
pub fn encode(image: &RgbImage) -> Result<EncodedImage, FilterError> {
    let png = encode_png(image)?;
    Ok(EncodedImage(STANDARD.encode(png)))
}

/// Encode an RGB image as raw PNG bytes.
///
/// # Errors
///
/// Returns [`FilterError::Encode`] if PNG encoding fails.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, FilterError> {
    let mut png = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png);
    encoder
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(FilterError::Encode)?;
    Ok(png)
}

/// Decode a stored base64 PNG back into an RGB image.
///
/// # Errors
///
/// Returns [`FilterError::Base64`] if the payload is not valid base64.
/// Returns [`FilterError::EmptyInput`] or [`FilterError::ImageDecode`] as
/// for [`decode_upload`].
pub fn decode(encoded: &EncodedImage) -> Result<RgbImage, FilterError> {
    let bytes = STANDARD.decode(encoded.as_str())?;
    decode_upload(&bytes)
}
