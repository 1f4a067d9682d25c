//! Shared types for the filterstack core.

/// Re-export `RgbImage` so downstream crates can hold decoded and
/// filtered images without depending on `image` directly.
pub use image::RgbImage;

/// Re-export `GrayImage` for the single-channel intermediates.
pub use image::GrayImage;

/// Errors that can occur while uploading, filtering, or resetting.
///
/// Every variant except [`Encode`](Self::Encode) and
/// [`KeyGeneration`](Self::KeyGeneration) is a recoverable, user-facing
/// rejection: the stored session state is left untouched and the user
/// may retry. See [`FilterError::user_message`].
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// No file was supplied, or it had an empty filename.
    #[error("no file was supplied")]
    MissingFile,

    /// The filename extension is not in the allowed set.
    #[error("unsupported file extension: {0:?}")]
    UnsupportedExtension(String),

    /// The uploaded bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// The upload exceeds the configured size limit.
    #[error("upload of {size} bytes exceeds the limit of {limit} bytes")]
    UploadTooLarge {
        /// Size of the rejected upload.
        size: usize,
        /// Configured maximum.
        limit: usize,
    },

    /// Failed to decode image bytes.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// A stored payload was not valid base64.
    #[error("stored image payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// A filter or reset was requested before any image was uploaded.
    #[error("no image has been uploaded for this session")]
    NoImage,

    /// PNG encoding of a filtered image failed.
    ///
    /// Not expected for images produced by the filter library or by
    /// decoding; surfaced rather than swallowed when it happens.
    #[error("failed to encode image: {0}")]
    Encode(image::ImageError),

    /// The operating system random source failed while minting a key.
    #[error("failed to generate session key: {0}")]
    KeyGeneration(getrandom::Error),
}

impl FilterError {
    /// The flash message shown to the user for this error.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::MissingFile => "Please choose an image to upload.",
            Self::UnsupportedExtension(_) => "Unsupported file type. Use PNG, JPG, JPEG, or WEBP.",
            Self::EmptyInput | Self::ImageDecode(_) | Self::Base64(_) => {
                "We could not read that image. Try a different file."
            }
            Self::UploadTooLarge { .. } => "That image is too large. Try a smaller file.",
            Self::NoImage => "Upload an image first.",
            Self::Encode(_) | Self::KeyGeneration(_) => {
                "Something went wrong while processing the image."
            }
        }
    }

    /// Whether the error was caused by the user's input rather than an
    /// internal failure.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        !matches!(self, Self::Encode(_) | Self::KeyGeneration(_))
    }
}

/// Success notices reported back to the collaborator after each
/// operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// A new original image was stored.
    Uploaded,
    /// A filter ran and its result became the processed image.
    FilterApplied,
    /// The processed image was cleared.
    Reset,
}

impl Notice {
    /// The flash message for this notice.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Uploaded => "Image uploaded. Choose a filter to see the result.",
            Self::FilterApplied => "Filter applied.",
            Self::Reset => "Reset to original image.",
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}
