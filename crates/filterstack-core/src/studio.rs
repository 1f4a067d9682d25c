//! The request-facing workflow: upload, apply filter, reset, view.
//!
//! A [`Studio`] is what the HTTP layer talks to. It owns the upload
//! policy and an [`ImageStore`], and turns each request into codec,
//! dispatch, and store calls. Every error leaves the stored state as
//! it was.

use image::RgbImage;

use crate::codec;
use crate::config::{StudioConfig, extension};
use crate::dispatch::{Filter, FilterKind};
use crate::store::{ImageStore, SessionKey, SessionRecord};
use crate::types::FilterError;

/// Upload/filter/reset workflow over an [`ImageStore`].
#[derive(Debug, Default)]
pub struct Studio<S> {
    store: S,
    config: StudioConfig,
}

impl<S: ImageStore> Studio<S> {
    /// Create a studio with the default upload policy.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_config(store, StudioConfig::default())
    }

    /// Create a studio with an explicit upload policy.
    #[must_use]
    pub const fn with_config(store: S, config: StudioConfig) -> Self {
        Self { store, config }
    }

    /// The backing store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The upload policy.
    #[must_use]
    pub const fn config(&self) -> &StudioConfig {
        &self.config
    }

    /// Store a new original image for the session.
    ///
    /// Checks run in order: filename present, extension allowed, bytes
    /// non-empty, size within limit, bytes decodable. Only after all of
    /// them pass is a session key ensured and the record replaced
    /// (clearing any processed image). Returns the session key, minted
    /// if `key` was `None`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::MissingFile`],
    /// [`FilterError::UnsupportedExtension`], [`FilterError::EmptyInput`],
    /// [`FilterError::UploadTooLarge`] or [`FilterError::ImageDecode`] for
    /// rejected input; [`FilterError::Encode`] or
    /// [`FilterError::KeyGeneration`] for internal failures.
    pub fn upload(
        &self,
        key: Option<SessionKey>,
        filename: &str,
        bytes: &[u8],
    ) -> Result<SessionKey, FilterError> {
        if filename.is_empty() {
            return Err(FilterError::MissingFile);
        }
        if !self.config.is_allowed(filename) {
            let ext = extension(filename).unwrap_or_default().to_owned();
            tracing::warn!(filename, "rejected upload with unsupported extension");
            return Err(FilterError::UnsupportedExtension(ext));
        }
        if let Some(limit) = self.config.max_upload_bytes
            && bytes.len() > limit
        {
            tracing::warn!(size = bytes.len(), limit, "rejected oversized upload");
            return Err(FilterError::UploadTooLarge {
                size: bytes.len(),
                limit,
            });
        }

        let image = codec::decode_upload(bytes).inspect_err(|e| {
            tracing::warn!(filename, error = %e, "could not read uploaded image");
        })?;
        let encoded = codec::encode(&image)?;
        let key = SessionKey::get_or_create(key)?;

        self.store.put_original(&key, encoded);
        tracing::info!(
            width = image.width(),
            height = image.height(),
            "image uploaded"
        );
        Ok(key)
    }

    /// Apply the filter named by `filter_id` to the session's current
    /// image and store the result as the new processed image.
    ///
    /// The current image is the processed one if present, otherwise the
    /// original, so successive calls stack. Unknown identifiers run
    /// the glow filter. Returns the filtered image.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::NoImage`] if the session has no upload.
    /// Returns a decode error if the stored payload is unreadable, or
    /// [`FilterError::Encode`] if the result cannot be encoded.
    pub fn apply_filter(
        &self,
        key: Option<&SessionKey>,
        filter_id: &str,
    ) -> Result<RgbImage, FilterError> {
        self.apply(key, FilterKind::from_id(filter_id))
    }

    /// Apply an already-resolved filter. See [`apply_filter`](Self::apply_filter).
    ///
    /// # Errors
    ///
    /// As for [`apply_filter`](Self::apply_filter).
    pub fn apply(&self, key: Option<&SessionKey>, kind: FilterKind) -> Result<RgbImage, FilterError> {
        let key = key.ok_or(FilterError::NoImage)?;
        let record = self.store.get(key);
        let current = record.current().ok_or(FilterError::NoImage)?;
        let stacked = record.processed.is_some();

        let image = codec::decode(current)?;
        tracing::debug!(filter = %kind, stacked, "applying filter");
        let filtered = kind.apply(&image);
        let encoded = codec::encode(&filtered)?;

        if !self.store.set_processed(key, encoded) {
            return Err(FilterError::NoImage);
        }
        tracing::info!(filter = %kind, "filter applied");
        Ok(filtered)
    }

    /// Discard the processed image, reverting the view to the original.
    ///
    /// Resetting twice is the same as resetting once.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::NoImage`] if the session has no record.
    pub fn reset(&self, key: Option<&SessionKey>) -> Result<(), FilterError> {
        let key = key.ok_or(FilterError::NoImage)?;
        if self.store.clear_processed(key) {
            tracing::info!("reset to original image");
            Ok(())
        } else {
            Err(FilterError::NoImage)
        }
    }

    /// The stored images for the session; empty if there is no key or
    /// no record.
    #[must_use]
    pub fn view(&self, key: Option<&SessionKey>) -> SessionRecord {
        key.map(|k| self.store.get(k)).unwrap_or_default()
    }

    /// Decode the image the session is currently showing: processed if
    /// present, else original.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::NoImage`] if the session has no upload, or a
    /// decode error if the stored payload is unreadable.
    pub fn current_image(&self, key: Option<&SessionKey>) -> Result<RgbImage, FilterError> {
        let record = self.view(key);
        let current = record.current().ok_or(FilterError::NoImage)?;
        codec::decode(current)
    }
}
