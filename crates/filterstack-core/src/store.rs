//! Per-session image state.
//!
//! Each session holds an `original` upload and an optional `processed`
//! result, both as [`EncodedImage`]s. The [`ImageStore`] trait is the
//! seam for swapping the in-process [`MemoryStore`] for an external
//! cache or database.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

use crate::codec::EncodedImage;
use crate::types::FilterError;

/// Number of random bytes in a freshly minted [`SessionKey`].
pub const KEY_BYTES: usize = 16;

/// Opaque, unguessable token naming one user's [`SessionRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionKey(String);

impl SessionKey {
    /// Mint a new key from the operating system's random source.
    ///
    /// The token is [`KEY_BYTES`] random bytes in URL-safe base64
    /// without padding, so it can travel in a cookie unescaped.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::KeyGeneration`] if the random source fails.
    pub fn generate() -> Result<Self, FilterError> {
        let mut bytes = [0u8; KEY_BYTES];
        getrandom::fill(&mut bytes).map_err(FilterError::KeyGeneration)?;
        Ok(Self(URL_SAFE_NO_PAD.encode(bytes)))
    }

    /// Return `existing` if present, otherwise mint a new key.
    ///
    /// Idempotent within a session: the collaborator passes back the
    /// key it stored after the first call.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::KeyGeneration`] if a key had to be minted
    /// and the random source failed.
    pub fn get_or_create(existing: Option<Self>) -> Result<Self, FilterError> {
        match existing {
            Some(key) => Ok(key),
            None => {
                let key = Self::generate()?;
                tracing::debug!("minted new session key");
                Ok(key)
            }
        }
    }

    /// Wrap a token received from the client (e.g. a cookie value).
    #[must_use]
    pub fn from_token(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The token text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The images stored for one session.
///
/// Serializes as `{"original": <base64 or null>, "processed": <base64
/// or null>}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// The most recent upload.
    pub original: Option<EncodedImage>,
    /// The result of the most recent filter, if any since the last
    /// upload or reset.
    pub processed: Option<EncodedImage>,
}

impl SessionRecord {
    /// A record holding a fresh upload and no processed image.
    #[must_use]
    pub const fn with_original(original: EncodedImage) -> Self {
        Self {
            original: Some(original),
            processed: None,
        }
    }

    /// Returns `true` if nothing has been uploaded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.original.is_none()
    }

    /// The image the next filter should run on: `processed` if present,
    /// otherwise `original`.
    #[must_use]
    pub fn current(&self) -> Option<&EncodedImage> {
        self.processed.as_ref().or(self.original.as_ref())
    }
}

/// Storage for session records.
///
/// Implementations must be shareable across request handlers. No
/// operation fails for an unknown key: reads yield an empty record and
/// writes that need an existing record report `false`.
pub trait ImageStore: Send + Sync {
    /// The record for `key`, or an empty record.
    fn get(&self, key: &SessionKey) -> SessionRecord;

    /// Replace the record for `key` with a new original and no
    /// processed image.
    fn put_original(&self, key: &SessionKey, original: EncodedImage);

    /// Overwrite the processed image.
    ///
    /// Returns `false` and changes nothing if `key` has no original.
    fn set_processed(&self, key: &SessionKey, processed: EncodedImage) -> bool;

    /// Clear the processed image.
    ///
    /// Returns `false` if `key` has no record. Clearing an already
    /// empty `processed` is a successful no-op.
    fn clear_processed(&self, key: &SessionKey) -> bool;
}

impl<T: ImageStore + ?Sized> ImageStore for Arc<T> {
    fn get(&self, key: &SessionKey) -> SessionRecord {
        (**self).get(key)
    }

    fn put_original(&self, key: &SessionKey, original: EncodedImage) {
        (**self).put_original(key, original);
    }

    fn set_processed(&self, key: &SessionKey, processed: EncodedImage) -> bool {
        (**self).set_processed(key, processed)
    }

    fn clear_processed(&self, key: &SessionKey) -> bool {
        (**self).clear_processed(key)
    }
}

/// In-process [`ImageStore`] backed by a mutex-guarded map.
///
/// Records live until the store is dropped; there is no eviction.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<SessionKey, SessionRecord>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions with a record.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if no session has a record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<SessionKey, SessionRecord>> {
        // Every critical section is a single map operation.
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ImageStore for MemoryStore {
    fn get(&self, key: &SessionKey) -> SessionRecord {
        self.lock().get(key).cloned().unwrap_or_default()
    }

    fn put_original(&self, key: &SessionKey, original: EncodedImage) {
        self.lock()
            .insert(key.clone(), SessionRecord::with_original(original));
        tracing::debug!("stored original");
    }

    fn set_processed(&self, key: &SessionKey, processed: EncodedImage) -> bool {
        match self.lock().get_mut(key) {
            Some(record) if record.original.is_some() => {
                record.processed = Some(processed);
                true
            }
            _ => false,
        }
    }

    fn clear_processed(&self, key: &SessionKey) -> bool {
        self.lock().get_mut(key).is_some_and(|record| {
            record.processed = None;
            true
        })
    }
}
