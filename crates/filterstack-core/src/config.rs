//! Upload policy for a [`Studio`](crate::Studio).

use serde::{Deserialize, Serialize};

/// Settings governing which uploads a [`Studio`](crate::Studio) accepts.
///
/// Filter parameters are fixed and deliberately absent here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Accepted filename extensions, lowercase, without the dot.
    pub allowed_extensions: Vec<String>,

    /// Largest accepted upload in bytes. `None` means unlimited.
    pub max_upload_bytes: Option<usize>,
}

impl StudioConfig {
    /// Default accepted extensions.
    pub const DEFAULT_EXTENSIONS: [&'static str; 4] = ["png", "jpg", "jpeg", "webp"];

    /// Whether `filename` has an allowed extension.
    ///
    /// The extension is the text after the last `.`, compared
    /// case-insensitively. A name without a `.` is never allowed.
    #[must_use]
    pub fn is_allowed(&self, filename: &str) -> bool {
        extension(filename).is_some_and(|ext| {
            self.allowed_extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(ext))
        })
    }
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: Self::DEFAULT_EXTENSIONS
                .iter()
                .map(|&ext| ext.to_owned())
                .collect(),
            max_upload_bytes: None,
        }
    }
}

/// The text after the last `.` of `filename`, if there is a `.`.
#[must_use]
pub fn extension(filename: &str) -> Option<&str> {
    filename.rsplit_once('.').map(|(_, ext)| ext)
}
