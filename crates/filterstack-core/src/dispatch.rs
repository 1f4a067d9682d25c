//! Filter selection: map a filter identifier to a library function.
//!
//! This module defines the [`Filter`] trait for pluggable image filters
//! and the [`FilterKind`] enum naming every filter in the library.
//!
//! Identifiers arrive as free-form strings from a form field. Parsing
//! never fails: anything that is not an exact, case-sensitive catalog
//! id selects [`FilterKind::Glow`].

use std::fmt;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::filters;

/// Selects which filter to run.
///
/// Deserializing goes through [`FilterKind::from_id`], so an unknown
/// string selects [`Glow`](Self::Glow) instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum FilterKind {
    /// 3x3 box average.
    Mean,
    /// 3x3 median.
    Median,
    /// 3x3 erosion.
    Min,
    /// 3x3 dilation.
    Max,
    /// 3x3 erosion, same operator as [`Min`](Self::Min).
    PepperRemoval,
    /// 5x5 dilation applied twice.
    SaltRemoval,
    /// Horizontal Sobel magnitude.
    #[serde(rename = "sobelx")]
    SobelX,
    /// Vertical Sobel magnitude.
    #[serde(rename = "sobely")]
    SobelY,
    /// OR of both Sobel magnitudes.
    Sobel,
    /// Horizontal Prewitt magnitude.
    #[serde(rename = "prewittx")]
    PrewittX,
    /// Vertical Prewitt magnitude.
    #[serde(rename = "prewitty")]
    PrewittY,
    /// OR of both Prewitt magnitudes.
    Prewitt,
    /// Laplacian magnitude.
    Laplacian,
    /// Fallback for every identifier not in the catalog.
    #[default]
    #[serde(rename = "default")]
    Glow,
}

impl FilterKind {
    /// Every filter, in catalog order.
    pub const ALL: [Self; 14] = [
        Self::Mean,
        Self::Median,
        Self::Min,
        Self::Max,
        Self::PepperRemoval,
        Self::SaltRemoval,
        Self::SobelX,
        Self::SobelY,
        Self::Sobel,
        Self::PrewittX,
        Self::PrewittY,
        Self::Prewitt,
        Self::Laplacian,
        Self::Glow,
    ];

    /// Resolve a filter identifier.
    ///
    /// Exact, case-sensitive match against [`id`](Self::id). `"glow"`
    /// itself is not a catalog id; it and every other unknown string,
    /// including the empty string, land on [`Glow`](Self::Glow).
    #[must_use]
    pub fn from_id(id: &str) -> Self {
        match id {
            "mean" => Self::Mean,
            "median" => Self::Median,
            "min" => Self::Min,
            "max" => Self::Max,
            "pepper_removal" => Self::PepperRemoval,
            "salt_removal" => Self::SaltRemoval,
            "sobelx" => Self::SobelX,
            "sobely" => Self::SobelY,
            "sobel" => Self::Sobel,
            "prewittx" => Self::PrewittX,
            "prewitty" => Self::PrewittY,
            "prewitt" => Self::Prewitt,
            "laplacian" => Self::Laplacian,
            _ => Self::Glow,
        }
    }

    /// The form identifier of this filter.
    ///
    /// [`Glow`](Self::Glow) has no catalog id and reports `"default"`.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Min => "min",
            Self::Max => "max",
            Self::PepperRemoval => "pepper_removal",
            Self::SaltRemoval => "salt_removal",
            Self::SobelX => "sobelx",
            Self::SobelY => "sobely",
            Self::Sobel => "sobel",
            Self::PrewittX => "prewittx",
            Self::PrewittY => "prewitty",
            Self::Prewitt => "prewitt",
            Self::Laplacian => "laplacian",
            Self::Glow => "default",
        }
    }

    /// Short human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Mean => "Mean (3x3 average)",
            Self::Median => "Median (3x3)",
            Self::Min => "Min / erosion (3x3)",
            Self::Max => "Max / dilation (3x3)",
            Self::PepperRemoval => "Pepper noise removal",
            Self::SaltRemoval => "Salt noise removal",
            Self::SobelX => "Sobel X",
            Self::SobelY => "Sobel Y",
            Self::Sobel => "Sobel (X | Y)",
            Self::PrewittX => "Prewitt X",
            Self::PrewittY => "Prewitt Y",
            Self::Prewitt => "Prewitt (X | Y)",
            Self::Laplacian => "Laplacian",
            Self::Glow => "Glow",
        }
    }
}

impl From<String> for FilterKind {
    fn from(id: String) -> Self {
        Self::from_id(&id)
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Trait for image filters.
///
/// Input: an RGB image. Output: a new RGB image with the same
/// dimensions.
pub trait Filter {
    /// Apply the filter.
    fn apply(&self, image: &RgbImage) -> RgbImage;
}

impl Filter for FilterKind {
    fn apply(&self, image: &RgbImage) -> RgbImage {
        match *self {
            Self::Mean => filters::mean(image),
            Self::Median => filters::median(image),
            Self::Min => filters::min(image),
            Self::Max => filters::max(image),
            Self::PepperRemoval => filters::pepper_removal(image),
            Self::SaltRemoval => filters::salt_removal(image),
            Self::SobelX => filters::sobel_x(image),
            Self::SobelY => filters::sobel_y(image),
            Self::Sobel => filters::sobel(image),
            Self::PrewittX => filters::prewitt_x(image),
            Self::PrewittY => filters::prewitt_y(image),
            Self::Prewitt => filters::prewitt(image),
            Self::Laplacian => filters::laplacian(image),
            Self::Glow => filters::glow(image),
        }
    }
}

/// Resolve `id` and run the selected filter on `image`.
#[must_use = "returns the filtered image"]
pub fn dispatch(id: &str, image: &RgbImage) -> RgbImage {
    let kind = FilterKind::from_id(id);
    tracing::debug!(id, filter = %kind, "dispatching filter");
    kind.apply(image)
}
