//! filterstack-core: stackable spatial image filters (sans-IO).
//!
//! A user uploads an image, applies filters one after another (each to
//! the previous result), and can reset back to the upload:
//!
//! upload -> decode -> store original;
//! filter -> decode current -> dispatch -> encode -> store processed;
//! reset -> clear processed.
//!
//! This crate has **no I/O dependencies** beyond the OS random source
//! used for session keys. HTTP routing, templating and cookies belong
//! to the caller, which talks to a [`Studio`].

pub mod codec;
pub mod config;
pub mod dispatch;
pub mod filters;
pub mod grayscale;
pub mod kernel;
pub mod store;
pub mod studio;
pub mod types;

pub use codec::EncodedImage;
pub use config::StudioConfig;
pub use dispatch::{Filter, FilterKind, dispatch};
pub use store::{ImageStore, MemoryStore, SessionKey, SessionRecord};
pub use studio::Studio;
pub use types::{FilterError, GrayImage, Notice, RgbImage};
