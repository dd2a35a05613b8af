//! # LottiX
//!
//! Discover, preview, download and lightly edit Lottie animations.
//!
//! The document model lives in [`lottie_data`] and the edit engine in [`lottie_editor`].
//! This crate adds what sits around them: user settings, the list of discovered
//! animations, and download preparation.

pub mod catalog;
pub mod download;
pub mod settings;

pub use catalog::{Catalog, FoundAnimation};
pub use download::{prepare_download, DownloadError};
pub use settings::{Settings, SettingsError};

pub use lottie_data;
pub use lottie_editor;
