//! Naming module for Page-Loader
//!
//! This module turns URLs into the deterministic, filesystem-safe names used
//! for the saved page, its assets directory, and each downloaded asset.

mod derive;
mod format;

// Re-export main functions
pub use derive::{
    asset_file_name, assets_dir_name, file_name_for_asset, page_file_name, url_extension,
};
pub use format::format_name;
