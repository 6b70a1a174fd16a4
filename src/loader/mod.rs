//! Loader module for fetching pages and their assets
//!
//! This module contains the core loading pipeline, including:
//! - HTTP fetching of the page and its assets
//! - Concurrent asset downloads with a first-failure barrier
//! - Per-asset progress notifications
//! - Normalization of network, HTTP and filesystem errors
//! - Overall load coordination

mod assets;
mod coordinator;
mod fetcher;
mod normalize;
mod progress;

pub use assets::{download_all, ensure_assets_dir};
pub use coordinator::{LoadOutcome, LoadStage, PageLoader, SourceRequest};
pub use fetcher::{build_http_client, download_asset, fetch_page};
pub use normalize::{classify_io_error, classify_request_error, fs_error_code, status_error};
pub use progress::DownloadProgress;
pub use crate::markup::DownloadTask;
