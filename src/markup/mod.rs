//! Markup module for Page-Loader
//!
//! This module contains the mutable document model and the scanner that
//! finds, classifies and rewrites resource references:
//! - Parsing markup into an indexed node arena
//! - Typed element queries and attribute rewriting
//! - Same-origin classification and download queue construction

mod document;
mod scanner;

pub use document::{Document, ElementData, NodeData, NodeId};
pub use scanner::{
    collect_references, scan_document, AssetReference, DownloadTask, ResourceTag, ScanResult,
};
