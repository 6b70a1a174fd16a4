//! Markup scanner for same-origin resources
//!
//! This module walks a parsed [`Document`] looking for:
//! - `<img src="...">`
//! - `<link href="...">`
//! - `<script src="...">`
//!
//! Same-origin references are rewritten to point into the page's assets
//! directory and queued as [`DownloadTask`]s. External references are left
//! byte-for-byte untouched.

use super::document::{Document, NodeId};
use crate::naming::file_name_for_asset;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use url::Url;

/// The kinds of elements whose references are considered resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceTag {
    /// `<img src>`
    Image,
    /// `<link href>`, stylesheets and any other linked resource
    Link,
    /// `<script src>`
    Script,
}

impl ResourceTag {
    /// Scan order; it fixes the order of the produced download tasks
    pub const ALL: [ResourceTag; 3] = [Self::Image, Self::Link, Self::Script];

    /// The HTML tag name
    pub fn tag_name(&self) -> &'static str {
        match self {
            Self::Image => "img",
            Self::Link => "link",
            Self::Script => "script",
        }
    }

    /// The attribute holding the reference
    pub fn attribute(&self) -> &'static str {
        match self {
            Self::Image | Self::Script => "src",
            Self::Link => "href",
        }
    }
}

/// A reference found on a matched element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    /// Which element kind carried the reference
    pub tag: ResourceTag,
    /// The element's node in the document
    pub node: NodeId,
    /// The attribute value as found in the markup
    pub original_value: String,
    /// The value resolved against the page URL
    pub resolved_url: Url,
}

impl AssetReference {
    /// Returns true if the reference points at the page's own host
    pub fn is_same_origin(&self, page_url: &Url) -> bool {
        self.resolved_url.host_str() == page_url.host_str()
    }
}

/// One asset to download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    /// Absolute URL of the asset
    pub source_url: Url,
    /// Absolute path the asset body is written to
    pub destination: PathBuf,
}

/// Outcome of scanning a document
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Download tasks in scan order, unique by destination
    pub tasks: Vec<DownloadTask>,
    /// Number of attributes rewritten to local paths
    pub rewritten: usize,
    /// Number of external references left untouched
    pub external: usize,
}

/// Collects every resource reference in the document
///
/// References are grouped by [`ResourceTag::ALL`] order and appear in
/// document order within each group. Elements whose attribute is missing,
/// empty, or cannot be resolved against `page_url` are skipped.
pub fn collect_references(document: &Document, page_url: &Url) -> Vec<AssetReference> {
    let mut references = Vec::new();

    for tag in ResourceTag::ALL {
        for node in document.find_elements(tag.tag_name(), tag.attribute()) {
            let Some(value) = document.attr(node, tag.attribute()) else {
                continue;
            };

            match page_url.join(value) {
                Ok(resolved_url) => references.push(AssetReference {
                    tag,
                    node,
                    original_value: value.to_string(),
                    resolved_url,
                }),
                Err(e) => {
                    tracing::debug!("Skipping unresolvable reference '{}': {}", value, e);
                }
            }
        }
    }

    references
}

/// Rewrites same-origin references and builds the download queue
///
/// Each same-origin attribute becomes `"<assets_dir_name>/<asset file name>"`,
/// always joined with `/`. The page linking to itself is handled like any
/// other same-origin reference.
///
/// A second reference to an already queued URL is rewritten but not queued
/// again. When two different URLs derive the same file name, the first one in
/// scan order is downloaded and the later one is only rewritten.
///
/// # Arguments
///
/// * `document` - The parsed page; attributes are rewritten in place
/// * `page_url` - Absolute URL the page was fetched from
/// * `assets_dir` - Absolute path of the assets directory on disk
pub fn scan_document(document: &mut Document, page_url: &Url, assets_dir: &Path) -> ScanResult {
    let assets_dir_name = crate::naming::assets_dir_name(page_url);
    let mut result = ScanResult::default();
    let mut queued: HashMap<PathBuf, Url> = HashMap::new();

    for reference in collect_references(document, page_url) {
        if !reference.is_same_origin(page_url) {
            tracing::debug!("Skipping external resource: {}", reference.resolved_url);
            result.external += 1;
            continue;
        }

        let file_name = file_name_for_asset(&reference.resolved_url);
        let local_value = format!("{}/{}", assets_dir_name, file_name);
        tracing::debug!(
            "Found local resource: {} -> {}",
            reference.original_value,
            local_value
        );

        document.set_attr(reference.node, reference.tag.attribute(), &local_value);
        result.rewritten += 1;

        let destination = assets_dir.join(&file_name);
        match queued.get(&destination) {
            Some(existing) if *existing == reference.resolved_url => {
                tracing::debug!("Resource {} already queued", reference.resolved_url);
            }
            Some(existing) => {
                tracing::warn!(
                    "Resources {} and {} both map to {}; keeping the first",
                    existing,
                    reference.resolved_url,
                    destination.display()
                );
            }
            None => {
                queued.insert(destination.clone(), reference.resolved_url.clone());
                result.tasks.push(DownloadTask {
                    source_url: reference.resolved_url,
                    destination,
                });
            }
        }
    }

    tracing::debug!(
        "Found {} local resources ({} to download), {} external",
        result.rewritten,
        result.tasks.len(),
        result.external
    );

    result
}
