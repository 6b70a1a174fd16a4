//! Page-load coordinator - the orchestration of one snapshot
//!
//! A load runs through a fixed sequence of stages:
//!
//! `Start -> PageFetched -> Scanned -> (AssetsDirEnsured -> AssetsFetched)? -> PageWritten -> Done`
//!
//! The asset stages are skipped when the page has no same-origin resources.
//! Any stage may fail; the load then stops and reports the normalized error
//! without retrying or cleaning up.

use super::assets::{download_all, ensure_assets_dir};
use super::fetcher::{build_http_client, fetch_page};
use super::normalize::classify_io_error;
use super::progress::DownloadProgress;
use crate::config::{validate, LoaderConfig};
use crate::markup::{scan_document, Document};
use crate::naming::{assets_dir_name, page_file_name};
use crate::{FsErrorCode, LoaderError, UrlError};
use reqwest::Client;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use url::Url;

/// An immutable description of one load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRequest {
    url: Url,
    output_dir: PathBuf,
}

impl SourceRequest {
    /// Validates the page URL and makes the output directory absolute
    ///
    /// The URL must be an absolute `http` or `https` URL with a host. A
    /// relative output directory is resolved against the current directory;
    /// whether it exists is checked when the load starts.
    pub fn new(page_url: &str, output_dir: &Path) -> Result<Self, LoaderError> {
        let url = Url::parse(page_url).map_err(|e| UrlError::Parse {
            url: page_url.to_string(),
            message: e.to_string(),
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(UrlError::InvalidScheme(url.scheme().to_string()).into());
        }

        if url.host_str().map_or(true, str::is_empty) {
            return Err(UrlError::MissingHost(page_url.to_string()).into());
        }

        let output_dir =
            std::path::absolute(output_dir).map_err(|e| classify_io_error(output_dir, e))?;

        Ok(Self { url, output_dir })
    }

    /// The page URL
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The absolute output directory
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Where the rewritten page is saved
    pub fn page_path(&self) -> PathBuf {
        self.output_dir.join(page_file_name(&self.url))
    }

    /// Where same-origin assets are saved
    pub fn assets_dir(&self) -> PathBuf {
        self.output_dir.join(assets_dir_name(&self.url))
    }
}

/// Result of a successful load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    /// Absolute path of the saved page
    pub page_path: PathBuf,
    /// The assets directory, if any asset was downloaded
    pub assets_dir: Option<PathBuf>,
    /// Saved asset files, in scan order
    pub assets: Vec<PathBuf>,
}

/// Stages of a load, in the order they are reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    /// Nothing done yet
    Start,
    /// The page body was received
    PageFetched,
    /// References were rewritten and download tasks collected
    Scanned,
    /// The assets directory exists
    AssetsDirEnsured,
    /// Every asset was saved
    AssetsFetched,
    /// The rewritten page was saved
    PageWritten,
    /// The load finished successfully
    Done,
}

/// Main loader structure
///
/// Holds the configuration and a reusable HTTP client. One `PageLoader` can
/// run any number of sequential or concurrent loads, as long as they write
/// to different output locations.
#[derive(Clone)]
pub struct PageLoader {
    config: LoaderConfig,
    client: Client,
    progress: Option<Arc<dyn DownloadProgress>>,
}

impl fmt::Debug for PageLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageLoader")
            .field("config", &self.config)
            .field("client", &self.client)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl PageLoader {
    /// Creates a loader with an HTTP client built from `config`
    pub fn new(config: LoaderConfig) -> Result<Self, LoaderError> {
        validate(&config)?;
        let client = build_http_client(&config.http).map_err(|e| LoaderError::Unclassified {
            context: "Failed to build HTTP client".to_string(),
            source: Box::new(e),
        })?;
        Ok(Self {
            config,
            client,
            progress: None,
        })
    }

    /// Creates a loader that sends requests through `client`
    ///
    /// The HTTP section of `config` is ignored in favour of the client's own
    /// settings.
    pub fn with_client(config: LoaderConfig, client: Client) -> Result<Self, LoaderError> {
        validate(&config)?;
        Ok(Self {
            config,
            client,
            progress: None,
        })
    }

    /// Reports asset download progress to `progress`
    pub fn with_progress(mut self, progress: Arc<dyn DownloadProgress>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// The loader configuration
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Downloads `page_url` into `output_dir`
    ///
    /// # Returns
    ///
    /// * `Ok(LoadOutcome)` - The page and all same-origin assets were saved
    /// * `Err(LoaderError)` - The first failure; nothing is rolled back
    pub async fn load(&self, page_url: &str, output_dir: &Path) -> Result<LoadOutcome, LoaderError> {
        let request = SourceRequest::new(page_url, output_dir)?;
        self.run(&request).await
    }

    /// Runs a load for an already validated request
    pub async fn run(&self, request: &SourceRequest) -> Result<LoadOutcome, LoaderError> {
        let mut stage = LoadStage::Start;

        match self.run_stages(request, &mut stage).await {
            Ok(outcome) => {
                tracing::info!("Page saved to: {}", outcome.page_path.display());
                Ok(outcome)
            }
            Err(e) => {
                tracing::debug!("Load of {} failed after {:?}: {}", request.url(), stage, e);
                Err(e)
            }
        }
    }

    async fn run_stages(
        &self,
        request: &SourceRequest,
        stage: &mut LoadStage,
    ) -> Result<LoadOutcome, LoaderError> {
        let page_url = request.url();
        let page_path = request.page_path();
        let assets_dir = request.assets_dir();

        tracing::info!("Loading page: {}", page_url);
        tracing::debug!("Output directory: {}", request.output_dir().display());
        tracing::debug!("Output file: {}", page_path.display());

        check_output_dir(request.output_dir()).await?;

        let body = fetch_page(&self.client, page_url).await?;
        advance(stage, LoadStage::PageFetched);

        let mut document = Document::parse(&body);
        let scan = scan_document(&mut document, page_url, &assets_dir);
        advance(stage, LoadStage::Scanned);

        let (assets_dir, assets) = if scan.tasks.is_empty() {
            (None, Vec::new())
        } else {
            ensure_assets_dir(&assets_dir).await?;
            advance(stage, LoadStage::AssetsDirEnsured);

            let assets = download_all(
                &self.client,
                scan.tasks,
                self.config.downloads.max_concurrent,
                self.progress.as_deref(),
            )
            .await?;
            advance(stage, LoadStage::AssetsFetched);

            (Some(assets_dir), assets)
        };

        let html = document.to_html().map_err(|e| LoaderError::Unclassified {
            context: format!("Failed to serialize {}", page_url),
            source: Box::new(e),
        })?;
        tokio::fs::write(&page_path, html)
            .await
            .map_err(|e| classify_io_error(&page_path, e))?;
        advance(stage, LoadStage::PageWritten);

        advance(stage, LoadStage::Done);
        Ok(LoadOutcome {
            page_path,
            assets_dir,
            assets,
        })
    }
}

fn advance(stage: &mut LoadStage, next: LoadStage) {
    tracing::trace!("Load stage {:?} -> {:?}", stage, next);
    *stage = next;
}

/// Fails with `ENOENT` or `ENOTDIR` unless `dir` is an existing directory
async fn check_output_dir(dir: &Path) -> Result<(), LoaderError> {
    let metadata = tokio::fs::metadata(dir)
        .await
        .map_err(|e| classify_io_error(dir, e))?;

    if !metadata.is_dir() {
        return Err(LoaderError::Filesystem {
            code: FsErrorCode::NotADirectory,
            path: dir.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "not a directory"),
        });
    }

    Ok(())
}
