//! Page-Loader: a single-page web snapshotter
//!
//! This crate fetches one web page, downloads every same-origin image,
//! stylesheet and script it references, rewrites the markup so those
//! references point at the local copies, and saves the result to disk.

pub mod config;
pub mod loader;
pub mod markup;
pub mod naming;

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for Page-Loader operations
///
/// Every failure that crosses the [`loader::PageLoader`] boundary is one of
/// these variants. Network, HTTP and filesystem causes are normalized by
/// [`loader::classify_request_error`] and [`loader::classify_io_error`].
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("Request failed with status code {status}: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Network error: {source} ({url})")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{code}: {} '{}'", .code.description(), .path.display())]
    Filesystem {
        code: FsErrorCode,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid page URL: {0}")]
    InvalidUrl(#[from] UrlError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{context}: {source}")]
    Unclassified {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl LoaderError {
    /// Returns a stable, machine-readable code for this error
    ///
    /// HTTP failures report the numeric status, network failures report
    /// `ENETWORK`, filesystem failures report their POSIX error name.
    pub fn code(&self) -> String {
        match self {
            Self::HttpStatus { status, .. } => status.to_string(),
            Self::Network { .. } => "ENETWORK".to_string(),
            Self::Filesystem { code, .. } => code.to_string(),
            Self::InvalidUrl(_) => "EINVALIDURL".to_string(),
            Self::Config(_) => "ECONFIG".to_string(),
            Self::Unclassified { .. } => "EUNKNOWN".to_string(),
        }
    }
}

/// Filesystem failure classes surfaced by [`LoaderError::Filesystem`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsErrorCode {
    /// No such file or directory
    NotFound,
    /// Access denied by file permissions
    AccessDenied,
    /// Operation not permitted
    NotPermitted,
    /// A path component is not a directory
    NotADirectory,
    /// The path already exists
    AlreadyExists,
}

impl FsErrorCode {
    /// The POSIX name of this error, e.g. `ENOENT`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "ENOENT",
            Self::AccessDenied => "EACCES",
            Self::NotPermitted => "EPERM",
            Self::NotADirectory => "ENOTDIR",
            Self::AlreadyExists => "EEXIST",
        }
    }

    /// A short human-readable description of this error
    pub fn description(&self) -> &'static str {
        match self {
            Self::NotFound => "no such file or directory",
            Self::AccessDenied | Self::NotPermitted => "permission denied",
            Self::NotADirectory => "not a directory",
            Self::AlreadyExists => "file already exists",
        }
    }
}

impl std::fmt::Display for FsErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("Failed to parse URL '{url}': {message}")]
    Parse { url: String, message: String },

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Result type alias for Page-Loader operations
pub type Result<T> = std::result::Result<T, LoaderError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::LoaderConfig;
pub use loader::{LoadOutcome, PageLoader, SourceRequest};
pub use naming::{asset_file_name, assets_dir_name, format_name, page_file_name};

/// Downloads `page_url` and its same-origin resources into `output_dir`
///
/// Uses the default [`LoaderConfig`]. Returns the absolute path of the saved
/// page file.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> page_loader::Result<()> {
/// let path = page_loader::load("https://ru.hexlet.io/courses", "/tmp").await?;
/// println!("saved to {}", path.display());
/// # Ok(())
/// # }
/// ```
pub async fn load(page_url: &str, output_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let loader = PageLoader::new(LoaderConfig::default())?;
    let outcome = loader.load(page_url, output_dir.as_ref()).await?;
    Ok(outcome.page_path)
}
