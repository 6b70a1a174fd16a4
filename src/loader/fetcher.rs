//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the loader:
//! - Building the HTTP client from configuration
//! - Fetching the root page as text
//! - Fetching an asset as raw bytes and writing it to disk

use super::normalize::{classify_io_error, classify_request_error, status_error};
use crate::config::HttpConfig;
use crate::markup::DownloadTask;
use crate::LoaderError;
use reqwest::{Client, Response};
use std::time::Duration;
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The HTTP configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use page_loader::config::HttpConfig;
/// use page_loader::loader::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Sends a GET request and rejects non-success responses
async fn get(client: &Client, url: &Url) -> Result<Response, LoaderError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| classify_request_error(url.as_str(), e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(status_error(url.as_str(), status.as_u16()));
    }

    Ok(response)
}

/// Fetches the root page and returns its body as text
pub async fn fetch_page(client: &Client, url: &Url) -> Result<String, LoaderError> {
    tracing::debug!("Fetching page: {}", url);
    let response = get(client, url).await?;
    let status = response.status();

    let body = response
        .text()
        .await
        .map_err(|e| classify_request_error(url.as_str(), e))?;

    tracing::debug!("Page loaded, status: {}, {} bytes", status.as_u16(), body.len());
    Ok(body)
}

/// Downloads one asset and writes the raw body to its destination
///
/// Returns the number of bytes written.
pub async fn download_asset(client: &Client, task: &DownloadTask) -> Result<usize, LoaderError> {
    tracing::debug!("Downloading asset: {}", task.source_url);
    let response = get(client, &task.source_url).await?;

    let body = response
        .bytes()
        .await
        .map_err(|e| classify_request_error(task.source_url.as_str(), e))?;
    tracing::debug!("Asset downloaded, size: {} bytes", body.len());

    tokio::fs::write(&task.destination, &body)
        .await
        .map_err(|e| classify_io_error(&task.destination, e))?;
    tracing::info!("Saved {} -> {}", task.source_url, task.destination.display());

    Ok(body.len())
}
