//! Concurrent asset downloads
//!
//! All download tasks are started at once (or up to a configured limit) and
//! joined behind a single barrier:
//! - Success once every task has written its file
//! - Failure as soon as any task fails; the remaining tasks are aborted
//!
//! Files written before a failure stay on disk.

use super::fetcher::download_asset;
use super::normalize::classify_io_error;
use super::progress::DownloadProgress;
use crate::markup::DownloadTask;
use crate::{FsErrorCode, LoaderError};
use reqwest::Client;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Creates the assets directory unless it already exists
///
/// The parent directory is never created: a missing output directory is
/// reported as `ENOENT`.
pub async fn ensure_assets_dir(path: &Path) -> Result<(), LoaderError> {
    tracing::debug!("Creating assets directory: {}", path.display());

    match tokio::fs::create_dir(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            let metadata = tokio::fs::metadata(path)
                .await
                .map_err(|e| classify_io_error(path, e))?;
            if metadata.is_dir() {
                Ok(())
            } else {
                Err(LoaderError::Filesystem {
                    code: FsErrorCode::AlreadyExists,
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        }
        Err(e) => Err(classify_io_error(path, e)),
    }
}

/// Downloads every task concurrently
///
/// # Arguments
///
/// * `client` - The HTTP client shared by all downloads
/// * `tasks` - Tasks with distinct destinations
/// * `max_concurrent` - Upper bound on in-flight downloads; `None` starts
///   every task immediately
/// * `progress` - Optional receiver of per-asset completion events
///
/// # Returns
///
/// * `Ok(Vec<PathBuf>)` - Written files, in task order
/// * `Err(LoaderError)` - The first failure observed
pub async fn download_all(
    client: &Client,
    tasks: Vec<DownloadTask>,
    max_concurrent: Option<usize>,
    progress: Option<&dyn DownloadProgress>,
) -> Result<Vec<PathBuf>, LoaderError> {
    let semaphore = max_concurrent.map(|limit| Arc::new(Semaphore::new(limit.max(1))));
    let destinations: Vec<PathBuf> = tasks.iter().map(|t| t.destination.clone()).collect();
    let sources: Vec<Url> = tasks.iter().map(|t| t.source_url.clone()).collect();
    let mut join_set = JoinSet::new();

    tracing::info!("Downloading {} assets", tasks.len());
    if let Some(progress) = progress {
        progress.started(tasks.len());
    }

    for (index, task) in tasks.into_iter().enumerate() {
        let client = client.clone();
        let semaphore = semaphore.clone();

        join_set.spawn(async move { (index, fetch_one(client, task, semaphore).await) });
    }

    while let Some(joined) = join_set.join_next().await {
        let (source, result) = match joined {
            Ok((index, result)) => (sources.get(index), result),
            Err(e) => (
                None,
                Err(LoaderError::Unclassified {
                    context: "Asset download task failed".to_string(),
                    source: Box::new(e),
                }),
            ),
        };

        match result {
            Ok(bytes) => {
                if let (Some(progress), Some(url)) = (progress, source) {
                    progress.asset_done(url, bytes);
                }
            }
            Err(e) => {
                tracing::debug!(
                    "Asset download failed, aborting {} remaining downloads",
                    join_set.len()
                );
                join_set.abort_all();
                if let Some(progress) = progress {
                    progress.asset_failed(source, &e);
                }
                return Err(e);
            }
        }
    }

    tracing::debug!("All assets downloaded");
    if let Some(progress) = progress {
        progress.finished();
    }
    Ok(destinations)
}

/// Waits for a permit, if the fan-out is bounded, then downloads `task`
async fn fetch_one(
    client: Client,
    task: DownloadTask,
    semaphore: Option<Arc<Semaphore>>,
) -> Result<usize, LoaderError> {
    let _permit = match semaphore {
        Some(semaphore) => Some(semaphore.acquire_owned().await.map_err(|e| {
            LoaderError::Unclassified {
                context: format!("Download of {} was not scheduled", task.source_url),
                source: Box::new(e),
            }
        })?),
        None => None,
    };

    download_asset(&client, &task).await
}
