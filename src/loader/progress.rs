//! Progress notifications for asset downloads
//!
//! The loader itself never draws anything. A front end that wants to show
//! per-asset progress installs a [`DownloadProgress`] with
//! [`PageLoader::with_progress`](super::PageLoader::with_progress).

use crate::LoaderError;
use url::Url;

/// Receives events while the assets of one page are downloaded
///
/// Every method has an empty default, so implementors only override what
/// they render. Events are delivered from the task that joins the
/// downloads, in completion order.
pub trait DownloadProgress: Send + Sync {
    /// The fan-out is about to start `total` downloads
    fn started(&self, _total: usize) {}

    /// `url` was saved, `bytes` long
    fn asset_done(&self, _url: &Url, _bytes: usize) {}

    /// The first failure was observed; `url` is `None` when the download
    /// task itself could not be joined
    fn asset_failed(&self, _url: Option<&Url>, _error: &LoaderError) {}

    /// Every asset was saved
    fn finished(&self) {}
}
