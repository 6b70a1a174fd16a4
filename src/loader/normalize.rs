//! Error normalization
//!
//! Maps the heterogeneous failures of the pipeline onto [`LoaderError`]:
//! - HTTP responses outside 2xx become `HttpStatus`
//! - Requests that got no response become `Network`
//! - `ENOENT`, `EACCES`, `EPERM` and friends become `Filesystem`
//! - Anything else is passed on as `Unclassified`

use crate::{FsErrorCode, LoaderError};
use std::io;
use std::path::Path;

/// POSIX `EPERM`
#[cfg(unix)]
const EPERM: i32 = 1;

/// POSIX `ENOTDIR`
#[cfg(unix)]
const ENOTDIR: i32 = 20;

/// Builds the error for a response with a non-success status
pub fn status_error(url: &str, status: u16) -> LoaderError {
    LoaderError::HttpStatus {
        status,
        url: url.to_string(),
    }
}

/// Classifies a failed HTTP request
///
/// # Arguments
///
/// * `url` - The URL that was requested
/// * `error` - The error returned by the HTTP client
pub fn classify_request_error(url: &str, error: reqwest::Error) -> LoaderError {
    if let Some(status) = error.status() {
        return status_error(url, status.as_u16());
    }

    if error.is_builder() {
        return LoaderError::Unclassified {
            context: format!("Failed to build request for {}", url),
            source: Box::new(error),
        };
    }

    LoaderError::Network {
        url: url.to_string(),
        source: error,
    }
}

/// Classifies a failed filesystem operation on `path`
pub fn classify_io_error(path: &Path, error: io::Error) -> LoaderError {
    match fs_error_code(&error) {
        Some(code) => LoaderError::Filesystem {
            code,
            path: path.to_path_buf(),
            source: error,
        },
        None => LoaderError::Unclassified {
            context: format!("Filesystem operation failed on '{}'", path.display()),
            source: Box::new(error),
        },
    }
}

/// Maps an I/O error onto a POSIX error class, if it has one we surface
pub fn fs_error_code(error: &io::Error) -> Option<FsErrorCode> {
    #[cfg(unix)]
    {
        match error.raw_os_error() {
            Some(EPERM) => return Some(FsErrorCode::NotPermitted),
            Some(ENOTDIR) => return Some(FsErrorCode::NotADirectory),
            _ => {}
        }
    }

    match error.kind() {
        io::ErrorKind::NotFound => Some(FsErrorCode::NotFound),
        io::ErrorKind::PermissionDenied => Some(FsErrorCode::AccessDenied),
        io::ErrorKind::AlreadyExists => Some(FsErrorCode::AlreadyExists),
        _ => None,
    }
}
