use super::format::format_name;
use crate::{UrlError, UrlResult};
use url::Url;

/// Suffix of the saved page file and of extensionless assets
const HTML_SUFFIX: &str = ".html";

/// Suffix of the sibling directory that holds a page's assets
const ASSETS_DIR_SUFFIX: &str = "_files";

/// The `host + path` string every derived name is formatted from
///
/// Query strings and fragments are never part of it. Paths are taken as the
/// `url` crate serializes them (percent-encoded, `/` for an empty path).
fn host_and_path(url: &Url) -> String {
    format!("{}{}", url.host_str().unwrap_or_default(), url.path())
}

/// Computes the file name of the saved page
///
/// # Examples
///
/// ```
/// use url::Url;
/// use page_loader::naming::page_file_name;
///
/// let url = Url::parse("https://ru.hexlet.io/courses").unwrap();
/// assert_eq!(page_file_name(&url), "ru-hexlet-io-courses.html");
/// ```
pub fn page_file_name(url: &Url) -> String {
    format!("{}{}", format_name(&host_and_path(url)), HTML_SUFFIX)
}

/// Computes the name of the assets directory that sits next to the page file
///
/// # Examples
///
/// ```
/// use url::Url;
/// use page_loader::naming::assets_dir_name;
///
/// let url = Url::parse("https://ru.hexlet.io/courses").unwrap();
/// assert_eq!(assets_dir_name(&url), "ru-hexlet-io-courses_files");
/// ```
pub fn assets_dir_name(url: &Url) -> String {
    format!("{}{}", format_name(&host_and_path(url)), ASSETS_DIR_SUFFIX)
}

/// Returns the file extension of a URL's path, including the leading dot
///
/// The extension is taken from the last non-empty path segment (trailing
/// slashes are skipped): the text from its final `.` to the end. A segment
/// that starts with its only dot (`.hidden`) and the segment `..` have no
/// extension. A segment ending in `.` has the extension `.`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use page_loader::naming::url_extension;
///
/// let url = Url::parse("https://example.com/a/b/runtime.js?v=2").unwrap();
/// assert_eq!(url_extension(&url), Some(".js"));
///
/// let url = Url::parse("https://example.com/courses").unwrap();
/// assert_eq!(url_extension(&url), None);
/// ```
pub fn url_extension(url: &Url) -> Option<&str> {
    let trimmed = url.path().trim_end_matches('/');
    let segment = trimmed.rsplit('/').next().unwrap_or(trimmed);

    match segment.rfind('.') {
        Some(0) | None => None,
        Some(_) if segment == ".." => None,
        Some(dot) => Some(&segment[dot..]),
    }
}

/// Computes the local file name for an already resolved asset URL
///
/// Assets whose path carries an extension keep it verbatim after the
/// formatted `host + path`, with as many bytes cut from the end of that
/// string as the extension is long; everything else is saved as `.html`.
pub fn file_name_for_asset(asset_url: &Url) -> String {
    let full = host_and_path(asset_url);

    match url_extension(asset_url) {
        Some(ext) => {
            let stem = full.get(..full.len() - ext.len()).unwrap_or(&full);
            format!("{}{}", format_name(stem), ext)
        }
        None => format!("{}{}", format_name(&full), HTML_SUFFIX),
    }
}

/// Resolves `reference` against `base_url` and computes its local file name
///
/// # Examples
///
/// ```
/// use url::Url;
/// use page_loader::naming::asset_file_name;
///
/// let base = Url::parse("https://ru.hexlet.io/courses").unwrap();
/// assert_eq!(
///     asset_file_name(&base, "/assets/professions/nodejs.png").unwrap(),
///     "ru-hexlet-io-assets-professions-nodejs.png"
/// );
/// ```
pub fn asset_file_name(base_url: &Url, reference: &str) -> UrlResult<String> {
    let resolved = base_url.join(reference).map_err(|e| UrlError::Parse {
        url: reference.to_string(),
        message: e.to_string(),
    })?;

    Ok(file_name_for_asset(&resolved))
}
