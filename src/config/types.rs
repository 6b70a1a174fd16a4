use serde::Deserialize;

/// Main configuration structure for Page-Loader
///
/// Every section and field has a default, so an empty TOML document is a
/// valid configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoaderConfig {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub downloads: DownloadConfig,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Total time allowed for one request, in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Time allowed to establish a connection, in seconds
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// Asset download configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DownloadConfig {
    /// Maximum number of asset downloads in flight; unbounded when absent
    #[serde(rename = "max-concurrent", default)]
    pub max_concurrent: Option<usize>,
}

fn default_user_agent() -> String {
    format!("page-loader/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}
