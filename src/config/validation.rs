use crate::config::types::{DownloadConfig, HttpConfig, LoaderConfig};
use crate::ConfigError;

/// Upper bound for both request timeouts, in seconds
const MAX_TIMEOUT_SECS: u64 = 600;

/// Validates the entire configuration
pub fn validate(config: &LoaderConfig) -> Result<(), ConfigError> {
    validate_http_config(&config.http)?;
    validate_download_config(&config.downloads)?;
    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    validate_timeout("timeout_secs", config.timeout_secs)?;
    validate_timeout("connect_timeout_secs", config.connect_timeout_secs)?;

    Ok(())
}

fn validate_timeout(name: &str, value: u64) -> Result<(), ConfigError> {
    if value < 1 || value > MAX_TIMEOUT_SECS {
        return Err(ConfigError::Validation(format!(
            "{} must be between 1 and {}, got {}",
            name, MAX_TIMEOUT_SECS, value
        )));
    }
    Ok(())
}

/// Validates download configuration
fn validate_download_config(config: &DownloadConfig) -> Result<(), ConfigError> {
    if config.max_concurrent == Some(0) {
        return Err(ConfigError::Validation(
            "max_concurrent must be >= 1 when set".to_string(),
        ));
    }
    Ok(())
}
