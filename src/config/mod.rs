//! Configuration module for Page-Loader
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Every field has a default.
//!
//! # Example
//!
//! ```no_run
//! use page_loader::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("page-loader.toml")).unwrap();
//! println!("Max concurrent downloads: {:?}", config.downloads.max_concurrent);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{DownloadConfig, HttpConfig, LoaderConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
