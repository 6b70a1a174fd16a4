//! Page-Loader main entry point
//!
//! This is the command-line interface for the Page-Loader web snapshotter.

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use page_loader::config::{load_config, LoaderConfig};
use page_loader::loader::DownloadProgress;
use page_loader::{LoaderError, PageLoader};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Page-Loader: save a web page with its local resources
///
/// Downloads the page at URL, stores every image, stylesheet and script it
/// loads from the same host next to it, and rewrites the page to use the
/// local copies.
#[derive(Parser, Debug)]
#[command(name = "page-loader")]
#[command(version)]
#[command(about = "Saves a web page and its local resources", long_about = None)]
struct Cli {
    /// Absolute URL of the page to download
    #[arg(value_name = "URL")]
    url: String,

    /// Output directory (defaults to the current directory)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum number of simultaneous asset downloads
    #[arg(short = 'j', long, value_name = "N")]
    concurrency: Option<usize>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output, including the progress display
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(path) => {
            println!("Page was successfully downloaded into '{}'", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("page_loader=info,warn"),
            1 => EnvFilter::new("page_loader=debug,info"),
            2 => EnvFilter::new("page_loader=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Resolves CLI defaults and runs one load
async fn run(cli: Cli) -> anyhow::Result<PathBuf> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::debug!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => LoaderConfig::default(),
    };

    if let Some(concurrency) = cli.concurrency {
        config.downloads.max_concurrent = Some(concurrency);
    }

    let output_dir = match cli.output {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to read the current directory")?,
    };

    let mut loader = PageLoader::new(config)?;
    if !cli.quiet {
        loader = loader.with_progress(Arc::new(AssetProgressBar::new()));
    }
    tracing::debug!(
        "Concurrency limit: {:?}",
        loader.config().downloads.max_concurrent
    );

    let outcome = loader.load(&cli.url, &output_dir).await?;

    if let Some(assets_dir) = &outcome.assets_dir {
        tracing::info!(
            "{} resources saved to {}",
            outcome.assets.len(),
            assets_dir.display()
        );
    }

    Ok(outcome.page_path)
}

/// Renders asset downloads as a progress bar on stderr
///
/// Each saved asset is printed above the bar as it completes.
struct AssetProgressBar {
    bar: ProgressBar,
}

impl AssetProgressBar {
    fn new() -> Self {
        let style = ProgressStyle::default_bar()
            .template("{spinner} [{bar:40.cyan/blue}] {pos}/{len} assets {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());

        let bar = ProgressBar::hidden();
        bar.set_style(style);
        Self { bar }
    }
}

impl DownloadProgress for AssetProgressBar {
    fn started(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_draw_target(ProgressDrawTarget::stderr());
    }

    fn asset_done(&self, url: &Url, _bytes: usize) {
        self.bar.println(format!("  \u{2714} {}", url));
        self.bar.inc(1);
    }

    fn asset_failed(&self, url: Option<&Url>, error: &LoaderError) {
        if let Some(url) = url {
            self.bar.println(format!("  \u{2716} {}", url));
        }
        self.bar.abandon_with_message(error.code());
    }

    fn finished(&self) {
        self.bar.finish_and_clear();
    }
}
