//! CLI command implementations

pub mod accounts;
pub mod batch;
pub mod fee;
pub mod rates;
pub mod setup;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use capitalist_core::{Capitalist, Config};
use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber
///
/// `RUST_LOG` wins when set; otherwise `--verbose` enables debug output for
/// the client library.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "capitalist_core=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // Logging should never break the app
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Default settings file: ~/.capitalist/settings.json
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".capitalist")
        .join("settings.json")
}

/// Load settings and build a client
pub fn get_client(config_path: &Path) -> Result<Capitalist> {
    let config = Config::load(config_path)
        .with_context(|| format!("Failed to load settings from {}", config_path.display()))?;
    tracing::debug!(path = %config_path.display(), api_url = %config.api_url, "loaded settings");
    build_client(&config)
}

fn build_client(config: &Config) -> Result<Capitalist> {
    Capitalist::from_config(config).context(
        "Failed to initialize client (run 'capitalist setup' or set CAPITALIST_LOGIN/CAPITALIST_PASSWORD)",
    )
}
