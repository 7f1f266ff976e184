//! Setup command - save credentials to the settings file

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use capitalist_core::{Config, Signer};

use crate::output::success;

pub fn run(
    config_path: &Path,
    login: &str,
    password: &str,
    private_key: Option<PathBuf>,
    api_url: Option<String>,
) -> Result<()> {
    // File contents only: environment overrides must not end up in the file
    let mut config = Config::load_file(config_path)
        .with_context(|| format!("Failed to read settings from {}", config_path.display()))?;
    config.login = login.to_string();
    config.password = password.to_string();

    if let Some(key_path) = private_key {
        // Fail now rather than on the first batch import
        let pem = std::fs::read(&key_path)
            .with_context(|| format!("Failed to read private key {}", key_path.display()))?;
        Signer::from_pem(&pem).context("Private key is not usable for signing")?;
        config.private_key_path = Some(key_path);
    }
    if let Some(url) = api_url {
        config.api_url = url;
    }

    config.validate()?;
    config.save(config_path)?;

    success(&format!("Settings saved to {}", config_path.display()));
    Ok(())
}
