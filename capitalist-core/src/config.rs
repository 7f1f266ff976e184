//! Configuration management
//!
//! Settings live in a JSON file:
//! ```json
//! {
//!   "login": "my-login",
//!   "password": "...",
//!   "privateKeyPath": "/path/to/key.pem",
//!   "apiUrl": "https://api.capitalist.net/",
//!   "timeoutSecs": 30,
//!   "maxAttempts": 3,
//!   "retryDelayMs": 0
//! }
//! ```
//! Environment variables override the file (see [`Config::load`]).

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::adapters::http::{
    CAPITALIST_API_URL_ENV, CAPITALIST_PRODUCTION_URL, DEFAULT_TIMEOUT_SECS,
};
use crate::domain::result::{Error, Result};
use crate::services::retry::DEFAULT_MAX_ATTEMPTS;

pub const CAPITALIST_LOGIN_ENV: &str = "CAPITALIST_LOGIN";
pub const CAPITALIST_PASSWORD_ENV: &str = "CAPITALIST_PASSWORD";
pub const CAPITALIST_PRIVATE_KEY_ENV: &str = "CAPITALIST_PRIVATE_KEY";

/// Client configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub login: String,
    pub password: String,
    /// PEM private key used to sign batches
    pub private_key_path: Option<PathBuf>,
    pub api_url: String,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            login: String::new(),
            password: String::new(),
            private_key_path: None,
            api_url: CAPITALIST_PRODUCTION_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay_ms: 0,
        }
    }
}

impl Config {
    /// Load config from a settings file
    ///
    /// A missing file yields defaults. Then these variables override:
    /// `CAPITALIST_LOGIN`, `CAPITALIST_PASSWORD`, `CAPITALIST_PRIVATE_KEY`
    /// (path) and `CAPITALIST_API_URL`.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_env(path, |name| std::env::var(name).ok())
    }

    /// Load only what the settings file holds, ignoring the environment
    ///
    /// Use this before [`save`](Self::save) so overrides are not persisted.
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("invalid settings file {}: {}", path.display(), e)))
    }

    fn load_with_env(path: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::load_file(path)?;

        if let Some(login) = env(CAPITALIST_LOGIN_ENV) {
            config.login = login;
        }
        if let Some(password) = env(CAPITALIST_PASSWORD_ENV) {
            config.password = password;
        }
        if let Some(key_path) = env(CAPITALIST_PRIVATE_KEY_ENV) {
            config.private_key_path = Some(PathBuf::from(key_path));
        }
        if let Some(api_url) = env(CAPITALIST_API_URL_ENV) {
            config.api_url = api_url;
        }

        Ok(config)
    }

    /// Save config, creating the parent directory if needed
    ///
    /// The file holds the account password, so on unix it is only readable
    /// by the owner.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;

        #[cfg(unix)]
        {
            use std::io::Write;
            use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

            let mut file = std::fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(path)?;
            // mode() only applies on creation
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
            file.write_all(content.as_bytes())?;
        }

        #[cfg(not(unix))]
        {
            std::fs::write(path, content)?;
        }

        Ok(())
    }

    /// Check that credentials are present
    pub fn validate(&self) -> Result<()> {
        if self.login.trim().is_empty() {
            return Err(Error::Config("login is not set".to_string()));
        }
        if self.password.is_empty() {
            return Err(Error::Config("password is not set".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeoutSecs must be positive".to_string()));
        }
        Ok(())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .field("private_key_path", &self.private_key_path)
            .field("api_url", &self.api_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_attempts", &self.max_attempts)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .finish()
    }
}
