//! Configuration for the CenturyLink Cloud client
//!
//! Settings come from an optional YAML file, then environment variables
//! override individual fields.

pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default v2 API root
pub const DEFAULT_ENDPOINT: &str = "https://api.ctl.io/v2";

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_CONFIG_PATH: &str = "CLC_CONFIG_PATH";
pub const ENV_ENDPOINT: &str = "CLC_V2_API_URL";
pub const ENV_USERNAME: &str = "CLC_V2_API_USERNAME";
pub const ENV_PASSWORD: &str = "CLC_V2_API_PASSWD";
pub const ENV_ALIAS: &str = "CLC_ALIAS";
pub const ENV_LOCATION: &str = "CLC_LOCATION";

const CONFIG_CANDIDATES: [&str; 2] = ["clc.yaml", ".clc.yaml"];

/// Client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API root, e.g. `https://api.ctl.io/v2`
    pub endpoint: String,

    pub username: Option<String>,

    pub password: Option<String>,

    /// Account alias used when a call does not name one.
    /// Falls back to the alias returned at login.
    pub alias: Option<String>,

    /// Datacenter used when a call does not name one.
    /// Falls back to the location returned at login.
    pub location: Option<String>,

    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            username: None,
            password: None,
            alias: None,
            location: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Load the config file (if any) and apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = match find_config_file()? {
            Some(path) => {
                tracing::debug!("Loading config from {}", path.display());
                Self::from_file(&path)?
            }
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Parse a YAML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Override fields with any `CLC_*` environment variables that are set
    pub fn apply_env(&mut self) {
        if let Some(endpoint) = env_value(ENV_ENDPOINT) {
            self.endpoint = endpoint;
        }
        if let Some(username) = env_value(ENV_USERNAME) {
            self.username = Some(username);
        }
        if let Some(password) = env_value(ENV_PASSWORD) {
            self.password = Some(password);
        }
        if let Some(alias) = env_value(ENV_ALIAS) {
            self.alias = Some(alias);
        }
        if let Some(location) = env_value(ENV_LOCATION) {
            self.location = Some(location);
        }
    }

    /// Username and password, both required to log in
    pub fn credentials(&self) -> Result<(&str, &str)> {
        let username = self
            .username
            .as_deref()
            .ok_or(ConfigError::MissingCredentials("username"))?;
        let password = self
            .password
            .as_deref()
            .ok_or(ConfigError::MissingCredentials("password"))?;
        Ok((username, password))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Directory holding the global config file (`<config_dir>/clc`)
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("clc"))
        .ok_or(ConfigError::ConfigDirNotFound)
}

/// Locate the config file
///
/// Search order:
/// 1. `CLC_CONFIG_PATH` (direct path)
/// 2. current directory: `clc.yaml`, `.clc.yaml`
/// 3. `~/.config/clc/config.yaml`
///
/// Returns `None` when no file exists; defaults then apply.
pub fn find_config_file() -> Result<Option<PathBuf>> {
    if let Some(config_path) = env_value(ENV_CONFIG_PATH) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
        tracing::warn!("{} points to a missing file: {}", ENV_CONFIG_PATH, path.display());
    }

    let current_dir = std::env::current_dir()?;
    for filename in &CONFIG_CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    if let Ok(config_dir) = get_config_dir() {
        let global_config = config_dir.join("config.yaml");
        if global_config.exists() {
            return Ok(Some(global_config));
        }
    }

    Ok(None)
}
