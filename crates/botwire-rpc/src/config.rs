//! Client configuration.
//!
//! Loaded from `<config dir>/botwire/config.json` (or an explicit path). A
//! missing file yields defaults; `BOTWIRE_TOKEN` overrides the token.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::transport::{DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS, TransportConfig};

pub const TOKEN_ENV: &str = "BOTWIRE_TOKEN";

const KNOWN_KEYS: [&str; 3] = ["token", "apiUrl", "timeoutSecs"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("No bot token configured (set \"token\" in the config file or BOTWIRE_TOKEN)")]
    MissingToken,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token: None,
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Config {
    /// `~/.config/botwire/config.json` or the platform equivalent.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "botwire").map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load config from file. A missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid JSON.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        warn_unknown_fields(&content, &path.display().to_string());
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Replace the token when `token` is set.
    #[must_use]
    pub fn with_token_override(mut self, token: Option<String>) -> Self {
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            self.token = Some(token);
        }
        self
    }

    /// Apply `BOTWIRE_TOKEN` from the environment.
    #[must_use]
    pub fn apply_env(self) -> Self {
        self.with_token_override(std::env::var(TOKEN_ENV).ok())
    }

    /// Settings for an HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingToken` if no token is configured.
    pub fn transport_config(&self) -> Result<TransportConfig, ConfigError> {
        let token = self.token.clone().ok_or(ConfigError::MissingToken)?;
        Ok(TransportConfig::new(token)
            .with_api_url(self.api_url.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs)))
    }
}

/// Validate JSON config and warn about unknown fields.
pub fn warn_unknown_fields(content: &str, config_name: &str) {
    let Ok(value) = serde_json::from_str::<Value>(content) else {
        return;
    };

    for key in find_unknown_keys(&value) {
        warn!("Unknown config field in {config_name}: {key}");
    }
}

fn find_unknown_keys(value: &Value) -> Vec<String> {
    let Value::Object(obj) = value else {
        return Vec::new();
    };

    let known: HashSet<&str> = KNOWN_KEYS.into_iter().collect();
    obj.keys()
        .filter(|key| !known.contains(key.as_str()))
        .cloned()
        .collect()
}
