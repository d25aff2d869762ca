//! Startup configuration read from the environment and an optional JSON file.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub const BACKEND_ENV_VAR: &str = "AUTODEBUGGER_BACKEND";
pub const CONFIG_PATH_ENV_VAR: &str = "AUTODEBUGGER_CONFIG_PATH";
pub const BASE_URL_ENV_VAR: &str = "AUTODEBUGGER_BASE_URL";
pub const LOG_PATH_ENV_VAR: &str = "AUTODEBUGGER_LOG_PATH";

pub const DEFAULT_BACKEND_ID: &str = forge_backend_mock::MOCK_BACKEND_ID;
pub const DEFAULT_LOG_PATH: &str = "autodebugger.log";
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error while reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config JSON at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config at {path}: {message}")]
    Invalid { path: PathBuf, message: String },
}

/// Shape of the file named by `AUTODEBUGGER_CONFIG_PATH`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub request_timeout_sec: Option<u64>,
    #[serde(default)]
    pub operation_timeout_sec: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub backend_id: String,
    pub base_url: Option<String>,
    /// Transport-level timeout for HTTP requests.
    pub request_timeout: Option<Duration>,
    /// Deadline after which the session gives up on an operation.
    pub operation_timeout: Duration,
    pub log_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_id: DEFAULT_BACKEND_ID.to_string(),
            base_url: None,
            request_timeout: None,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from `lookup`, which stands in for the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let file = match value(CONFIG_PATH_ENV_VAR) {
            Some(path) => load_config_file(Path::new(&path))?,
            None => ConfigFile::default(),
        };

        let mut config = Self::default();
        if let Some(backend_id) = value(BACKEND_ENV_VAR) {
            config.backend_id = backend_id.to_ascii_lowercase();
        }
        config.base_url = value(BASE_URL_ENV_VAR).or(file.base_url);
        config.request_timeout = file.request_timeout_sec.map(Duration::from_secs);
        if let Some(seconds) = file.operation_timeout_sec {
            config.operation_timeout = Duration::from_secs(seconds);
        }
        if let Some(log_path) = value(LOG_PATH_ENV_VAR) {
            config.log_path = PathBuf::from(log_path);
        }

        Ok(config)
    }
}

/// Reads and validates a config file. Timeouts must be positive.
pub fn load_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: ConfigFile = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    for (field, value) in [
        ("request_timeout_sec", file.request_timeout_sec),
        ("operation_timeout_sec", file.operation_timeout_sec),
    ] {
        if value == Some(0) {
            return Err(ConfigError::Invalid {
                path: path.to_path_buf(),
                message: format!("{field} must be > 0"),
            });
        }
    }

    if file
        .base_url
        .as_deref()
        .is_some_and(|base_url| base_url.trim().is_empty())
    {
        return Err(ConfigError::Invalid {
            path: path.to_path_buf(),
            message: "base_url must not be blank".to_string(),
        });
    }

    Ok(file)
}
