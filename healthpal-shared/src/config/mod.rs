//! # Configuration
//!
//! Client configuration: where the auth API lives, where session data is
//! kept between runs, and how chatty the logs are.

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Name of the persisted session entry.
pub const DEFAULT_STORAGE_KEY: &str = "ai-healthpal-auth";
/// Base URL of the auth API when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/";

const ENV_API_URL: &str = "HEALTHPAL_API_URL";
const ENV_LOG_LEVEL: &str = "HEALTHPAL_LOG_LEVEL";
const ENV_SESSION_DIR: &str = "HEALTHPAL_SESSION_DIR";
const ENV_TIMEOUT_SECS: &str = "HEALTHPAL_TIMEOUT_SECS";

const COOKIE_FILE_NAME: &str = "session.cookies";

/// Errors raised while resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("unsupported configuration format for {0}; use yaml, json or toml")]
    UnsupportedFormat(PathBuf),

    #[error("invalid value for {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

/// The client configuration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the auth API; endpoints are resolved under `api/auth/`.
    pub api_base_url: Url,

    /// Name of the persisted session entry.
    pub storage_key: String,

    /// Directory holding the session entry and the cookie jar.
    pub session_dir: PathBuf,

    /// Default `tracing` filter directive when `RUST_LOG` is unset.
    pub log_level: String,

    /// Per-request timeout. `None` leaves it to the transport.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ClientConfig {
    /// Generates a default configuration.
    ///
    /// # Panics
    /// Never: the default base URL is a valid constant.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            api_base_url: Url::parse(DEFAULT_API_BASE_URL).expect("default API URL is valid"),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            session_dir: default_session_dir(),
            log_level: "warn".to_string(),
            request_timeout_secs: None,
        }
    }

    /// Loads the configuration from a file, environment variables, or defaults.
    ///
    /// Precedence, lowest first: defaults, file, environment (only for
    /// values the file left at their default), `api_url_override`.
    ///
    /// # Errors
    /// Returns an error when the file cannot be read or parsed, an
    /// environment variable holds an invalid value, or the result fails
    /// [`ClientConfig::validate`].
    pub fn load_config(
        config_path: Option<&Path>,
        api_url_override: Option<Url>,
    ) -> Result<Self, ConfigError> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => Self::with_defaults(),
        };

        config.apply_env_overrides()?;

        if let Some(url) = api_url_override {
            config.api_base_url = url;
        }

        config.api_base_url = normalize_base(config.api_base_url);
        config.validate()?;
        debug!(api = %config.api_base_url, session_dir = %config.session_dir.display(), "configuration resolved");
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let parse_error = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => {
                serde_yml::from_str(&content).map_err(|err| parse_error(err.to_string()))
            }
            Some("json") => {
                serde_json::from_str(&content).map_err(|err| parse_error(err.to_string()))
            }
            Some("toml") => toml::from_str(&content).map_err(|err| parse_error(err.to_string())),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        let defaults = Self::with_defaults();

        if self.api_base_url == defaults.api_base_url {
            if let Ok(value) = env::var(ENV_API_URL) {
                self.api_base_url = Url::parse(&value).map_err(|err| ConfigError::Invalid {
                    field: ENV_API_URL,
                    message: err.to_string(),
                })?;
            }
        }
        if self.log_level == defaults.log_level {
            if let Ok(value) = env::var(ENV_LOG_LEVEL) {
                self.log_level = value;
            }
        }
        if self.session_dir == defaults.session_dir {
            if let Ok(value) = env::var(ENV_SESSION_DIR) {
                self.session_dir = PathBuf::from(value);
            }
        }
        if self.request_timeout_secs.is_none() {
            if let Ok(value) = env::var(ENV_TIMEOUT_SECS) {
                let secs = value.parse().map_err(|_| ConfigError::Invalid {
                    field: ENV_TIMEOUT_SECS,
                    message: format!("`{value}` is not a whole number of seconds"),
                })?;
                self.request_timeout_secs = Some(secs);
            }
        }
        Ok(())
    }

    /// Check the configuration for values the client cannot work with.
    ///
    /// # Errors
    /// Returns the first invalid field found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.api_base_url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                field: "api_base_url",
                message: format!("unsupported scheme `{}`", self.api_base_url.scheme()),
            });
        }
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "storage_key",
                message: "must not be empty".to_string(),
            });
        }
        if self.request_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid {
                field: "request_timeout_secs",
                message: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Base URL with a trailing slash, ready for joining relative paths.
    #[must_use]
    pub fn api_base(&self) -> Url {
        normalize_base(self.api_base_url.clone())
    }

    /// Resolve an auth endpoint, e.g. `endpoint("login")` → `<base>/api/auth/login`.
    ///
    /// # Errors
    /// Returns an error if the joined URL is not valid.
    pub fn endpoint(&self, name: &str) -> Result<Url, ConfigError> {
        self.api_base()
            .join(&format!("api/auth/{}", name.trim_start_matches('/')))
            .map_err(|err| ConfigError::Invalid {
                field: "api_base_url",
                message: err.to_string(),
            })
    }

    /// Per-request timeout, if configured.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Path of the cookie jar kept alongside the session entry.
    #[must_use]
    pub fn cookie_path(&self) -> PathBuf {
        self.session_dir.join(COOKIE_FILE_NAME)
    }
}

/// `Url::join` drops the last path segment unless the base ends in `/`.
fn normalize_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn default_session_dir() -> PathBuf {
    BaseDirs::new().map_or_else(
        || PathBuf::from(".healthpal"),
        |dirs| dirs.config_dir().join("healthpal"),
    )
}
