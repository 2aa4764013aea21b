//! Client configuration loading: backend URL and request timeout.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the client looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/client.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "PHOTOJUDGE_CONFIG_PATH";
/// Environment variable that overrides the configured backend URL.
const API_URL_ENV: &str = "PHOTOJUDGE_API_URL";
/// Backend URL used when nothing else is configured.
const DEFAULT_API_URL: &str = "http://localhost:8000";
/// Timeout applied when the file does not set one; judging a batch can take
/// minutes.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the client.
pub struct ClientConfig {
    api_url: String,
    request_timeout: Duration,
}

impl ClientConfig {
    /// Load the client configuration from disk, falling back to built-in
    /// defaults, then apply environment overrides.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let mut config = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        api_url = %config.api_url,
                        "loaded client config"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        if let Some(url) = env::var(API_URL_ENV).ok().filter(|url| !url.is_empty()) {
            config.api_url = url;
        }
        config.api_url = config.api_url.trim_end_matches('/').to_string();
        config
    }

    /// Backend base URL, without a trailing slash.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Timeout applied to every backend request.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    api_url: Option<String>,
    request_timeout_secs: Option<u64>,
}

impl From<RawConfig> for ClientConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = Self::default();
        Self {
            api_url: value.api_url.unwrap_or(defaults.api_url),
            request_timeout: value
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
