//! Runtime configuration for the data layer.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::util::{is_http_url, normalize_text_option};

/// Default API base URL when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

/// Availability probes race against this timeout so a dead remote never
/// hangs the initial load.
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 4;

/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "PINBOARD_API_URL";

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Remote API base URL, normalized (http(s) scheme, no trailing slash).
    pub api_url: String,
    /// Directory holding the local store slots.
    pub data_dir: PathBuf,
    /// Timeout applied to the availability probe only.
    pub probe_timeout: Duration,
}

impl Config {
    /// Build a configuration for the given API URL and data directory.
    pub fn new(api_url: impl AsRef<str>, data_dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            api_url: normalize_api_url(api_url.as_ref())?,
            data_dir: data_dir.into(),
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
        })
    }

    /// Build a configuration from the environment, falling back to the
    /// default API URL and the given data directory.
    pub fn from_env(default_data_dir: impl Into<PathBuf>) -> Result<Self> {
        let api_url = normalize_text_option(std::env::var(API_URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self::new(api_url, default_data_dir)
    }

    #[must_use]
    pub const fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }
}

/// Normalize an API base URL: require an http(s) scheme, strip any
/// trailing slash.
pub fn normalize_api_url(url: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(Error::InvalidInput("API URL must not be empty".to_string()));
    }
    if !is_http_url(trimmed) {
        return Err(Error::InvalidInput(
            "API URL must include http:// or https://".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}
