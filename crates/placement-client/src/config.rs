//! Portal API client configuration.
//!
//! One base URL, a bearer token and transport settings. Defaults target a
//! local development server; override via environment variables or explicit
//! construction.

use std::time::Duration;

use url::Url;
use zeroize::Zeroizing;

use crate::retry::RetryPolicy;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Base URL of the portal API.
pub const ENV_API_URL: &str = "PORTAL_API_URL";
/// Bearer token for the portal API.
pub const ENV_API_TOKEN: &str = "PORTAL_API_TOKEN";
/// Per-request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "PORTAL_TIMEOUT_SECS";
/// Transport retries before giving up.
pub const ENV_MAX_RETRIES: &str = "PORTAL_MAX_RETRIES";

/// Configuration for the portal API.
///
/// Custom `Debug` implementation redacts the `api_token` field.
#[derive(Clone)]
pub struct PortalApiConfig {
    /// Base URL of the portal API. May carry a path prefix
    /// (`https://host/portal`).
    pub base_url: Url,
    /// Bearer token, wiped from memory on drop.
    pub api_token: Zeroizing<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Transport retry behaviour.
    pub retry: RetryPolicy,
}

impl std::fmt::Debug for PortalApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortalApiConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .field("retry", &self.retry)
            .finish()
    }
}

impl PortalApiConfig {
    /// Configuration for `base_url` with default timeout and retry.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidUrl`] if `base_url` does not parse or cannot
    /// carry a path; [`ConfigError::MissingToken`] if `token` is blank.
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self, ConfigError> {
        let token = Zeroizing::new(token.into());
        if token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        Ok(Self {
            base_url: parse_base_url("base_url", base_url)?,
            api_token: token,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry: RetryPolicy::default(),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PORTAL_API_URL` (default: `http://127.0.0.1:8080`)
    /// - `PORTAL_API_TOKEN` (required)
    /// - `PORTAL_TIMEOUT_SECS` (default: 30)
    /// - `PORTAL_MAX_RETRIES` (default: 3)
    ///
    /// # Errors
    ///
    /// See [`PortalApiConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from the `PORTAL_*` variables as resolved by
    /// `lookup`, which returns `None` for unset variables.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingToken`] if `PORTAL_API_TOKEN` is unset or blank,
    /// [`ConfigError::InvalidUrl`] for a bad `PORTAL_API_URL`, and
    /// [`ConfigError::InvalidValue`] for a non-numeric timeout or retry count.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_token = lookup(ENV_API_TOKEN)
            .filter(|t| !t.trim().is_empty())
            .map(Zeroizing::new)
            .ok_or(ConfigError::MissingToken)?;

        let raw_url = lookup(ENV_API_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = parse_base_url(ENV_API_URL, &raw_url)?;

        let mut retry = RetryPolicy::default();
        if let Some(max_retries) = parse_var(&lookup, ENV_MAX_RETRIES)? {
            retry.max_retries = max_retries;
        }

        Ok(Self {
            base_url,
            api_token,
            timeout_secs: parse_var(&lookup, ENV_TIMEOUT_SECS)?.unwrap_or(DEFAULT_TIMEOUT_SECS),
            retry,
        })
    }

    /// Configuration pointing at a local mock server (for testing): short
    /// timeout, no retry delay.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if the localhost URL cannot be parsed.
    pub fn local_mock(port: u16, token: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("localhost", &format!("http://127.0.0.1:{port}"))?,
            api_token: Zeroizing::new(token.to_string()),
            timeout_secs: 5,
            retry: RetryPolicy {
                max_retries: 1,
                base_delay: Duration::from_millis(10),
            },
        })
    }

    /// Builder: override the request timeout.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Builder: override the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
) -> Result<Option<T>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(var.to_string(), raw)),
    }
}

fn parse_base_url(name: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(name.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl(
            name.to_string(),
            "URL cannot carry a path".to_string(),
        ));
    }
    Ok(url)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("an API token is required (set PORTAL_API_TOKEN)")]
    MissingToken,
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid value for {0}: {1:?}")]
    InvalidValue(String, String),
}
