//! Ordering engine configuration.
//!
//! # Environment Variables
//!
//! All optional:
//! - `DIPPER_BASE_URL` - Upstream origin (default: `https://www.chilis.com`)
//! - `DIPPER_REQUEST_TIMEOUT_SECS` - Per-request timeout in seconds (default: 30)
//! - `DIPPER_USER_AGENT` - `User-Agent` header sent upstream

use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default upstream origin.
pub const DEFAULT_BASE_URL: &str = "https://www.chilis.com";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = concat!("dipper/", env!("CARGO_PKG_VERSION"));

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// How sessions reach the upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderingConfig {
    /// Upstream origin; endpoint paths are joined onto it
    pub base_url: Url,
    /// Upper bound on each HTTP request
    pub request_timeout: Duration,
    /// `User-Agent` header value
    pub user_agent: String,
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl OrderingConfig {
    /// Configuration pointing at `base_url` with default timeout and agent.
    #[must_use]
    pub fn with_base_url(base_url: Url) -> Self {
        Self {
            base_url,
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = match get_optional_env("DIPPER_BASE_URL") {
            Some(raw) => parse_base_url("DIPPER_BASE_URL", &raw)?,
            None => default_base_url(),
        };
        let request_timeout = match get_optional_env("DIPPER_REQUEST_TIMEOUT_SECS") {
            Some(raw) => parse_timeout("DIPPER_REQUEST_TIMEOUT_SECS", &raw)?,
            None => DEFAULT_REQUEST_TIMEOUT,
        };
        let user_agent = get_env_or_default("DIPPER_USER_AGENT", DEFAULT_USER_AGENT);

        Ok(Self {
            base_url,
            request_timeout,
            user_agent,
        })
    }
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid")
}

fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url =
        Url::parse(raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be an http(s) origin".to_string(),
        ));
    }
    Ok(url)
}

fn parse_timeout(key: &str, raw: &str) -> Result<Duration, ConfigError> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be at least 1 second".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}
