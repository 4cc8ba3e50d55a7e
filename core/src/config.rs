//! Client configuration.
//!
//! A [`ClientConfig`] can be assembled in code or read from the
//! environment:
//!
//! | Variable           | Meaning                         | Default                              |
//! |--------------------|---------------------------------|--------------------------------------|
//! | `NPS_API_KEY`      | API key sent as `X-Api-Key`     | required                             |
//! | `NPS_BASE_URL`     | Root every request path joins   | `https://developer.nps.gov/api/v1/`  |
//! | `NPS_TIMEOUT_SECS` | Per-request deadline in seconds | none                                 |

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "https://developer.nps.gov/api/v1/";

pub const ENV_API_KEY: &str = "NPS_API_KEY";
pub const ENV_BASE_URL: &str = "NPS_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "NPS_TIMEOUT_SECS";

/// A string that never appears in `Debug` or `Display` output.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<REDACTED>")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<REDACTED>")
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: SecretString,
    pub base_url: String,
    /// Applied as a deadline to every request built by the client.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<SecretString>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }

    pub fn from_env() -> Result<Self, ApiError> {
        let api_key = std::env::var(ENV_API_KEY).unwrap_or_default();
        let mut config = Self::new(api_key);

        if let Ok(base_url) = std::env::var(ENV_BASE_URL) {
            config.base_url = base_url;
        }
        if let Ok(secs) = std::env::var(ENV_TIMEOUT_SECS) {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|_| ApiError::Config(format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds, got {secs:?}")))?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Checks the key and returns the parsed base URL.
    pub fn validate(&self) -> Result<Url, ApiError> {
        if self.api_key.is_empty() {
            return Err(ApiError::MissingToken);
        }

        let url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::Config(format!("base url {:?} is invalid: {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
            return Err(ApiError::Config(format!(
                "base url {:?} must be an http or https url",
                self.base_url
            )));
        }
        Ok(url)
    }
}
