//! Client configuration.
//!
//! `ClientConfig` is plain data that can be built in code, deserialized from
//! a caller's config file, or read from the environment. It is checked once
//! when a `Client` is constructed and never changes afterwards.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ApiError;

/// Endpoint used when no `api_url` is configured.
pub const DEFAULT_API_URL: &str = "https://api.linode.com/";

/// Environment variable read by `ClientConfig::from_env` for the API key.
pub const API_KEY_ENV: &str = "LINODE_API_KEY";
/// Optional environment variable overriding `DEFAULT_API_URL`.
pub const API_URL_ENV: &str = "LINODE_API_URL";

#[derive(Clone, Default, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_url: Option<String>,
    /// Overall per-request timeout handed to the default transport.
    #[serde(default)]
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Read `LINODE_API_KEY` and, if set, `LINODE_API_URL`.
    pub fn from_env() -> Result<Self, ApiError> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| ApiError::Configuration(format!("{API_KEY_ENV} is not set")))?;
        let api_url = std::env::var(API_URL_ENV).ok().filter(|url| !url.is_empty());
        let config = Self {
            api_key,
            api_url,
            timeout: None,
        };
        config.validate()?;
        Ok(config)
    }

    /// The configured URL, or `DEFAULT_API_URL`.
    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub(crate) fn validate(&self) -> Result<(), ApiError> {
        if self.api_key.trim().is_empty() {
            return Err(ApiError::Configuration("an API key is required".to_string()));
        }
        if self.api_url.as_deref().is_some_and(|url| url.trim().is_empty()) {
            return Err(ApiError::Configuration("api_url must not be empty".to_string()));
        }
        Ok(())
    }
}
