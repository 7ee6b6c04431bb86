//! Client configuration.
//!
//! Reads config from env vars:
//!   PUBLIC_API_URL base URL of the roast service (default: http://127.0.0.1:8001)

use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::api::ROAST_PATH;

pub const API_URL_VAR: &str = "PUBLIC_API_URL";
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8001";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid service URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported scheme {0:?}, expected http or https")]
    UnsupportedScheme(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Validate and normalize a base URL. Trailing slashes are dropped.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let parsed = Url::parse(trimmed).map_err(|source| ConfigError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;

        match parsed.scheme() {
            "http" | "https" => {}
            other => return Err(ConfigError::UnsupportedScheme(other.to_string())),
        }

        Ok(Self {
            base_url: trimmed.to_string(),
        })
    }

    /// Load from the process environment, honouring a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        match lookup(API_URL_VAR).filter(|v| !v.trim().is_empty()) {
            Some(url) => {
                debug!(%url, "using {API_URL_VAR}");
                Self::new(&url)
            }
            None => {
                info!("{API_URL_VAR} not set, using default: {DEFAULT_API_URL}");
                Ok(Self::default())
            }
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of the roast endpoint.
    pub fn roast_endpoint(&self) -> String {
        format!("{}{}", self.base_url, ROAST_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_to_loopback() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.base_url(), DEFAULT_API_URL);
        assert_eq!(config.roast_endpoint(), "http://127.0.0.1:8001/api/roast");
    }

    #[test]
    fn blank_override_uses_default() {
        let config = ClientConfig::from_lookup(lookup(&[(API_URL_VAR, "  ")])).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn override_strips_trailing_slash() {
        let config =
            ClientConfig::from_lookup(lookup(&[(API_URL_VAR, "https://roast.example.com/")]))
                .unwrap();
        assert_eq!(config.roast_endpoint(), "https://roast.example.com/api/roast");
    }

    #[test]
    fn rejects_garbage_and_other_schemes() {
        assert!(matches!(
            ClientConfig::new("not a url"),
            Err(ConfigError::InvalidUrl { .. })
        ));
        assert!(matches!(
            ClientConfig::new("ftp://example.com"),
            Err(ConfigError::UnsupportedScheme(s)) if s == "ftp"
        ));
    }
}
