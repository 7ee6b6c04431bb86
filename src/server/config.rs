//! Backend configuration.
//!
//! Reads config from env vars:
//!   PORT            listen port (default: 8001)
//!   BIND_HOST       listen host (default: 0.0.0.0)
//!   GEMINI_API_KEY  Gemini key; without it every roast answers 503
//!   GEMINI_MODELS   comma-separated models, tried in order
//!   GEMINI_API_URL  Gemini models endpoint
//!   GITHUB_TOKEN    optional GitHub token
//!   GITHUB_API_URL  GitHub REST API root (default: https://api.github.com)
//!   ALLOWED_ORIGINS comma-separated CORS origins

use std::{fmt::Display, str::FromStr};

use tracing::{info, warn};

use super::gemini::{DEFAULT_GEMINI_API_URL, DEFAULT_MODELS};

pub const DEFAULT_PORT: u16 = 8001;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &["http://localhost:4321", "http://127.0.0.1:4321"];

/// Value shipped in the `.env` template; treated as unset.
const GITHUB_TOKEN_PLACEHOLDER: &str = "your_github_token_here";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub gemini_api_key: Option<String>,
    pub gemini_models: Vec<String>,
    pub gemini_api_url: String,
    pub github_token: Option<String>,
    pub github_api_url: String,
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let github_token = var("GITHUB_TOKEN").filter(|t| t != GITHUB_TOKEN_PLACEHOLDER);
        let gemini_api_key = var("GEMINI_API_KEY");
        if gemini_api_key.is_none() {
            warn!("GEMINI_API_KEY not found in environment");
        }

        Self {
            host: var("BIND_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: try_load("PORT", var("PORT"), DEFAULT_PORT),
            gemini_api_key,
            gemini_models: var("GEMINI_MODELS")
                .map(|v| split_list(&v))
                .filter(|models| !models.is_empty())
                .unwrap_or_else(|| DEFAULT_MODELS.iter().map(|m| m.to_string()).collect()),
            gemini_api_url: var("GEMINI_API_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_GEMINI_API_URL.to_string()),
            github_token,
            github_api_url: var("GITHUB_API_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
            allowed_origins: var("ALLOWED_ORIGINS")
                .map(|v| split_list(&v))
                .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect()),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn try_load<T: FromStr + Display>(key: &str, raw: Option<String>, default: T) -> T
where
    T::Err: Display,
{
    match raw {
        None => {
            info!("{key} not set, using default: {default}");
            default
        }
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
            default
        }),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
