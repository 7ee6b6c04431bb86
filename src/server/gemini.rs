//! Roast generation with Google Gemini.
//!
//! Models are tried in order until one answers. An answer that cannot be
//! turned into a roast, or no answer at all, yields the fallback roast rather
//! than an error.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::config::ServerConfig;
use super::github::RepoRef;
use crate::api::RoastPayload;

pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODELS: &[&str] = &["gemini-flash-latest", "gemini-1.5-flash", "gemini-pro-latest"];

pub const FALLBACK_ROAST: &str =
    "The destruction was too intense even for the AI. Your code is a black hole of despair.";
pub const FALLBACK_SCORE: f64 = 99.0;

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Turns repository text into a roast. Never fails.
#[async_trait]
pub trait Roaster: Send + Sync {
    async fn roast(&self, repo: &RepoRef, content: &str) -> RoastPayload;
}

pub fn fallback_roast() -> RoastPayload {
    RoastPayload::new(FALLBACK_ROAST, FALLBACK_SCORE)
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Clone)]
pub struct GeminiRoaster {
    client: Client,
    base_url: String,
    api_key: String,
    models: Vec<String>,
}

impl GeminiRoaster {
    pub fn new(
        api_key: impl Into<String>,
        models: Vec<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            models,
        })
    }

    /// `None` when no API key is configured.
    pub fn from_config(config: &ServerConfig) -> Result<Option<Self>, reqwest::Error> {
        match &config.gemini_api_key {
            Some(key) => Self::new(
                key.clone(),
                config.gemini_models.clone(),
                config.gemini_api_url.clone(),
            )
            .map(Some),
            None => Ok(None),
        }
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String, GeminiError> {
        let url = format!("{}/{}:generateContent", self.base_url, model);
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(GeminiError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: GenerateResponse = serde_json::from_str(&text)
            .map_err(|e| GeminiError::InvalidResponse(e.to_string()))?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| GeminiError::InvalidResponse("No candidates in response".to_string()))
    }
}

#[async_trait]
impl Roaster for GeminiRoaster {
    async fn roast(&self, repo: &RepoRef, content: &str) -> RoastPayload {
        let prompt = build_prompt(repo, content);

        let mut last_error = None;
        for model in &self.models {
            debug!(model = %model, "Attempting with model");
            match self.generate(model, &prompt).await {
                Ok(text) => {
                    info!(model = %model, "Successfully triggered model");
                    let preview: String = text.chars().take(200).collect();
                    debug!("Gemini raw response: {}...", preview);
                    return parse_roast(&text).unwrap_or_else(|e| {
                        warn!("Gemini reply unusable: {}", e);
                        fallback_roast()
                    });
                }
                Err(e) => {
                    warn!(model = %model, "Model failed: {}", e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => error!("All models failed. Last error: {}", e),
            None => error!("No Gemini models configured"),
        }
        fallback_roast()
    }
}

pub fn build_prompt(repo: &RepoRef, content: &str) -> String {
    format!(
        r#"You are a rude, toxic Senior Engineer who hates bad code.
Here is the code/readme from the repository: {repo}.

ROAST IT. Be specific about the bad practices, terrible variable names, or lack of documentation you see.
Don't hold back. Use developer slang.

Return ONLY a JSON object with this exact structure:
{{
    "roast": "your toxic roast here",
    "score": number (between 0 and 100, where 100 is pure trash)
}}

Code Content:
{content}
"#
    )
}

/// Pull `{ roast, score }` out of a model reply, tolerating markdown fences
/// and chatter around the JSON object.
pub fn parse_roast(text: &str) -> Result<RoastPayload, GeminiError> {
    static OBJECT: OnceLock<Regex> = OnceLock::new();
    let object = OBJECT.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("static regex"));

    let json = object.find(text).map(|m| m.as_str()).unwrap_or(text);
    let payload: RoastPayload =
        serde_json::from_str(json).map_err(|e| GeminiError::InvalidResponse(e.to_string()))?;

    match payload.roast.as_deref().map(str::trim) {
        Some(roast) if !roast.is_empty() => Ok(payload),
        _ => Err(GeminiError::InvalidResponse("reply has no roast".to_string())),
    }
}
