//! GitHub content fetching.
//!
//! Collects a README excerpt and a handful of source files through the public
//! REST API. A configured token is used first; a 401/403/404 with the token is
//! repeated once anonymously, since a bad token can hide public files.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::{header, Client, Response};
use serde::Deserialize;
use tracing::{debug, info};

use super::config::ServerConfig;
use super::error::ApiError;

pub const USER_AGENT: &str = "Git-Roast-App/1.0";

const README_LIMIT: usize = 2000;
const CODE_FILE_LIMIT: usize = 1500;
const MAX_CODE_FILES: usize = 3;
const CODE_EXTENSIONS: &[&str] = &[
    ".py", ".js", ".ts", ".jsx", ".tsx", ".go", ".rs", ".java", ".cpp", ".c", ".h", ".cs", ".php",
    ".rb",
];

/// `owner/name` of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Extract owner and repository from anything containing `github.com/<owner>/<repo>`.
pub fn parse_github_url(url: &str) -> Result<RepoRef, ApiError> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"github\.com/([^/\s?#]+)/([^/\s?#]+)").expect("static regex")
    });

    let captures = pattern.captures(url).ok_or(ApiError::InvalidUrl)?;
    let owner = captures[1].to_string();
    let name = captures[2].trim_end_matches(".git").to_string();
    if name.is_empty() {
        return Err(ApiError::InvalidUrl);
    }

    Ok(RepoRef { owner, name })
}

/// Source of repository text to roast.
#[async_trait]
pub trait RepoSource: Send + Sync {
    async fn fetch_content(&self, repo: &RepoRef) -> Result<String, ApiError>;
}

#[derive(Debug, Clone, Deserialize)]
struct ContentEntry {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    url: String,
    #[serde(default)]
    download_url: Option<String>,
}

impl ContentEntry {
    fn is_code_file(&self) -> bool {
        let name = self.name.to_lowercase();
        self.kind == "file" && CODE_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
    }

    fn is_visible_dir(&self) -> bool {
        self.kind == "dir" && !self.name.starts_with('.')
    }
}

#[derive(Debug, Deserialize)]
struct ReadmeEntry {
    #[serde(default)]
    download_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GithubClient {
    client: Client,
    api_base: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(config: &ServerConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            api_base: config.github_api_url.clone(),
            token: config.github_token.clone(),
        })
    }

    /// GET with the token, falling back to an anonymous request. `None` when
    /// the request could not be made at all.
    async fn get(&self, url: &str) -> Option<Response> {
        if let Some(token) = &self.token {
            let response = self.send(url, Some(token)).await?;
            let status = response.status().as_u16();
            if !matches!(status, 401 | 403 | 404) {
                return Some(response);
            }
            debug!(status, url, "request failed with auth, retrying without auth");
        }
        self.send(url, None).await
    }

    async fn send(&self, url: &str, token: Option<&str>) -> Option<Response> {
        debug!(url, auth = token.is_some(), "GitHub request");
        let mut request = self.client.get(url);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("token {}", token));
        }

        match request.send().await {
            Ok(response) => {
                debug!(status = response.status().as_u16(), url, "GitHub response");
                Some(response)
            }
            Err(e) => {
                debug!(url, "GitHub request failed: {}", e);
                None
            }
        }
    }

    async fn get_text(&self, url: &str) -> Option<String> {
        let response = self.get(url).await?;
        if !response.status().is_success() {
            return None;
        }
        response.text().await.ok()
    }

    async fn list_dir(&self, url: &str) -> Option<Vec<ContentEntry>> {
        let response = self.get(url).await?;
        if !response.status().is_success() {
            return None;
        }
        response.json().await.ok()
    }

    async fn readme_section(&self, repo: &RepoRef) -> (bool, Option<String>) {
        let url = format!("{}/repos/{}/{}/readme", self.api_base, repo.owner, repo.name);
        let Some(response) = self.get(&url).await else {
            return (false, None);
        };
        if !response.status().is_success() {
            debug!(status = response.status().as_u16(), "Readme status");
            return (true, None);
        }

        let download_url = response
            .json::<ReadmeEntry>()
            .await
            .ok()
            .and_then(|entry| entry.download_url);
        let Some(download_url) = download_url else {
            return (true, None);
        };

        let section = self
            .get_text(&download_url)
            .await
            .map(|text| section("README.md", &text, README_LIMIT));
        (true, section)
    }
}

#[async_trait]
impl RepoSource for GithubClient {
    async fn fetch_content(&self, repo: &RepoRef) -> Result<String, ApiError> {
        let (mut reachable, readme) = self.readme_section(repo).await;
        let mut content = readme.unwrap_or_default();

        let contents_url = format!("{}/repos/{}/{}/contents", self.api_base, repo.owner, repo.name);
        if let Some(response) = self.get(&contents_url).await {
            reachable = true;
            match response.status().as_u16() {
                200 => {
                    let entries: Vec<ContentEntry> = response
                        .json()
                        .await
                        .map_err(|e| ApiError::Internal(e.into()))?;

                    let mut files: Vec<ContentEntry> =
                        entries.iter().filter(|e| e.is_code_file()).cloned().collect();
                    debug!("Found {} potential code files", files.len());

                    if files.is_empty() {
                        if let Some(dir) = entries.iter().find(|e| e.is_visible_dir()) {
                            debug!("No files in root, looking into {}", dir.name);
                            if let Some(sub_entries) = self.list_dir(&dir.url).await {
                                files = sub_entries.into_iter().filter(|e| e.is_code_file()).collect();
                            }
                        }
                    }

                    for file in files.iter().take(MAX_CODE_FILES) {
                        let Some(download_url) = &file.download_url else {
                            continue;
                        };
                        if let Some(text) = self.get_text(download_url).await {
                            content.push_str(&section(&file.name, &text, CODE_FILE_LIMIT));
                        }
                    }
                }
                404 => return Err(ApiError::NotFound),
                403 => return Err(ApiError::RateLimited),
                status => debug!(status, "contents listing unavailable"),
            }
        }

        if content.is_empty() {
            info!(repo = %repo, reachable, "content fetch failed");
            return Err(if reachable {
                ApiError::NoContent
            } else {
                ApiError::Unreachable
            });
        }

        info!(repo = %repo, bytes = content.len(), "content fetch succeeded");
        Ok(content)
    }
}

fn section(name: &str, text: &str, limit: usize) -> String {
    let excerpt: String = text.chars().take(limit).collect();
    format!("--- {} ---\n{}\n\n", name, excerpt)
}
