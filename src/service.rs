//! RoastService trait: the boundary between the controller and the backend.
//!
//! The service reports what came back over the wire and nothing more;
//! turning replies into user-facing messages is the controller's job.

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};

use crate::api::{ErrorBody, RoastPayload, RoastRequest};
use crate::config::{ClientConfig, ConfigError};

/// Transport-level failure: no HTTP reply was received.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service unavailable: {0}")]
    Unavailable(String),
}

/// What the service answered.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceReply {
    /// 2xx. The payload may still lack a roast.
    Roasted(RoastPayload),
    /// Non-2xx, with the detail string if the body carried one.
    Rejected { status: u16, detail: Option<String> },
}

#[async_trait]
pub trait RoastService: Send + Sync {
    async fn roast(&self, repo_url: &str) -> Result<ServiceReply, ServiceError>;
}

/// `POST <base>/api/roast` over reqwest.
#[derive(Debug, Clone)]
pub struct HttpRoastService {
    client: Client,
    endpoint: String,
}

impl HttpRoastService {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: &ClientConfig) -> Self {
        Self {
            client,
            endpoint: config.roast_endpoint(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RoastService for HttpRoastService {
    async fn roast(&self, repo_url: &str) -> Result<ServiceReply, ServiceError> {
        debug!(endpoint = %self.endpoint, repo_url, "sending roast request");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&RoastRequest::new(repo_url))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "roast reply received");

        if !status.is_success() {
            return Ok(ServiceReply::Rejected {
                status: status.as_u16(),
                detail: ErrorBody::detail_from(&body),
            });
        }

        let payload = serde_json::from_str::<RoastPayload>(&body).unwrap_or_else(|e| {
            warn!("roast reply is not a JSON object: {}", e);
            RoastPayload::default()
        });

        Ok(ServiceReply::Roasted(payload))
    }
}
