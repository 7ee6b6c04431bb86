use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{error, warn};

use crate::api::ErrorBody;

/// Failures of `POST /api/roast`. The display string is the machine-readable
/// `detail` sent to the client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("INVALID_GITHUB_URL")]
    InvalidUrl,

    #[error("INVALID_REQUEST_BODY")]
    InvalidBody,

    #[error("REPO_NOT_FOUND_OR_PRIVATE")]
    NotFound,

    #[error("GITHUB_RATE_LIMIT_EXCEEDED")]
    RateLimited,

    #[error("NO_ANALYZABLE_CONTENT")]
    NoContent,

    #[error("COULD_NOT_FETCH_GITHUB_CONTENT")]
    Unreachable,

    #[error("GEMINI_API_KEY_NOT_CONFIGURED")]
    SetupRequired,

    #[error("DESTRUCTION_CORE_FAILURE")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::InvalidUrl | Self::InvalidBody => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::RateLimited => StatusCode::FORBIDDEN,
            Self::NoContent => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unreachable => StatusCode::BAD_GATEWAY,
            Self::SetupRequired => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        match &self {
            Self::Internal(e) => error!("Internal error during roast: {:#}", e),
            other => warn!(status = status.as_u16(), "HTTP Error: {}", other),
        }

        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}
