//! Route handlers.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::error::ApiError;
use super::github::parse_github_url;
use super::AppState;
use crate::api::{RoastPayload, RoastRequest};

/// GET /: liveness.
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "GIT_ROAST_BACKEND_ALIVE",
        "status": "READY_FOR_DESTRUCTION",
    }))
}

/// POST /api/roast
pub async fn roast_repo(
    State(state): State<AppState>,
    body: Result<Json<RoastRequest>, JsonRejection>,
) -> Result<Json<RoastPayload>, ApiError> {
    let Json(request) = body.map_err(|e| {
        debug!("rejected roast body: {}", e);
        ApiError::InvalidBody
    })?;
    info!(repo_url = %request.repo_url, "Received roast request");

    let repo = parse_github_url(&request.repo_url)?;
    let roaster = state.roaster.as_ref().ok_or(ApiError::SetupRequired)?;

    let content = state.source.fetch_content(&repo).await?;
    let payload = roaster.roast(&repo, &content).await;

    info!(repo = %repo, score = ?payload.score, "roast delivered");
    Ok(Json(payload))
}
