//! Roast backend.
//!
//! Parses the submitted GitHub URL, pulls a README excerpt and a few source
//! files from the GitHub API, and asks Gemini for a roast. Errors reach the
//! client as `{ "detail": "<CODE>" }` with the status the client classifies.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

pub mod config;
pub mod error;
pub mod gemini;
pub mod github;
pub mod handlers;

use crate::api::ROAST_PATH;
use config::ServerConfig;
use gemini::{GeminiRoaster, Roaster};
use github::{GithubClient, RepoSource};

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn RepoSource>,
    /// `None` until a Gemini key is configured.
    pub roaster: Option<Arc<dyn Roaster>>,
}

impl AppState {
    pub fn new(source: Arc<dyn RepoSource>, roaster: Option<Arc<dyn Roaster>>) -> Self {
        Self { source, roaster }
    }

    pub fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let source = GithubClient::new(config).context("Failed to create GitHub client")?;
        let roaster = GeminiRoaster::from_config(config).context("Failed to create Gemini client")?;

        Ok(Self::new(
            Arc::new(source),
            roaster.map(|r| Arc::new(r) as Arc<dyn Roaster>),
        ))
    }
}

pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/", get(handlers::root))
        .route(ROAST_PATH, post(handlers::roast_repo))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    info!("Initializing state...");
    let state = AppState::from_config(&config)?;
    let app = build_router(state, &config.allowed_origins);

    let address = config.bind_addr();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind to {address}"))?;
    info!("git-roast backend listening on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
