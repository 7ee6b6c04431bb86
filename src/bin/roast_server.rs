//! git-roast-server: roast backend.
//!
//! Configuration is read from the environment (and `.env`); see
//! `git_roast::server::config`.
//!
//! Usage:
//!   GEMINI_API_KEY=... cargo run --bin git-roast-server

use git_roast::server::{self, config::ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,git_roast=debug,tower_http=debug".into()),
        )
        .init();

    tracing::info!("BACKEND_STARTING_UP");
    let config = ServerConfig::from_env();
    server::serve(config).await
}
