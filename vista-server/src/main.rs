//! Vista Server
//!
//! A pure Rust HTTP server that:
//! - Serves the image analysis page on /
//! - Keeps per-visit session state (credential, upload, context) in memory
//! - Streams image descriptions from the chat completions API on /api/analyze
//!
//! Access via: http://localhost:8501

use anyhow::Result;
use clap::Parser;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod api;
mod cli;
mod page;
mod router;
mod server_utils;
mod state;

#[cfg(test)]
mod test_helpers;

use cli::Cli;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = cli.server_config();
    config.validate()?;

    info!("🚀 Vista Server starting on {}:{}...", config.host, config.port);
    info!("🔀 Upstream API: {}", config.upstream.api_base);

    let state = AppState::new(config.clone())?;

    let sweep_every = Duration::from_secs(config.session_ttl_secs.clamp(1, 60));
    let sweeper = state.sessions().start_sweeper(sweep_every);

    let app = router::build_router(state);
    let listener = server_utils::create_listener(&config).await?;

    info!("🌐 Page available at http://{}/", listener.local_addr()?);

    axum::serve(listener, app).with_graceful_shutdown(server_utils::shutdown_signal()).await?;

    sweeper.abort();
    info!("👋 Vista Server stopped");

    Ok(())
}
