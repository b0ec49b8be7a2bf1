//! # airtrack-server
//!
//! HTTP server for the airodump-ng presence tracker.
//!
//! This binary provides:
//! - REST API for polling nearby devices and recalibrating distance
//! - OpenAPI document at `/api/openapi.json`
//! - Structured logging to file and stdout
//!
//! ## Running
//!
//! ```bash
//! # Development
//! cargo run --package airtrack-server
//!
//! # With an explicit config file
//! AIRTRACK_CONFIG=./airtrack.toml ./airtrack-server
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use airtrack_core::default_config_path;
use airtrack_server::api::create_router;
use airtrack_server::logging;
use airtrack_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = default_config_path();
    let state = AppState::load(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;

    let log_dir = logging::init(&state.config.server)?;

    info!(
        config = %config_path.display(),
        log_dir = ?log_dir,
        report = %state.tracker.report_path().display(),
        "Starting airtrack-server"
    );

    let addr: SocketAddr = state
        .config
        .server
        .bind_address
        .parse()
        .context("Invalid server.bind_address")?;

    let app = create_router(state.into_shared());
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("airtrack-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
