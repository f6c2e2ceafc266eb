//! # Telemetry Gate Server
//!
//! Serves `/hello`, `/api/health`, and `/api/version/{n}`. The telemetry store
//! is optional; the server starts and answers with or without it.

use anyhow::Context;
use std::net::SocketAddr;
use telemetry_gate::config::ConfigManager;
use telemetry_gate::logging::init_structured_logging;
use telemetry_gate::web::{router, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_structured_logging();

    let manager = ConfigManager::global();
    let state = AppState::from_config_manager(&manager);
    let bind_address = manager.app().bind_address.clone();

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;
    info!(address = %bind_address, "Server listening");

    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
