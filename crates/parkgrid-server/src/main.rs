//! Server entry point for the parkgrid reservation engine.
//!
//! Wires together configuration, lot seeding, and the HTTP + `WebSocket`
//! API server.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `parkgrid.yaml`
//! 2. Initialize structured logging (tracing) at the configured level
//! 3. Seed the lot registry from the layout directory
//! 4. Serve the API until `Ctrl-C`

mod config;

use std::path::Path;
use std::sync::Arc;

use parkgrid_api::{AppState, build_router};
use parkgrid_engine::{LotRegistry, seed};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::ServerSettings;

/// Path of the configuration file, overridable via `PARKGRID_CONFIG`.
const DEFAULT_CONFIG_PATH: &str = "parkgrid.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration loading, seeding, binding, or
/// serving fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration (a missing file falls back to defaults).
    let config_path =
        std::env::var("PARKGRID_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());
    let settings = if Path::new(&config_path).exists() {
        ServerSettings::from_file(Path::new(&config_path))?
    } else {
        ServerSettings::default()
    };

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(settings.logging.level.clone())),
        )
        .with_target(true)
        .init();

    info!("parkgrid-server starting");
    info!(
        host = settings.server.host,
        port = settings.server.port,
        seed_dir = settings.seed.dir,
        "configuration loaded"
    );

    // 3. Seed the lot registry.
    let registry = Arc::new(LotRegistry::new());
    let lot_count = seed::seed_dir(&registry, Path::new(&settings.seed.dir)).await?;
    info!(lot_count, "lot registry seeded");

    // 4. Serve until Ctrl-C.
    let addr = settings.server.socket_addr()?;
    let state = Arc::new(AppState::new(registry));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "parkgrid server listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("parkgrid-server stopped");
    Ok(())
}

/// Resolve when the process receives `Ctrl-C`.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to install Ctrl-C handler: {e}");
    }
}
