//! # Kaori API Server
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  startup:  tracing ─► KaoriConfig::load ─► AppState::bootstrap          │
//! │            (hub task started, seed menu + staff loaded)                │
//! │  serve:    axum on bind_addr:port until Ctrl+C / SIGTERM               │
//! │  shutdown: stop accepting ─► HubHandle::shutdown (closes displays)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use kaori_api::{serve, AppState, KaoriConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting Kaori API server...");

    let config = KaoriConfig::load()?;
    info!(
        addr = %config.server.bind_address(),
        store_id = %config.server.default_store_id,
        transitions = ?config.lifecycle.transitions,
        pricing = ?config.lifecycle.pricing,
        "Configuration loaded"
    );

    let state = AppState::bootstrap(config)?;
    info!(
        products = state.catalog().products().len(),
        staff = state.staff().len(),
        "Seed data loaded"
    );

    let listener = TcpListener::bind(state.config().server.bind_address()).await?;
    info!(addr = %listener.local_addr()?, "Listening");

    serve(listener, state.clone(), shutdown_signal()).await?;

    if let Err(e) = state.hub().shutdown() {
        error!(error = %e, "Hub already stopped");
    }
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received");
}
