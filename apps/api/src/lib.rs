//! # Kaori API
//!
//! HTTP and WebSocket shell around the order backend.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Cashier app ──┐                                                        │
//! │  Table QR  ────┼──► axum router ──► OrderLifecycle ──► OrderStore       │
//! │  Webhooks  ────┘    (routes/)           │                               │
//! │                                         │ EventSink                     │
//! │                                         ▼                               │
//! │  Kitchen display ◄── /api/ws ◄──── BroadcastHub                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - `KaoriConfig` (env > TOML file > defaults)
//! - [`state`] - `AppState` shared by handlers
//! - [`auth`] - PIN login, JWT, `CurrentStaff` extractor
//! - [`routes`] - one module per endpoint group
//! - [`seed`] - starter menu, tables and staff
//! - [`error`] - `ApiError` and the response envelope

use std::future::Future;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod seed;
pub mod state;

pub use config::{ConfigError, KaoriConfig};
pub use error::{ApiError, ApiResult};
pub use state::AppState;

/// Routes plus middleware, ready to serve.
pub fn build_router(state: AppState) -> Router {
    routes::build_router()
        // CORS - displays run on other origins
        .layer(CorsLayer::permissive())
        // Request tracing
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
