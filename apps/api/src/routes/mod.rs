//! HTTP and WebSocket routes.
//!
//! Every module exposes `router()`; [`build_router`] merges them.

use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod health;
pub mod orders;
pub mod payments;
pub mod products;
pub mod public;
pub mod webhooks;
pub mod ws;

/// All routes, no middleware.
pub fn build_router() -> Router<AppState> {
    Router::new()
        // Health - public
        .merge(health::router())
        // Auth - public (issues tokens)
        .merge(auth::router())
        // Orders - staff token required
        .merge(orders::router())
        // Products - staff token required
        .merge(products::router())
        // Payments - staff token required
        .merge(payments::router())
        // Table QR / client app - public
        .merge(public::router())
        // Delivery platforms - public
        .merge(webhooks::router())
        // Live display feed
        .merge(ws::router())
}
