//! Live order feed for kitchen and cashier displays.
//!
//! ```text
//! GET /api/ws?store_id=store-1&role=kitchen   (upgrade)
//!
//!   register(scope) ──► SubscriberSession::run(sink, stream) ──► unregister
//! ```
//!
//! `store_id` defaults to the configured store; `role` is optional and only
//! narrows kitchen-targeted broadcasts. Displays connect anonymously, but
//! `store_admin` and `super_admin` must present a staff token carrying that
//! role, as `?token=` or a bearer header.

use axum::{
    extract::{
        rejection::QueryRejection,
        ws::{WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::{header, HeaderMap},
    response::Response,
    routing::get,
    Router,
};
use futures_util::StreamExt;
use serde::Deserialize;
use tracing::{info, warn};

use kaori_core::validation::validate_store_id;
use kaori_core::StaffRole;
use kaori_realtime::{HubHandle, SubscriberInfo, SubscriberScope, SubscriberSession};

use crate::auth::{extract_bearer_token, staff_from_token, CurrentStaff};
use crate::error::{ok, ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/ws", get(ws_handler))
        .route("/api/ws/subscribers", get(list_subscribers))
}

#[derive(Debug, Default, Deserialize)]
pub struct WsQuery {
    pub store_id: Option<String>,
    pub role: Option<String>,
    pub token: Option<String>,
}

/// Builds the subscriber scope from the query string.
///
/// Admin roles widen what a socket hears, so they are only accepted from a
/// `staff` whose token carries the same role and may see the store.
fn scope_from(
    query: WsQuery,
    default_store_id: &str,
    staff: Option<&CurrentStaff>,
) -> Result<SubscriberScope, ApiError> {
    let store_id = query
        .store_id
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default_store_id.to_string());
    validate_store_id(&store_id)?;

    let role = query
        .role
        .filter(|r| !r.trim().is_empty())
        .map(|r| r.parse::<StaffRole>())
        .transpose()?;

    if let Some(role @ (StaffRole::StoreAdmin | StaffRole::SuperAdmin)) = role {
        let staff = staff.ok_or_else(|| {
            ApiError::Unauthorized(format!("Role {} requires a staff token", role))
        })?;
        if staff.role != role || !staff.can_see_store(&store_id) {
            return Err(ApiError::Forbidden(format!(
                "Token does not grant {} on store {}",
                role, store_id
            )));
        }
    }

    Ok(SubscriberScope::new(Some(store_id), role))
}

/// Token from `?token=` or the Authorization header, validated if present.
fn connecting_staff(
    state: &AppState,
    query: &WsQuery,
    headers: &HeaderMap,
) -> Result<Option<CurrentStaff>, ApiError> {
    let token = query.token.as_deref().filter(|t| !t.trim().is_empty()).or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(extract_bearer_token)
    });
    token.map(|t| staff_from_token(state, t)).transpose()
}

async fn ws_handler(
    State(state): State<AppState>,
    query: Result<Query<WsQuery>, QueryRejection>,
    headers: HeaderMap,
    upgrade: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let staff = connecting_staff(&state, &query, &headers)?;
    let scope = match scope_from(query, state.default_store_id(), staff.as_ref()) {
        Ok(scope) => scope,
        Err(e) => {
            warn!(error = %e, "Refusing display connection");
            return Err(e);
        }
    };
    let hub = state.hub().clone();

    Ok(upgrade.on_upgrade(move |socket| serve_socket(hub, scope, socket)))
}

async fn serve_socket(hub: HubHandle, scope: SubscriberScope, socket: WebSocket) {
    let subscription = match hub.register(scope.clone()) {
        Ok(subscription) => subscription,
        Err(e) => {
            warn!(error = %e, "Rejecting display connection");
            return;
        }
    };

    info!(
        subscriber_id = %subscription.id,
        store_id = ?scope.store_id,
        role = ?scope.role,
        "Display connected"
    );

    let (sink, stream) = socket.split();
    SubscriberSession::new(hub, subscription).run(sink, stream).await;
}

/// Connected displays, for the admin dashboard.
async fn list_subscribers(
    State(state): State<AppState>,
    staff: CurrentStaff,
) -> ApiResult<Vec<SubscriberInfo>> {
    staff.require_role(&[StaffRole::StoreAdmin, StaffRole::SuperAdmin])?;
    let subscribers = state
        .hub()
        .subscribers()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(ok(subscribers
        .into_iter()
        .filter(|s| {
            s.scope
                .store_id
                .as_deref()
                .map_or(staff.role == StaffRole::SuperAdmin, |store| {
                    staff.can_see_store(store)
                })
        })
        .collect()))
}
