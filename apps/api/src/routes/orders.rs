//! Staff order endpoints.
//!
//! ```text
//! GET    /api/orders                  all orders (caller's store)
//! GET    /api/orders/active           confirmed | cooking | ready
//! GET    /api/orders/incoming         pending
//! GET    /api/orders/source/{source}  one intake channel
//! GET    /api/orders/{id}
//! POST   /api/orders                  counter order, starts confirmed
//! PATCH  /api/orders/{id}/confirm     pending -> confirmed
//! PATCH  /api/orders/{id}/status      { "status": "cooking" }
//! POST   /api/orders/{id}/cancel
//! ```
//!
//! Reads are limited to the caller's store; super admins see every store
//! and may narrow with `?store_id=`.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;

use kaori_core::{
    FulfillmentType, LineRequest, Order, OrderSource, OrderStatus, StaffAttribution, StaffRole,
};
use kaori_orders::NewOrder;

use crate::auth::CurrentStaff;
use crate::error::{created, ok, ApiError, ApiResponse, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/orders", get(list_orders).post(create_order))
        .route("/api/orders/active", get(active_orders))
        .route("/api/orders/incoming", get(incoming_orders))
        .route("/api/orders/source/{source}", get(orders_by_source))
        .route("/api/orders/{id}", get(get_order))
        .route("/api/orders/{id}/confirm", patch(confirm_order))
        .route("/api/orders/{id}/status", patch(update_status))
        .route("/api/orders/{id}/cancel", post(cancel_order))
}

// =============================================================================
// Reads
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct StoreFilter {
    pub store_id: Option<String>,
}

/// Keeps the orders `staff` may see, optionally narrowed to one store.
fn visible(staff: &CurrentStaff, filter: &StoreFilter, orders: Vec<Order>) -> Vec<Order> {
    orders
        .into_iter()
        .filter(|o| staff.can_see_store(&o.store_id))
        .filter(|o| filter.store_id.as_deref().map_or(true, |s| o.store_id == s))
        .collect()
}

async fn list_orders(
    State(state): State<AppState>,
    staff: CurrentStaff,
    filter: Result<Query<StoreFilter>, QueryRejection>,
) -> ApiResult<Vec<Order>> {
    let Query(filter) = filter?;
    Ok(ok(visible(&staff, &filter, state.lifecycle().all())))
}

async fn active_orders(
    State(state): State<AppState>,
    staff: CurrentStaff,
    filter: Result<Query<StoreFilter>, QueryRejection>,
) -> ApiResult<Vec<Order>> {
    let Query(filter) = filter?;
    Ok(ok(visible(&staff, &filter, state.lifecycle().active())))
}

async fn incoming_orders(
    State(state): State<AppState>,
    staff: CurrentStaff,
    filter: Result<Query<StoreFilter>, QueryRejection>,
) -> ApiResult<Vec<Order>> {
    let Query(filter) = filter?;
    Ok(ok(visible(&staff, &filter, state.lifecycle().incoming())))
}

async fn orders_by_source(
    State(state): State<AppState>,
    staff: CurrentStaff,
    source: Result<Path<OrderSource>, PathRejection>,
    filter: Result<Query<StoreFilter>, QueryRejection>,
) -> ApiResult<Vec<Order>> {
    let Path(source) = source?;
    let Query(filter) = filter?;
    Ok(ok(visible(
        &staff,
        &filter,
        state.lifecycle().by_source(source),
    )))
}

/// Looks up an order the caller may see. Other stores' orders read as missing.
fn visible_order(state: &AppState, staff: &CurrentStaff, id: &str) -> Result<Order, ApiError> {
    let order = state.lifecycle().get(id)?;
    if staff.can_see_store(&order.store_id) {
        Ok(order)
    } else {
        Err(ApiError::NotFound(format!("Order not found: {}", id)))
    }
}

async fn get_order(
    State(state): State<AppState>,
    staff: CurrentStaff,
    Path(id): Path<String>,
) -> ApiResult<Order> {
    Ok(ok(visible_order(&state, &staff, &id)?))
}

// =============================================================================
// Writes
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    /// Defaults to the caller's store.
    pub store_id: Option<String>,
    #[serde(default = "default_order_type")]
    pub order_type: FulfillmentType,
    pub table_id: Option<String>,
    pub items: Vec<LineRequest>,
    pub notes: Option<String>,
}

fn default_order_type() -> FulfillmentType {
    FulfillmentType::DineIn
}

async fn create_order(
    State(state): State<AppState>,
    staff: CurrentStaff,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Order>>), ApiError> {
    staff.require_role(&[
        StaffRole::Cashier,
        StaffRole::StoreAdmin,
        StaffRole::SuperAdmin,
    ])?;
    let Json(req) = payload?;

    let store_id = req.store_id.unwrap_or_else(|| staff.store_id.clone());
    if !staff.can_see_store(&store_id) {
        return Err(ApiError::Forbidden(format!(
            "Cannot create orders for store {}",
            store_id
        )));
    }

    let order = state.lifecycle().create_order(NewOrder {
        store_id,
        source: OrderSource::Cashier,
        order_type: req.order_type,
        table_id: req.table_id,
        lines: req.items,
        notes: req.notes,
        cashier: Some(StaffAttribution {
            cashier_id: staff.user_id,
            cashier_name: staff.name,
        }),
    })?;
    Ok(created(order))
}

async fn confirm_order(
    State(state): State<AppState>,
    staff: CurrentStaff,
    Path(id): Path<String>,
) -> ApiResult<Order> {
    visible_order(&state, &staff, &id)?;
    Ok(ok(state.lifecycle().confirm(&id, staff.role)?))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

async fn update_status(
    State(state): State<AppState>,
    staff: CurrentStaff,
    Path(id): Path<String>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> ApiResult<Order> {
    let Json(req) = payload?;
    visible_order(&state, &staff, &id)?;
    Ok(ok(state.lifecycle().update_status(&id, req.status)?))
}

async fn cancel_order(
    State(state): State<AppState>,
    staff: CurrentStaff,
    Path(id): Path<String>,
) -> ApiResult<Order> {
    staff.require_role(&[
        StaffRole::Cashier,
        StaffRole::StoreAdmin,
        StaffRole::SuperAdmin,
    ])?;
    visible_order(&state, &staff, &id)?;
    Ok(ok(state.lifecycle().cancel(&id)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{bearer, send, test_state};
    use axum::http::Method;
    use serde_json::json;

    #[tokio::test]
    async fn test_counter_order_starts_confirmed() {
        let state = test_state();
        let token = bearer(&state, "cashier@kaori.pos", "1111");

        let (status, body) = send(
            &state,
            Method::POST,
            "/api/orders",
            Some(&token),
            Some(json!({
                "order_type": "dine_in",
                "table_id": "table-1",
                "items": [
                    { "product_id": "prod-1", "variant_id": "var-2", "modifiers": ["mod-1"], "quantity": 2 },
                    { "product_id": "prod-7", "quantity": 1 }
                ]
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        let order = &body["data"];
        assert_eq!(order["status"], "confirmed");
        assert_eq!(order["order_source"], "cashier");
        assert_eq!(order["subtotal"], 93_000);
        assert_eq!(order["tax"], 10_230);
        assert_eq!(order["total"], 103_230);
        assert_eq!(order["table_number"], 1);
        assert_eq!(order["cashier"]["cashier_name"], "John Cashier");
    }

    #[tokio::test]
    async fn test_requires_token() {
        let state = test_state();
        let (status, body) = send(&state, Method::GET, "/api/orders", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_kitchen_cannot_confirm() {
        let state = test_state();
        let order = crate::testkit::table_order(&state);
        let token = bearer(&state, "kitchen@kaori.pos", "2222");

        let uri = format!("/api/orders/{}/confirm", order.id);
        let (status, body) = send(&state, Method::PATCH, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "FORBIDDEN");
        assert_eq!(state.lifecycle().get(&order.id).unwrap().status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_status_flow_and_invalid_jump() {
        let state = test_state();
        let order = crate::testkit::table_order(&state);
        let cashier = bearer(&state, "cashier@kaori.pos", "1111");
        let kitchen = bearer(&state, "kitchen@kaori.pos", "2222");

        let (_, incoming) =
            send(&state, Method::GET, "/api/orders/incoming", Some(&cashier), None).await;
        assert_eq!(incoming["data"].as_array().unwrap().len(), 1);

        let confirm = format!("/api/orders/{}/confirm", order.id);
        let (status, _) = send(&state, Method::PATCH, &confirm, Some(&cashier), None).await;
        assert_eq!(status, StatusCode::OK);

        let status_uri = format!("/api/orders/{}/status", order.id);
        let (status, body) = send(
            &state,
            Method::PATCH,
            &status_uri,
            Some(&kitchen),
            Some(json!({ "status": "completed" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONFLICT");

        let (status, body) = send(
            &state,
            Method::PATCH,
            &status_uri,
            Some(&kitchen),
            Some(json!({ "status": "cooking" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "cooking");

        let (_, active) =
            send(&state, Method::GET, "/api/orders/active", Some(&kitchen), None).await;
        assert_eq!(active["data"][0]["id"], order.id.as_str());
    }

    #[tokio::test]
    async fn test_unknown_status_is_bad_request() {
        let state = test_state();
        let order = crate::testkit::table_order(&state);
        let token = bearer(&state, "cashier@kaori.pos", "1111");

        let uri = format!("/api/orders/{}/status", order.id);
        let (status, body) = send(
            &state,
            Method::PATCH,
            &uri,
            Some(&token),
            Some(json!({ "status": "eaten" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_by_source_and_unknown_source() {
        let state = test_state();
        crate::testkit::table_order(&state);
        let token = bearer(&state, "cashier@kaori.pos", "1111");

        let (status, body) = send(
            &state,
            Method::GET,
            "/api/orders/source/table_qr",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (status, _) = send(
            &state,
            Method::GET,
            "/api/orders/source/fax",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_cancel_then_missing() {
        let state = test_state();
        let order = crate::testkit::table_order(&state);
        let token = bearer(&state, "cashier@kaori.pos", "1111");

        let uri = format!("/api/orders/{}/cancel", order.id);
        let (status, body) = send(&state, Method::POST, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "cancelled");

        let (status, _) = send(
            &state,
            Method::GET,
            "/api/orders/does-not-exist",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
