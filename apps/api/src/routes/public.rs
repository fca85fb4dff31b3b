//! Customer-facing endpoints, no token required.
//!
//! A table's QR code opens the menu and lets the guest order straight to
//! the incoming queue, where a cashier confirms it.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use kaori_core::{FulfillmentType, LineRequest, Order, OrderSource, Product, Table, ValidationError};
use kaori_orders::NewOrder;

use crate::error::{created, ok, ApiError, ApiResponse, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/public/orders", post(create_public_order))
        .route("/api/public/tables/{id}", get(get_table))
        .route("/api/public/menu", get(menu))
}

#[derive(Debug, Deserialize)]
pub struct PublicOrderRequest {
    pub store_id: Option<String>,
    /// `table_qr` (default) or `client_app`.
    pub source: Option<OrderSource>,
    pub order_type: Option<FulfillmentType>,
    pub table_id: Option<String>,
    pub items: Vec<LineRequest>,
    pub notes: Option<String>,
}

async fn create_public_order(
    State(state): State<AppState>,
    payload: Result<Json<PublicOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Order>>), ApiError> {
    let Json(req) = payload?;

    let source = req.source.unwrap_or(OrderSource::TableQr);
    let order_type = match source {
        OrderSource::TableQr => req.order_type.unwrap_or(FulfillmentType::DineIn),
        OrderSource::ClientApp => req.order_type.unwrap_or(FulfillmentType::Takeaway),
        _ => {
            return Err(ValidationError::NotAllowed {
                field: "source".to_string(),
                allowed: vec!["table_qr".to_string(), "client_app".to_string()],
            }
            .into())
        }
    };

    let order = state.lifecycle().create_order(NewOrder {
        store_id: req
            .store_id
            .unwrap_or_else(|| state.default_store_id().to_string()),
        source,
        order_type,
        table_id: req.table_id,
        lines: req.items,
        notes: req.notes,
        cashier: None,
    })?;
    Ok(created(order))
}

/// Looks a table up by id or by the code printed on its QR sticker.
async fn get_table(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<Table> {
    let Path(id) = id?;
    state
        .catalog()
        .tables()
        .iter()
        .find(|t| t.id == id || t.qr_code == id)
        .cloned()
        .map(ok)
        .ok_or_else(|| ApiError::NotFound(format!("Table not found: {}", id)))
}

/// Full menu; sold-out products are included with `is_available: false`.
async fn menu(State(state): State<AppState>) -> ApiResult<Vec<Product>> {
    Ok(ok(state.catalog().products().to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{send, test_state};
    use axum::http::Method;
    use serde_json::json;

    #[tokio::test]
    async fn test_table_order_starts_pending() {
        let state = test_state();
        let (status, body) = send(
            &state,
            Method::POST,
            "/api/public/orders",
            None,
            Some(json!({
                "table_id": "table-3",
                "items": [{ "product_id": "prod-3", "modifier_ids": ["mod-3"], "quantity": 1 }]
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        let order = &body["data"];
        assert_eq!(order["status"], "pending");
        assert_eq!(order["order_source"], "table_qr");
        assert_eq!(order["order_type"], "dine_in");
        assert_eq!(order["store_id"], "store-1");
        assert_eq!(order["table_number"], 3);
        assert_eq!(order["subtotal"], 36_000);
        assert!(order["order_number"].as_str().unwrap().starts_with("ORD-"));
    }

    #[tokio::test]
    async fn test_table_order_needs_table() {
        let state = test_state();
        let (status, body) = send(
            &state,
            Method::POST,
            "/api/public/orders",
            None,
            Some(json!({ "items": [{ "product_id": "prod-1", "quantity": 1 }] })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_public_cannot_claim_delivery_source() {
        let state = test_state();
        let (status, _) = send(
            &state,
            Method::POST,
            "/api/public/orders",
            None,
            Some(json!({
                "source": "grabfood",
                "items": [{ "product_id": "prod-1", "quantity": 1 }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(state.lifecycle().all().is_empty());
    }

    #[tokio::test]
    async fn test_table_lookup_by_qr_code() {
        let state = test_state();
        let (status, body) =
            send(&state, Method::GET, "/api/public/tables/QR002", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["id"], "table-2");

        let (status, _) =
            send(&state, Method::GET, "/api/public/tables/table-99", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_menu_lists_sold_out_products() {
        let state = test_state();
        let (_, body) = send(&state, Method::GET, "/api/public/menu", None, None).await;
        let products = body["data"].as_array().unwrap();
        assert_eq!(products.len(), 10);
        assert!(products
            .iter()
            .any(|p| p["id"] == "prod-10" && p["is_available"] == false));
    }
}
