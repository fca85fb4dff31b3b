//! Staff catalog endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use kaori_core::{Product, StaffRole};

use crate::auth::CurrentStaff;
use crate::error::{ok, ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list_products))
        .route("/api/products/{id}/availability", patch(set_availability))
}

async fn list_products(State(state): State<AppState>, _staff: CurrentStaff) -> ApiResult<Vec<Product>> {
    Ok(ok(state.catalog().products().to_vec()))
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityRequest {
    pub is_available: bool,
}

/// Marks a product sold out or back in stock. Orders already placed keep
/// their prices; only new orders see the change.
async fn set_availability(
    State(state): State<AppState>,
    staff: CurrentStaff,
    Path(id): Path<String>,
    payload: Result<Json<AvailabilityRequest>, JsonRejection>,
) -> ApiResult<Product> {
    staff.require_role(&[
        StaffRole::StoreAdmin,
        StaffRole::SuperAdmin,
        StaffRole::Cashier,
    ])?;
    let Json(req) = payload?;

    if !state.set_product_availability(&id, req.is_available) {
        return Err(ApiError::NotFound(format!("Product not found: {}", id)));
    }
    info!(product_id = %id, is_available = req.is_available, by = %staff.user_id, "Product availability changed");

    state
        .catalog()
        .product(&id)
        .cloned()
        .map(ok)
        .ok_or_else(|| ApiError::NotFound(format!("Product not found: {}", id)))
}
