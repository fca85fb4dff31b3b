//! Settling orders at the counter.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use kaori_core::{PaymentMethod, StaffRole};
use kaori_orders::{PaymentReceipt, PaymentRequest};

use crate::auth::CurrentStaff;
use crate::error::{ok, ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/payments", post(pay))
        .route("/api/payments/cash", post(pay_cash))
}

#[derive(Debug, Deserialize)]
pub struct CashPaymentRequest {
    pub order_id: String,
    pub amount_paid: i64,
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub receipt: PaymentReceipt,
}

const PAYMENT_ROLES: &[StaffRole] = &[
    StaffRole::Cashier,
    StaffRole::StoreAdmin,
    StaffRole::SuperAdmin,
];

fn settle(state: &AppState, staff: &CurrentStaff, req: PaymentRequest) -> ApiResult<PaymentResponse> {
    staff.require_role(PAYMENT_ROLES)?;
    let order = state.lifecycle().get(&req.order_id)?;
    if !staff.can_see_store(&order.store_id) {
        return Err(ApiError::NotFound(format!("Order not found: {}", req.order_id)));
    }

    let receipt = state.lifecycle().record_payment(req)?;
    Ok(ok(PaymentResponse {
        message: "Payment successful",
        receipt,
    }))
}

async fn pay_cash(
    State(state): State<AppState>,
    staff: CurrentStaff,
    payload: Result<Json<CashPaymentRequest>, JsonRejection>,
) -> ApiResult<PaymentResponse> {
    let Json(req) = payload?;
    settle(
        &state,
        &staff,
        PaymentRequest {
            order_id: req.order_id,
            method: PaymentMethod::Cash,
            amount: req.amount_paid,
        },
    )
}

/// Card, QRIS or cash; non-cash amounts must equal the total.
async fn pay(
    State(state): State<AppState>,
    staff: CurrentStaff,
    payload: Result<Json<PaymentRequest>, JsonRejection>,
) -> ApiResult<PaymentResponse> {
    let Json(req) = payload?;
    settle(&state, &staff, req)
}
