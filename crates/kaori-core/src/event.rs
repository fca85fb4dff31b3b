//! # Order Events
//!
//! Typed notifications produced by the order lifecycle and pushed to
//! connected displays.
//!
//! ## Wire Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  { "type": "new_order",    "payload": { ...full Order... } }           │
//! │  { "type": "order_status", "payload": { "id": "...", "status": "..." } }│
//! │  { "type": "payment",      "payload": { "id": "...", ... } }           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! The realtime layer adds `store_id` next to `type` and `payload`.
//!
//! Events are fire-and-forget: never acknowledged, persisted or replayed.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{Order, OrderStatus, PaymentMethod, PaymentStatus};

/// Status delta for an existing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StatusChange {
    pub id: String,
    pub status: OrderStatus,
}

/// Payment recorded against an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentUpdate {
    pub id: String,
    pub payment_status: PaymentStatus,
    pub method: PaymentMethod,
    pub total: i64,
}

/// Everything a display can be told about orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum OrderEvent {
    NewOrder(Order),
    OrderStatus(StatusChange),
    Payment(PaymentUpdate),
}

impl OrderEvent {
    /// The `type` discriminator as it appears on the wire.
    pub const fn kind(&self) -> &'static str {
        match self {
            OrderEvent::NewOrder(_) => "new_order",
            OrderEvent::OrderStatus(_) => "order_status",
            OrderEvent::Payment(_) => "payment",
        }
    }

    /// Id of the order the event is about.
    pub fn order_id(&self) -> &str {
        match self {
            OrderEvent::NewOrder(order) => &order.id,
            OrderEvent::OrderStatus(change) => &change.id,
            OrderEvent::Payment(update) => &update.id,
        }
    }
}
