//! Request and receipt types crossing the lifecycle boundary.

use serde::{Deserialize, Serialize};

use kaori_core::{
    DeliveryInfo, ExternalLine, FulfillmentType, LineRequest, OrderSource, PaymentMethod,
    StaffAttribution,
};

/// An order built from catalog lines (counter, table QR, client app).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub store_id: String,
    pub source: OrderSource,
    pub order_type: FulfillmentType,
    pub table_id: Option<String>,
    pub lines: Vec<LineRequest>,
    pub notes: Option<String>,
    pub cashier: Option<StaffAttribution>,
}

/// An order pushed by a delivery platform with its own item names and prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExternalOrder {
    pub store_id: String,
    pub source: OrderSource,
    pub lines: Vec<ExternalLine>,
    pub delivery: DeliveryInfo,
    pub notes: Option<String>,
}

/// Money handed over for an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub order_id: String,
    pub method: PaymentMethod,
    /// Cash tendered, or the amount the gateway confirmed.
    pub amount: i64,
}

/// What the cashier reads back after a payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub order_id: String,
    pub order_number: String,
    pub method: PaymentMethod,
    pub total: i64,
    pub amount_paid: i64,
    pub change: i64,
}
