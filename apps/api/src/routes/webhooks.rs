//! Delivery platform webhooks.
//!
//! ## Payload Mapping
//! ```text
//! ┌──────────────┬──────────────────┬─────────────────────┬──────────────────┐
//! │              │ GrabFood         │ GoFood              │ ShopeeFood       │
//! ├──────────────┼──────────────────┼─────────────────────┼──────────────────┤
//! │ external id  │ orderId          │ transaction_id      │ order_no         │
//! │ customer     │ customerName     │ customer.name       │ buyer_name       │
//! │ phone        │ customerPhone    │ customer.phone      │ buyer_phone      │
//! │ address      │ address          │ delivery_address    │ address.full     │
//! │ driver       │ driverName       │ driver.name         │ shipper_name     │
//! │ items        │ items[name,      │ items[product_name, │ order_items[     │
//! │              │  quantity,price, │  qty,price,note]    │  item_name,...,  │
//! │              │  notes]          │                     │  remark]         │
//! │ total        │ total            │ total_amount        │ total_price      │
//! └──────────────┴──────────────────┴─────────────────────┴──────────────────┘
//! ```
//!
//! Every shape becomes a [`NewExternalOrder`]: the platform's own item names
//! and prices, fulfillment `delivery`, already paid. The store defaults to
//! the configured one unless the platform calls with `?store_id=`.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use kaori_core::{DeliveryInfo, ExternalLine, Order, OrderSource};
use kaori_orders::NewExternalOrder;

use crate::error::{created, ApiError, ApiResponse};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/webhooks/grabfood", post(grabfood))
        .route("/api/webhooks/gofood", post(gofood))
        .route("/api/webhooks/shopee", post(shopee))
        .route("/api/simulate/order", post(simulate))
}

type Created<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

#[derive(Debug, Default, Deserialize)]
pub struct WebhookQuery {
    pub store_id: Option<String>,
}

/// What the platform gets back.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub status: &'static str,
    pub order_id: String,
    pub order_number: String,
}

impl From<&Order> for WebhookAck {
    fn from(order: &Order) -> Self {
        WebhookAck {
            status: "accepted",
            order_id: order.id.clone(),
            order_number: order.order_number.clone(),
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn platform_total(total: i64) -> Option<i64> {
    (total > 0).then_some(total)
}

fn line(name: String, quantity: i64, price: i64, notes: String) -> ExternalLine {
    ExternalLine {
        name,
        quantity,
        price,
        notes: non_empty(notes),
    }
}

fn accept(state: &AppState, query: WebhookQuery, order: PlatformOrder) -> Created<WebhookAck> {
    let store_id = query
        .store_id
        .unwrap_or_else(|| state.default_store_id().to_string());
    let order = state
        .lifecycle()
        .create_external_order(order.into_new_order(store_id))?;
    Ok(created(WebhookAck::from(&order)))
}

/// Platform-neutral form every webhook payload is mapped into.
#[derive(Debug)]
pub struct PlatformOrder {
    pub source: OrderSource,
    pub lines: Vec<ExternalLine>,
    pub delivery: DeliveryInfo,
}

impl PlatformOrder {
    fn into_new_order(self, store_id: String) -> NewExternalOrder {
        NewExternalOrder {
            store_id,
            source: self.source,
            lines: self.lines,
            delivery: self.delivery,
            notes: None,
        }
    }
}

// =============================================================================
// GrabFood
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrabFoodOrder {
    pub order_id: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: String,
    #[serde(default)]
    pub address: String,
    pub items: Vec<GrabFoodItem>,
    #[serde(default)]
    pub driver_name: String,
    #[serde(default)]
    pub total: i64,
}

#[derive(Debug, Deserialize)]
pub struct GrabFoodItem {
    pub name: String,
    pub quantity: i64,
    pub price: i64,
    #[serde(default)]
    pub notes: String,
}

impl From<GrabFoodOrder> for PlatformOrder {
    fn from(o: GrabFoodOrder) -> Self {
        PlatformOrder {
            source: OrderSource::GrabFood,
            lines: o
                .items
                .into_iter()
                .map(|i| line(i.name, i.quantity, i.price, i.notes))
                .collect(),
            delivery: DeliveryInfo {
                external_order_id: o.order_id,
                customer_name: non_empty(o.customer_name),
                customer_phone: non_empty(o.customer_phone),
                delivery_address: non_empty(o.address),
                driver_name: non_empty(o.driver_name),
                platform_total: platform_total(o.total),
            },
        }
    }
}

async fn grabfood(
    State(state): State<AppState>,
    query: Result<Query<WebhookQuery>, QueryRejection>,
    payload: Result<Json<GrabFoodOrder>, JsonRejection>,
) -> Created<WebhookAck> {
    let Query(query) = query?;
    let Json(order) = payload.map_err(|_| invalid_format("GrabFood"))?;
    accept(&state, query, order.into())
}

// =============================================================================
// GoFood
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct GoFoodOrder {
    pub transaction_id: String,
    #[serde(default)]
    pub customer: GoFoodCustomer,
    #[serde(default)]
    pub delivery_address: String,
    pub items: Vec<GoFoodItem>,
    #[serde(default)]
    pub driver: GoFoodDriver,
    #[serde(default)]
    pub total_amount: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct GoFoodCustomer {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct GoFoodDriver {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct GoFoodItem {
    pub product_name: String,
    pub qty: i64,
    pub price: i64,
    #[serde(default)]
    pub note: String,
}

impl From<GoFoodOrder> for PlatformOrder {
    fn from(o: GoFoodOrder) -> Self {
        PlatformOrder {
            source: OrderSource::GoFood,
            lines: o
                .items
                .into_iter()
                .map(|i| line(i.product_name, i.qty, i.price, i.note))
                .collect(),
            delivery: DeliveryInfo {
                external_order_id: o.transaction_id,
                customer_name: non_empty(o.customer.name),
                customer_phone: non_empty(o.customer.phone),
                delivery_address: non_empty(o.delivery_address),
                driver_name: non_empty(o.driver.name),
                platform_total: platform_total(o.total_amount),
            },
        }
    }
}

async fn gofood(
    State(state): State<AppState>,
    query: Result<Query<WebhookQuery>, QueryRejection>,
    payload: Result<Json<GoFoodOrder>, JsonRejection>,
) -> Created<WebhookAck> {
    let Query(query) = query?;
    let Json(order) = payload.map_err(|_| invalid_format("GoFood"))?;
    accept(&state, query, order.into())
}

// =============================================================================
// ShopeeFood
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ShopeeFoodOrder {
    pub order_no: String,
    #[serde(default)]
    pub buyer_name: String,
    #[serde(default)]
    pub buyer_phone: String,
    #[serde(default)]
    pub address: ShopeeAddress,
    pub order_items: Vec<ShopeeItem>,
    #[serde(default)]
    pub shipper_name: String,
    #[serde(default)]
    pub total_price: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct ShopeeAddress {
    #[serde(default)]
    pub full: String,
}

#[derive(Debug, Deserialize)]
pub struct ShopeeItem {
    pub item_name: String,
    pub quantity: i64,
    pub price: i64,
    #[serde(default)]
    pub remark: String,
}

impl From<ShopeeFoodOrder> for PlatformOrder {
    fn from(o: ShopeeFoodOrder) -> Self {
        PlatformOrder {
            source: OrderSource::ShopeeFood,
            lines: o
                .order_items
                .into_iter()
                .map(|i| line(i.item_name, i.quantity, i.price, i.remark))
                .collect(),
            delivery: DeliveryInfo {
                external_order_id: o.order_no,
                customer_name: non_empty(o.buyer_name),
                customer_phone: non_empty(o.buyer_phone),
                delivery_address: non_empty(o.address.full),
                driver_name: non_empty(o.shipper_name),
                platform_total: platform_total(o.total_price),
            },
        }
    }
}

async fn shopee(
    State(state): State<AppState>,
    query: Result<Query<WebhookQuery>, QueryRejection>,
    payload: Result<Json<ShopeeFoodOrder>, JsonRejection>,
) -> Created<WebhookAck> {
    let Query(query) = query?;
    let Json(order) = payload.map_err(|_| invalid_format("Shopee Food"))?;
    accept(&state, query, order.into())
}

fn invalid_format(platform: &str) -> ApiError {
    ApiError::BadRequest(format!("Invalid {} order format", platform))
}

// =============================================================================
// Simulator
// =============================================================================

/// Fakes a platform order, for demos and display testing.
#[derive(Debug, Deserialize)]
pub struct SimulateOrderRequest {
    pub source: OrderSource,
    pub store_id: Option<String>,
    #[serde(default)]
    pub customer_name: String,
    pub items: Vec<SimulatedItem>,
}

#[derive(Debug, Deserialize)]
pub struct SimulatedItem {
    pub name: String,
    pub quantity: i64,
    pub price: i64,
}

async fn simulate(
    State(state): State<AppState>,
    payload: Result<Json<SimulateOrderRequest>, JsonRejection>,
) -> Created<Order> {
    let Json(req) = payload?;
    if !req.source.is_delivery() {
        return Err(ApiError::BadRequest(
            "Invalid source. Use: grabfood, gofood, shopee_food, delivery".to_string(),
        ));
    }

    let external_order_id = Uuid::new_v4().simple().to_string()[..8].to_string();
    let order = state.lifecycle().create_external_order(NewExternalOrder {
        store_id: req
            .store_id
            .unwrap_or_else(|| state.default_store_id().to_string()),
        source: req.source,
        lines: req
            .items
            .into_iter()
            .map(|i| line(i.name, i.quantity, i.price, String::new()))
            .collect(),
        delivery: DeliveryInfo {
            external_order_id,
            customer_name: non_empty(req.customer_name),
            customer_phone: Some("08123456789".to_string()),
            delivery_address: Some("Jl. Delivery No. 123".to_string()),
            driver_name: Some("Driver".to_string()),
            platform_total: None,
        },
        notes: None,
    })?;
    Ok(created(order))
}
