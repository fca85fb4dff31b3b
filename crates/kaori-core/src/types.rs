//! # Domain Types
//!
//! Core domain types shared by the order pipeline and the realtime layer.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Order       │   │   OrderItem     │   │    Product      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id ("prod-1")  │       │
//! │  │  order_number   │   │  product_id     │   │  base_price     │       │
//! │  │  order_source   │   │  unit_price ❄   │   │  variants[]     │       │
//! │  │  status         │   │  quantity       │   │  modifiers[]    │       │
//! │  │  subtotal/tax/  │   │  subtotal       │   │  is_available   │       │
//! │  │  total          │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  OrderSource    │   │  OrderStatus    │   │   StaffRole     │       │
//! │  │  cashier        │   │  pending        │   │  super_admin    │       │
//! │  │  table_qr       │   │  confirmed      │   │  store_admin    │       │
//! │  │  client_app     │   │  cooking        │   │  cashier        │       │
//! │  │  grabfood ...   │   │  ready ...      │   │  kitchen        │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ❄ = frozen at creation time (snapshot pattern)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every order has:
//! - `id`: UUID v4 - immutable, used by every API and event
//! - `order_number`: `ORD-1001`, `GRAB-1002` - human-readable, called out in the kitchen

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so the 11% order tax is 1100 bps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// The fixed tax applied to every order subtotal (11%).
    pub const ORDER: TaxRate = TaxRate(1100);

    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::ORDER
    }
}

// =============================================================================
// Order Source (Channel)
// =============================================================================

/// Where an order came from.
///
/// ## Order Number Prefixes
/// ```text
/// cashier / table_qr / client_app  ──► ORD-1001
/// grabfood                         ──► GRAB-1002
/// gofood                           ──► GOFOOD-1003
/// shopee_food                      ──► SHOPEE-1004
/// delivery (other platforms)       ──► DEL-1005
/// ```
/// All channels draw from the same sequence, so numbers never collide
/// across prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderSource {
    /// Entered by staff at the counter.
    Cashier,
    /// Self-order from the QR code on a table.
    TableQr,
    /// Customer mobile app.
    ClientApp,
    #[serde(rename = "grabfood")]
    GrabFood,
    #[serde(rename = "gofood")]
    GoFood,
    ShopeeFood,
    /// Any other delivery platform.
    Delivery,
}

impl OrderSource {
    /// Prefix used when formatting the human-readable order number.
    pub const fn number_prefix(&self) -> &'static str {
        match self {
            OrderSource::Cashier | OrderSource::TableQr | OrderSource::ClientApp => "ORD",
            OrderSource::GrabFood => "GRAB",
            OrderSource::GoFood => "GOFOOD",
            OrderSource::ShopeeFood => "SHOPEE",
            OrderSource::Delivery => "DEL",
        }
    }

    /// Returns true for third-party delivery platforms.
    pub const fn is_delivery(&self) -> bool {
        matches!(
            self,
            OrderSource::GrabFood
                | OrderSource::GoFood
                | OrderSource::ShopeeFood
                | OrderSource::Delivery
        )
    }

    /// Status a freshly created order starts in.
    ///
    /// Staff-entered counter orders are treated as already confirmed;
    /// everything else waits in the incoming queue for a cashier.
    pub const fn initial_status(&self) -> OrderStatus {
        match self {
            OrderSource::Cashier => OrderStatus::Confirmed,
            _ => OrderStatus::Pending,
        }
    }

    /// Wire name, as used in URLs and JSON.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderSource::Cashier => "cashier",
            OrderSource::TableQr => "table_qr",
            OrderSource::ClientApp => "client_app",
            OrderSource::GrabFood => "grabfood",
            OrderSource::GoFood => "gofood",
            OrderSource::ShopeeFood => "shopee_food",
            OrderSource::Delivery => "delivery",
        }
    }
}

impl fmt::Display for OrderSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Fulfillment Type
// =============================================================================

/// How the order leaves the shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentType {
    DineIn,
    Takeaway,
    Delivery,
}

// =============================================================================
// Order Status
// =============================================================================

/// The kitchen lifecycle of an order.
///
/// ## State Machine
/// ```text
/// pending ──► confirmed ──► cooking ──► ready ──► completed
///    │            │            │          │
///    └────────────┴────────────┴──────────┴──────► cancelled
///
/// completed, cancelled = terminal
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Cooking,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Statuses shown on the kitchen board.
    pub const ACTIVE: [OrderStatus; 3] =
        [OrderStatus::Confirmed, OrderStatus::Cooking, OrderStatus::Ready];

    /// Returns true once no further transition is possible.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// The single forward step from this status, if any.
    pub const fn next(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Confirmed),
            OrderStatus::Confirmed => Some(OrderStatus::Cooking),
            OrderStatus::Cooking => Some(OrderStatus::Ready),
            OrderStatus::Ready => Some(OrderStatus::Completed),
            OrderStatus::Completed | OrderStatus::Cancelled => None,
        }
    }

    /// Whether the ordered state machine allows `self → to`.
    ///
    /// Only the next forward step, or `cancelled` from a non-terminal state.
    pub fn can_transition_to(&self, to: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        to == OrderStatus::Cancelled || self.next() == Some(to)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Cooking => "cooking",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payment
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash at the counter; change is returned.
    Cash,
    /// QRIS scan, confirmed by the payment gateway callback.
    Qris,
    /// Card on an external terminal, confirmed by the gateway callback.
    Card,
    /// Collected by the delivery platform before the order reaches us.
    Platform,
}

// =============================================================================
// Staff Role
// =============================================================================

/// Role of a logged-in staff member or a connected display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    SuperAdmin,
    StoreAdmin,
    Cashier,
    Kitchen,
}

impl StaffRole {
    /// Confirming an incoming order requires cashier or above.
    pub const fn can_confirm(&self) -> bool {
        matches!(
            self,
            StaffRole::Cashier | StaffRole::StoreAdmin | StaffRole::SuperAdmin
        )
    }

    /// Roles that see kitchen-targeted broadcasts.
    pub const fn sees_kitchen(&self) -> bool {
        matches!(
            self,
            StaffRole::Kitchen | StaffRole::StoreAdmin | StaffRole::SuperAdmin
        )
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            StaffRole::SuperAdmin => "super_admin",
            StaffRole::StoreAdmin => "store_admin",
            StaffRole::Cashier => "cashier",
            StaffRole::Kitchen => "kitchen",
        }
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StaffRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "super_admin" => Ok(StaffRole::SuperAdmin),
            "store_admin" => Ok(StaffRole::StoreAdmin),
            "cashier" => Ok(StaffRole::Cashier),
            "kitchen" => Ok(StaffRole::Kitchen),
            _ => Err(ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: vec![
                    "super_admin".to_string(),
                    "store_admin".to_string(),
                    "cashier".to_string(),
                    "kitchen".to_string(),
                ],
            }),
        }
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Size or style option with a price adjustment (e.g. "Large" +8000).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Variant {
    pub id: String,
    pub name: String,
    pub price_adjustment: i64,
}

/// Add-on priced per application (e.g. "Extra Shot" 8000, max 3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Modifier {
    pub id: String,
    pub name: String,
    pub price: i64,
    /// How many times this modifier may be applied to one line.
    pub max_qty: u32,
}

/// A menu product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub category_id: String,
    pub name: String,
    pub description: String,
    /// Price in rupiah before variant/modifier adjustments.
    pub base_price: i64,
    /// Sold-out items stay on the menu but are flagged unavailable.
    pub is_available: bool,
    pub variants: Vec<Variant>,
    pub modifiers: Vec<Modifier>,
}

impl Product {
    #[inline]
    pub fn base_price(&self) -> Money {
        Money::from_rupiah(self.base_price)
    }

    pub fn variant(&self, variant_id: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id == variant_id)
    }

    pub fn modifier(&self, modifier_id: &str) -> Option<&Modifier> {
        self.modifiers.iter().find(|m| m.id == modifier_id)
    }
}

/// A dine-in table with its QR code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Table {
    pub id: String,
    pub number: u32,
    pub capacity: u32,
    pub qr_code: String,
}

// =============================================================================
// Order Item
// =============================================================================

/// A line item in an order.
/// Uses snapshot pattern to freeze product data at time of ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    /// Catalog product, absent for delivery-platform items we only know by name.
    pub product_id: Option<String>,
    /// Product name at time of order (frozen).
    pub product_name: String,
    pub variant_id: Option<String>,
    /// Variant display name at time of order (frozen).
    pub variant_name: Option<String>,
    /// Modifier ids as requested, repeats allowed.
    pub modifiers: Vec<String>,
    pub quantity: i64,
    /// Unit price at time of order (frozen, never recomputed).
    pub unit_price: i64,
    /// unit_price × quantity.
    pub subtotal: i64,
    pub notes: Option<String>,
}

impl OrderItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_rupiah(self.unit_price)
    }

    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_rupiah(self.subtotal)
    }
}

// =============================================================================
// Order
// =============================================================================

/// Customer and courier details reported by a delivery platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DeliveryInfo {
    /// The platform's own order reference.
    pub external_order_id: String,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub delivery_address: Option<String>,
    pub driver_name: Option<String>,
    /// Total the platform reported, kept for reconciliation only.
    pub platform_total: Option<i64>,
}

/// Staff member who entered the order at the counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StaffAttribution {
    pub cashier_id: String,
    pub cashier_name: String,
}

/// A customer order.
///
/// `items`, `subtotal`, `tax` and `total` are fixed at creation;
/// only `status`, `payment_status` and `updated_at` change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub store_id: String,
    pub order_number: String,
    pub order_source: OrderSource,
    pub order_type: FulfillmentType,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub items: Vec<OrderItem>,
    pub subtotal: i64,
    pub tax: i64,
    pub total: i64,
    pub notes: Option<String>,
    pub table_id: Option<String>,
    pub table_number: Option<u32>,
    pub delivery: Option<DeliveryInfo>,
    pub cashier: Option<StaffAttribution>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_rupiah(self.total)
    }

    #[inline]
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
