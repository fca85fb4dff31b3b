//! # kaori-core: Pure Order Domain for the Kaori POS Backend
//!
//! Domain types, money, pricing and validation, with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kaori POS Backend                                │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    kaori-api (axum)                             │   │
//! │  │   counter orders · table QR · delivery webhooks · ws displays   │   │
//! │  └───────────────┬─────────────────────────────┬───────────────────┘   │
//! │                  │                             │                        │
//! │  ┌───────────────▼──────────────┐  ┌───────────▼───────────────────┐   │
//! │  │  kaori-orders                │  │  kaori-realtime               │   │
//! │  │  OrderStore · OrderLifecycle │──►  BroadcastHub · Sessions      │   │
//! │  └───────────────┬──────────────┘  └───────────┬───────────────────┘   │
//! │                  │                             │                        │
//! │  ┌───────────────▼─────────────────────────────▼───────────────────┐   │
//! │  │               ★ kaori-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐  ┌─────────┐  ┌─────────┐  ┌─────────┐  ┌──────┐ │   │
//! │  │   │  types  │  │  money  │  │ pricing │  │  event  │  │valid.│ │   │
//! │  │   └─────────┘  └─────────┘  └─────────┘  └─────────┘  └──────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO SHARED STATE • PURE FUNCTIONS                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Order, line item, catalog and enum types
//! - [`money`] - Integer rupiah with truncating tax
//! - [`catalog`] - Read-only menu snapshot
//! - [`pricing`] - Pricing engine (lines → items, subtotal, tax, total)
//! - [`event`] - Broadcast event sum type
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use kaori_core::money::Money;
//! use kaori_core::types::TaxRate;
//!
//! let subtotal = Money::from_rupiah(46_000);
//! let tax = subtotal.calculate_tax(TaxRate::ORDER);
//! assert_eq!((subtotal + tax).rupiah(), 51_060);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod event;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::Catalog;
pub use error::{CoreError, CoreResult, ValidationError};
pub use event::{OrderEvent, PaymentUpdate, StatusChange};
pub use money::Money;
pub use pricing::{ExternalLine, LineRequest, PricedOrder, PricingPolicy};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Store used when a request does not name one (single-outlet deployments).
pub const DEFAULT_STORE_ID: &str = "store-1";

/// Maximum lines in a single order.
pub const MAX_ORDER_ITEMS: usize = 100;

/// Maximum quantity on a single line.
///
/// Guards against typing 1000 instead of 10 at the counter.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Largest order subtotal, and largest unit price, accepted in rupiah.
///
/// Far above any real order; keeps every line and total within `i64`.
pub const MAX_ORDER_TOTAL: i64 = 1_000_000_000_000;

/// Maximum length of order or line notes.
pub const MAX_NOTES_LEN: usize = 500;
