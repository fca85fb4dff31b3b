//! # kaori-orders: Order Store and Lifecycle
//!
//! Holds every order and applies every change to it.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Order Data Flow                                  │
//! │                                                                         │
//! │  Intake (counter / table QR / delivery webhook)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   kaori-orders (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────────┐    ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │ OrderLifecycle │───►│  OrderStore    │   │InMemoryCatalog│ │   │
//! │  │   │ (lifecycle.rs) │    │  (store.rs)    │   │ (catalog.rs) │  │   │
//! │  │   │                │───►│  RwLock<Vec>   │   │ Arc snapshot │  │   │
//! │  │   │ sole writer    │    │  AtomicU64 seq │   └──────────────┘  │   │
//! │  │   └───────┬────────┘    └────────────────┘                     │   │
//! │  │           │ EventSink::publish                                 │   │
//! │  └───────────┼─────────────────────────────────────────────────────┘   │
//! │              ▼                                                          │
//! │  kaori-realtime BroadcastHub → connected displays                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`repository`] - `OrderRepository`, `CatalogReader`, `EventSink` traits
//! - [`store`] - In-memory `OrderStore`
//! - [`catalog`] - In-memory `InMemoryCatalog`
//! - [`lifecycle`] - `OrderLifecycle` controller and policies
//! - [`intake`] - Request and receipt types
//! - [`error`] - `OrderError`
//!
//! ## Usage
//!
//! ```rust,ignore
//! let lifecycle = OrderLifecycle::new(
//!     Arc::new(OrderStore::new()),
//!     Arc::new(InMemoryCatalog::new(catalog)),
//!     hub_handle_as_sink,
//!     LifecyclePolicy::default(),
//! );
//! let order = lifecycle.create_order(new_order)?;
//! lifecycle.update_status(&order.id, OrderStatus::Cooking)?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod intake;
pub mod lifecycle;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use catalog::InMemoryCatalog;
pub use error::{OrderError, OrderResult};
pub use intake::{NewExternalOrder, NewOrder, PaymentReceipt, PaymentRequest};
pub use lifecycle::{LifecyclePolicy, OrderLifecycle, TransitionPolicy};
pub use repository::{CatalogReader, EventSink, OrderRepository, PaymentWrite, StatusWrite};
pub use store::OrderStore;
