//! # Repository Seams
//!
//! Traits the lifecycle controller is written against.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  OrderLifecycle                                                        │
//! │       │                                                                 │
//! │       ├── OrderRepository  (create / read / update orders)             │
//! │       ├── CatalogReader    (read-only menu snapshot)                   │
//! │       └── EventSink        (fire-and-forget order events)              │
//! │                                                                         │
//! │  In-process implementations: OrderStore, InMemoryCatalog, BroadcastHub │
//! │  A database-backed store only needs to implement OrderRepository.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reads return owned copies; nothing hands out a reference into shared
//! state that a concurrent writer could change underneath the caller.

use std::sync::Arc;

use kaori_core::{Catalog, Order, OrderEvent, OrderSource, OrderStatus};

// =============================================================================
// Write outcomes
// =============================================================================

/// Result of a conditional status write.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusWrite {
    /// Status updated; carries the order as it is now.
    Applied(Order),
    /// Current status differed from the expected one; nothing written.
    Stale(OrderStatus),
    NotFound,
}

/// Result of marking an order paid.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentWrite {
    Paid(Order),
    AlreadyPaid,
    NotFound,
}

// =============================================================================
// Traits
// =============================================================================

/// Storage for orders.
pub trait OrderRepository: Send + Sync {
    /// Draws the next sequence value and formats it with the channel prefix.
    fn next_order_number(&self, source: OrderSource) -> String;

    /// Adds a freshly created order.
    fn append(&self, order: Order);

    /// Unconditionally sets the status and refreshes `updated_at`.
    ///
    /// Returns false if the id is unknown.
    fn set_status(&self, id: &str, status: OrderStatus) -> bool;

    /// Sets the status only if it is still `expected`.
    fn compare_and_set_status(
        &self,
        id: &str,
        expected: OrderStatus,
        status: OrderStatus,
    ) -> StatusWrite;

    /// Marks an unpaid order paid.
    fn mark_paid(&self, id: &str) -> PaymentWrite;

    fn by_id(&self, id: &str) -> Option<Order>;

    /// Orders whose status is any of `statuses`, in creation order.
    fn by_status(&self, statuses: &[OrderStatus]) -> Vec<Order>;

    fn by_source(&self, source: OrderSource) -> Vec<Order>;

    fn all(&self) -> Vec<Order>;
}

/// Read-only access to the current menu.
pub trait CatalogReader: Send + Sync {
    fn snapshot(&self) -> Arc<Catalog>;
}

/// Receives order events as the lifecycle emits them.
///
/// Publishing is infallible from the caller's point of view: an order
/// operation never fails because nobody is listening.
pub trait EventSink: Send + Sync {
    fn publish(&self, store_id: &str, event: OrderEvent);
}
