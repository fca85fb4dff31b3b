//! # Order Store
//!
//! In-memory, append-only order collection with in-place status updates.
//!
//! ## Locking
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  orders: RwLock<Vec<Order>>     one coarse lock over the collection    │
//! │     read()  ── by_id / by_status / by_source / all  (clone out)        │
//! │     write() ── append / set_status / compare_and_set / mark_paid       │
//! │                                                                         │
//! │  seq: AtomicU64                 fetch_add = increment-and-read in one  │
//! │                                 indivisible step, no gaps, no repeats  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Contention is low (a few orders a minute per outlet), so there is no
//! per-order locking.
//!
//! ## Retention
//! Orders are kept for the life of the process. There is no eviction; a
//! restart clears the store.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use parking_lot::RwLock;
use tracing::debug;

use kaori_core::{Order, OrderSource, OrderStatus, PaymentStatus};

use crate::repository::{OrderRepository, PaymentWrite, StatusWrite};

/// First sequence value is `ORDER_SEQ_START + 1` (ORD-1001).
pub const ORDER_SEQ_START: u64 = 1000;

/// In-memory implementation of [`OrderRepository`].
#[derive(Debug)]
pub struct OrderStore {
    orders: RwLock<Vec<Order>>,
    seq: AtomicU64,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::with_sequence_start(ORDER_SEQ_START)
    }

    /// Starts numbering after `start` instead of the default.
    pub fn with_sequence_start(start: u64) -> Self {
        Self {
            orders: RwLock::new(Vec::new()),
            seq: AtomicU64::new(start),
        }
    }

    pub fn len(&self) -> usize {
        self.orders.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.read().is_empty()
    }
}

impl Default for OrderStore {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderRepository for OrderStore {
    fn next_order_number(&self, source: OrderSource) -> String {
        let n = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{}-{:04}", source.number_prefix(), n)
    }

    fn append(&self, order: Order) {
        debug!(order_id = %order.id, order_number = %order.order_number, "Appending order");
        self.orders.write().push(order);
    }

    fn set_status(&self, id: &str, status: OrderStatus) -> bool {
        let mut orders = self.orders.write();
        match orders.iter_mut().find(|o| o.id == id) {
            Some(order) => {
                order.status = status;
                order.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    fn compare_and_set_status(
        &self,
        id: &str,
        expected: OrderStatus,
        status: OrderStatus,
    ) -> StatusWrite {
        let mut orders = self.orders.write();
        let Some(order) = orders.iter_mut().find(|o| o.id == id) else {
            return StatusWrite::NotFound;
        };
        if order.status != expected {
            return StatusWrite::Stale(order.status);
        }
        order.status = status;
        order.updated_at = Utc::now();
        StatusWrite::Applied(order.clone())
    }

    fn mark_paid(&self, id: &str) -> PaymentWrite {
        let mut orders = self.orders.write();
        let Some(order) = orders.iter_mut().find(|o| o.id == id) else {
            return PaymentWrite::NotFound;
        };
        if order.payment_status == PaymentStatus::Paid {
            return PaymentWrite::AlreadyPaid;
        }
        order.payment_status = PaymentStatus::Paid;
        order.updated_at = Utc::now();
        PaymentWrite::Paid(order.clone())
    }

    fn by_id(&self, id: &str) -> Option<Order> {
        self.orders.read().iter().find(|o| o.id == id).cloned()
    }

    fn by_status(&self, statuses: &[OrderStatus]) -> Vec<Order> {
        self.orders
            .read()
            .iter()
            .filter(|o| statuses.contains(&o.status))
            .cloned()
            .collect()
    }

    fn by_source(&self, source: OrderSource) -> Vec<Order> {
        self.orders
            .read()
            .iter()
            .filter(|o| o.order_source == source)
            .cloned()
            .collect()
    }

    fn all(&self) -> Vec<Order> {
        self.orders.read().clone()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
