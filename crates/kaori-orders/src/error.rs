//! # Order Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  ValidationError / CoreError (kaori-core)                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  OrderError (this module) ← adds NotFound, transitions, permissions    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (kaori-api) ← code + message + HTTP status                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Broadcast failures never show up here: publishing an event cannot fail an
//! order operation.

use kaori_core::{CoreError, OrderStatus, StaffRole, ValidationError};
use thiserror::Error;

/// Order operation errors.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Referenced order does not exist.
    #[error("Order not found: {0}")]
    NotFound(String),

    /// Malformed input, rejected before any state changed.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Catalog rule violation from the pricing engine.
    #[error("Pricing error: {0}")]
    Pricing(CoreError),

    /// Status change not allowed by the state machine.
    ///
    /// ## Example
    /// ```text
    /// update_status(id, Completed) while status = Pending
    ///      │
    ///      ▼
    /// InvalidTransition { from: Pending, to: Completed }
    /// ```
    #[error("Order {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Caller's role may not perform the action.
    #[error("Role {role} may not {action}")]
    Forbidden {
        role: StaffRole,
        action: &'static str,
    },

    /// Order has already been paid.
    #[error("Order {0} is already paid")]
    AlreadyPaid(String),

    /// Cash handed over is less than the order total.
    #[error("Insufficient payment: total {total}, tendered {tendered}")]
    InsufficientPayment { total: i64, tendered: i64 },

    /// Gateway-confirmed amount differs from the order total.
    #[error("Payment amount mismatch: expected {expected}, received {received}")]
    AmountMismatch { expected: i64, received: i64 },
}

impl OrderError {
    /// Creates a NotFound error for an order id.
    pub fn not_found(id: impl Into<String>) -> Self {
        OrderError::NotFound(id.into())
    }
}

/// Validation errors wrapped in CoreError are unwrapped so callers see one
/// validation category no matter which layer raised it.
impl From<CoreError> for OrderError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(v) => OrderError::Validation(v),
            other => OrderError::Pricing(other),
        }
    }
}

/// Convenience type alias for Results with OrderError.
pub type OrderResult<T> = Result<T, OrderError>;
