//! # Error Types
//!
//! Domain-specific error types for kaori-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kaori-core errors (this file)                                         │
//! │  ├── CoreError        - Pricing / catalog rule violations              │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  kaori-orders errors                                                   │
//! │  └── OrderError       - NotFound, InvalidTransition, Forbidden, ...    │
//! │                                                                         │
//! │  kaori-api errors                                                      │
//! │  └── ApiError         - What clients see (code + message)              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → OrderError → ApiError → Client    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Pricing and catalog rule violations.
///
/// Only raised when the strict pricing policy is in effect; the permissive
/// policy skips or ignores the offending input instead.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Referenced product is not in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Product exists but is flagged sold out.
    #[error("Product {name} ({product_id}) is not available")]
    ProductUnavailable { product_id: String, name: String },

    /// Variant id does not belong to the product.
    #[error("Variant {variant_id} not found on product {product_id}")]
    VariantNotFound {
        product_id: String,
        variant_id: String,
    },

    /// Modifier id does not belong to the product.
    #[error("Modifier {modifier_id} not found on product {product_id}")]
    ModifierNotFound {
        product_id: String,
        modifier_id: String,
    },

    /// A modifier was applied more times than it allows.
    ///
    /// ## Example
    /// ```text
    /// Espresso + [Extra Shot, Extra Shot, Extra Shot, Extra Shot]
    ///      │
    ///      ▼
    /// ModifierLimitExceeded { modifier: "Extra Shot", max: 3, requested: 4 }
    /// ```
    #[error("Modifier {modifier} allows at most {max}, requested {requested}")]
    ModifierLimitExceeded {
        modifier: String,
        max: u32,
        requested: u32,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any state is touched.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
