//! # Validation Module
//!
//! Input validation for order intake.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor (axum + serde)                                │
//! │  ├── Shape and type checks (deserialization)                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Quantities, item counts, note lengths, identifiers                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Pricing engine                                               │
//! │  └── Catalog rules (strict policy only)                                │
//! │                                                                         │
//! │  Nothing is written to the order store until all layers pass           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::{MAX_ITEM_QUANTITY, MAX_NOTES_LEN, MAX_ORDER_ITEMS, MAX_ORDER_TOTAL};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates that a field is present and not blank.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a store identifier.
///
/// ## Rules
/// - Must not be empty
/// - At most 64 characters
/// - Letters, digits, hyphens and underscores only
///
/// ## Example
/// ```rust
/// use kaori_core::validation::validate_store_id;
///
/// assert!(validate_store_id("store-1").is_ok());
/// assert!(validate_store_id("").is_err());
/// assert!(validate_store_id("store 1").is_err());
/// ```
pub fn validate_store_id(store_id: &str) -> ValidationResult<()> {
    validate_required("store_id", store_id)?;

    if store_id.len() > 64 {
        return Err(ValidationError::TooLong {
            field: "store_id".to_string(),
            max: 64,
        });
    }

    if !store_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "store_id".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates free-text notes on an order or line.
pub fn validate_notes(notes: Option<&str>) -> ValidationResult<()> {
    match notes {
        Some(n) if n.chars().count() > MAX_NOTES_LEN => Err(ValidationError::TooLong {
            field: "notes".to_string(),
            max: MAX_NOTES_LEN,
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## Request Flow
/// ```text
/// POST /api/orders { items: [{ product_id: "prod-1", quantity: 0 }] }
///       │
///       ▼
/// validate_quantity(0) ← THIS FUNCTION
///       │
///       ├── qty <= 0?  → "quantity must be positive"
///       ├── qty > 999? → "quantity must be between 1 and 999"
///       └── OK → pricing
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price reported by an external platform.
///
/// Zero is allowed (free promo items); anything above MAX_ORDER_TOTAL is not.
pub fn validate_price(price: i64) -> ValidationResult<()> {
    if !(0..=MAX_ORDER_TOTAL).contains(&price) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_ORDER_TOTAL,
        });
    }
    Ok(())
}

/// Validates the amount handed over at payment time.
pub fn validate_tendered_amount(amount: i64) -> ValidationResult<()> {
    if amount <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the number of lines in an order request.
///
/// ## Rules
/// - At least one line
/// - At most MAX_ORDER_ITEMS (100)
pub fn validate_line_count(lines: usize) -> ValidationResult<()> {
    if lines == 0 {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if lines > MAX_ORDER_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_ORDER_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_store_id() {
        assert!(validate_store_id("store-1").is_ok());
        assert!(validate_store_id("S_42").is_ok());

        assert!(validate_store_id("").is_err());
        assert!(validate_store_id("   ").is_err());
        assert!(validate_store_id("store 1").is_err());
        assert!(validate_store_id(&"s".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_line_count() {
        assert!(matches!(
            validate_line_count(0),
            Err(ValidationError::Required { .. })
        ));
        assert!(validate_line_count(1).is_ok());
        assert!(validate_line_count(MAX_ORDER_ITEMS).is_ok());
        assert!(validate_line_count(MAX_ORDER_ITEMS + 1).is_err());
    }

    #[test]
    fn test_validate_notes() {
        assert!(validate_notes(None).is_ok());
        assert!(validate_notes(Some("less ice")).is_ok());
        assert!(validate_notes(Some(&"x".repeat(MAX_NOTES_LEN + 1))).is_err());
    }

    #[test]
    fn test_validate_amounts() {
        assert!(validate_price(0).is_ok());
        assert!(validate_price(-1).is_err());
        assert!(validate_price(MAX_ORDER_TOTAL).is_ok());
        assert!(validate_price(MAX_ORDER_TOTAL + 1).is_err());
        assert!(validate_price(i64::MAX / 2 + 1).is_err());
        assert!(validate_tendered_amount(60_000).is_ok());
        assert!(validate_tendered_amount(0).is_err());
    }
}
