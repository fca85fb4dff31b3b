//! # Pricing Engine
//!
//! Turns requested lines into frozen, priced order items plus totals.
//!
//! ## Pricing Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  unit_price  = base_price                                               │
//! │              + variant.price_adjustment     (if variant matches)        │
//! │              + Σ modifier.price             (each matching reference)   │
//! │                                                                         │
//! │  line        = unit_price × quantity                                    │
//! │  subtotal    = Σ line                                                   │
//! │  tax         = subtotal × 11 / 100          (truncated)                 │
//! │  total       = subtotal + tax                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Policies
//! | Input                         | Permissive (default) | Strict                  |
//! |-------------------------------|----------------------|-------------------------|
//! | unknown product               | line skipped         | `ProductNotFound`       |
//! | unavailable product           | accepted             | `ProductUnavailable`    |
//! | unknown variant / modifier    | ignored              | `VariantNotFound` / ... |
//! | modifier repeated > max_qty   | accepted             | `ModifierLimitExceeded` |
//!
//! Either way, an order whose lines were all skipped is rejected, and so is
//! any line or subtotal above `MAX_ORDER_TOTAL`.
//!
//! Pricing is a pure function of its inputs: safe to call from any number of
//! request tasks at once.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{OrderItem, Product, TaxRate};
use crate::validation::{validate_line_count, validate_notes, validate_price, validate_quantity};
use crate::MAX_ORDER_TOTAL;

// =============================================================================
// Requests
// =============================================================================

/// One requested line referencing the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineRequest {
    pub product_id: String,
    #[serde(default)]
    pub variant_id: Option<String>,
    /// Modifier ids; repeat an id to apply it more than once.
    #[serde(default, alias = "modifier_ids")]
    pub modifiers: Vec<String>,
    pub quantity: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

impl LineRequest {
    /// Convenience constructor for a plain line (no variant, no modifiers).
    pub fn new(product_id: impl Into<String>, quantity: i64) -> Self {
        Self {
            product_id: product_id.into(),
            variant_id: None,
            modifiers: Vec::new(),
            quantity,
            notes: None,
        }
    }
}

/// A line priced by a delivery platform, known only by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExternalLine {
    pub name: String,
    pub quantity: i64,
    /// Unit price as reported by the platform.
    pub price: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

/// How strictly catalog rules are enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingPolicy {
    /// Skip unknown products, ignore availability and modifier limits.
    #[default]
    Permissive,
    /// Reject any request that breaks a catalog rule.
    Strict,
}

// =============================================================================
// Result
// =============================================================================

/// Output of the pricing engine.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedOrder {
    pub items: Vec<OrderItem>,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

impl PricedOrder {
    /// Computes order totals from already-priced items.
    ///
    /// Fails with `OutOfRange` when the subtotal passes `MAX_ORDER_TOTAL`.
    pub fn from_items(items: Vec<OrderItem>) -> CoreResult<Self> {
        let subtotal = items
            .iter()
            .try_fold(Money::zero(), |acc, item| acc.checked_add(item.subtotal()))
            .filter(|s| s.rupiah() <= MAX_ORDER_TOTAL)
            .ok_or_else(|| out_of_range("subtotal"))?;
        let tax = subtotal.calculate_tax(TaxRate::ORDER);
        let total = subtotal
            .checked_add(tax)
            .ok_or_else(|| out_of_range("total"))?;
        Ok(Self {
            items,
            subtotal,
            tax,
            total,
        })
    }
}

fn out_of_range(field: &str) -> CoreError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: MAX_ORDER_TOTAL,
    }
    .into()
}

// =============================================================================
// Engine
// =============================================================================

/// Prices catalog lines.
///
/// ## Example
/// ```rust,ignore
/// let priced = price_lines(
///     &catalog,
///     &[LineRequest::new("prod-1", 1), LineRequest::new("prod-3", 1)],
///     PricingPolicy::Permissive,
/// )?;
/// assert_eq!(priced.total.rupiah(), 51_060);
/// ```
pub fn price_lines(
    catalog: &Catalog,
    lines: &[LineRequest],
    policy: PricingPolicy,
) -> CoreResult<PricedOrder> {
    validate_line_count(lines.len())?;
    for line in lines {
        validate_quantity(line.quantity)?;
        validate_notes(line.notes.as_deref())?;
    }

    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
        let product = match catalog.product(&line.product_id) {
            Some(product) => product,
            None if policy == PricingPolicy::Strict => {
                return Err(CoreError::ProductNotFound(line.product_id.clone()));
            }
            None => continue,
        };

        if policy == PricingPolicy::Strict {
            check_catalog_rules(product, line)?;
        }

        items.push(price_line(product, line)?);
    }

    if items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        }
        .into());
    }

    PricedOrder::from_items(items)
}

/// Prices lines a delivery platform already priced.
///
/// Totals are still recomputed here so `total == subtotal + tax` holds for
/// every order, whatever total the platform claims.
pub fn price_external_lines(lines: &[ExternalLine]) -> CoreResult<PricedOrder> {
    validate_line_count(lines.len())?;

    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
        validate_quantity(line.quantity)?;
        validate_price(line.price)?;
        validate_notes(line.notes.as_deref())?;

        let unit_price = Money::from_rupiah(line.price);
        let subtotal = line_subtotal(unit_price, line.quantity)?;
        items.push(OrderItem {
            id: Uuid::new_v4().to_string(),
            product_id: None,
            product_name: line.name.clone(),
            variant_id: None,
            variant_name: None,
            modifiers: Vec::new(),
            quantity: line.quantity,
            unit_price: unit_price.rupiah(),
            subtotal: subtotal.rupiah(),
            notes: line.notes.clone(),
        });
    }

    PricedOrder::from_items(items)
}

/// `unit_price × quantity`, bounded by `MAX_ORDER_TOTAL`.
fn line_subtotal(unit_price: Money, quantity: i64) -> CoreResult<Money> {
    unit_price
        .checked_multiply_quantity(quantity)
        .filter(|m| m.rupiah() <= MAX_ORDER_TOTAL)
        .ok_or_else(|| out_of_range("line subtotal"))
}

fn price_line(product: &Product, line: &LineRequest) -> CoreResult<OrderItem> {
    let mut unit_price = product.base_price();

    let mut variant_name = None;
    if let Some(variant) = line.variant_id.as_deref().and_then(|id| product.variant(id)) {
        unit_price = unit_price
            .checked_add(Money::from_rupiah(variant.price_adjustment))
            .ok_or_else(|| out_of_range("unit_price"))?;
        variant_name = Some(variant.name.clone());
    }

    for modifier in line.modifiers.iter().filter_map(|id| product.modifier(id)) {
        unit_price = unit_price
            .checked_add(Money::from_rupiah(modifier.price))
            .ok_or_else(|| out_of_range("unit_price"))?;
    }
    let subtotal = line_subtotal(unit_price, line.quantity)?;

    Ok(OrderItem {
        id: Uuid::new_v4().to_string(),
        product_id: Some(product.id.clone()),
        product_name: product.name.clone(),
        variant_id: line.variant_id.clone(),
        variant_name,
        modifiers: line.modifiers.clone(),
        quantity: line.quantity,
        unit_price: unit_price.rupiah(),
        subtotal: subtotal.rupiah(),
        notes: line.notes.clone(),
    })
}

fn check_catalog_rules(product: &Product, line: &LineRequest) -> CoreResult<()> {
    if !product.is_available {
        return Err(CoreError::ProductUnavailable {
            product_id: product.id.clone(),
            name: product.name.clone(),
        });
    }

    if let Some(variant_id) = line.variant_id.as_deref() {
        if product.variant(variant_id).is_none() {
            return Err(CoreError::VariantNotFound {
                product_id: product.id.clone(),
                variant_id: variant_id.to_string(),
            });
        }
    }

    let mut applied: HashMap<&str, u32> = HashMap::new();
    for modifier_id in &line.modifiers {
        *applied.entry(modifier_id.as_str()).or_default() += 1;
    }
    for (modifier_id, requested) in applied {
        let modifier = product
            .modifier(modifier_id)
            .ok_or_else(|| CoreError::ModifierNotFound {
                product_id: product.id.clone(),
                modifier_id: modifier_id.to_string(),
            })?;
        if requested > modifier.max_qty {
            return Err(CoreError::ModifierLimitExceeded {
                modifier: modifier.name.clone(),
                max: modifier.max_qty,
                requested,
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
