//! # Money Module
//!
//! Provides the `Money` type for handling rupiah amounts safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Whole Rupiah (i64)                                       │
//! │    Menu prices are whole rupiah (Espresso = 18000)                     │
//! │    Tax is truncated: 46000 × 11% = 5060                                │
//! │    Every display agrees because every number is an integer             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kaori_core::money::Money;
//! use kaori_core::types::TaxRate;
//!
//! let espresso = Money::from_rupiah(18_000);
//! let cappuccino = Money::from_rupiah(28_000);
//!
//! let subtotal = espresso + cappuccino;
//! let tax = subtotal.calculate_tax(TaxRate::ORDER);
//! assert_eq!(tax.rupiah(), 5_060);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in whole rupiah (the smallest unit the menu uses).
///
/// ## Design Decisions
/// - **i64 (signed)**: change due can be computed as a plain subtraction
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Newtype**: `Money(51060)` serializes as the bare number `51060`
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.base_price ──┐                                                 │
/// │  Variant.price_adjustment ──┼──► unit_price ──► × quantity ──► line     │
/// │  Modifier.price ──────┘                                                 │
/// │                                                                         │
/// │  Σ lines ──► subtotal ──► calculate_tax(11%) ──► total = sub + tax      │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole rupiah.
    ///
    /// ## Example
    /// ```rust
    /// use kaori_core::money::Money;
    ///
    /// let price = Money::from_rupiah(28_000);
    /// assert_eq!(price.rupiah(), 28_000);
    /// ```
    #[inline]
    pub const fn from_rupiah(rupiah: i64) -> Self {
        Money(rupiah)
    }

    /// Returns the value in whole rupiah.
    #[inline]
    pub const fn rupiah(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Calculates tax with integer truncation.
    ///
    /// ## Truncation, not rounding
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────┐
    /// │  tax = amount × bps / 10000    (integer division, rounds to zero)  │
    /// │                                                                     │
    /// │  46000 × 1100 / 10000 = 5060                                        │
    /// │     99 × 1100 / 10000 = 10   (10.89 truncated)                      │
    /// │                                                                     │
    /// │  The kitchen display, receipt and cashier app all compute the same │
    /// │  number, so no "off by one rupiah" disputes at the counter.        │
    /// └─────────────────────────────────────────────────────────────────────┘
    /// ```
    ///
    /// ## Example
    /// ```rust
    /// use kaori_core::money::Money;
    /// use kaori_core::types::TaxRate;
    ///
    /// let tax = Money::from_rupiah(99).calculate_tax(TaxRate::from_bps(1100));
    /// assert_eq!(tax.rupiah(), 10);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        // i128 keeps large subtotals from overflowing before the division
        let tax = self.0 as i128 * rate.bps() as i128 / 10_000;
        Money::from_rupiah(tax as i64)
    }

    /// Multiplies money by a quantity, `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use kaori_core::money::Money;
    ///
    /// let unit_price = Money::from_rupiah(36_000);
    /// assert_eq!(unit_price.checked_multiply_quantity(2), Some(Money::from_rupiah(72_000)));
    /// assert_eq!(Money::from_rupiah(i64::MAX).checked_multiply_quantity(2), None);
    /// ```
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Adds two amounts, `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows the amount the way Indonesian receipts do: `Rp51.060`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}Rp{}", sign, grouped)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rupiah() {
        let money = Money::from_rupiah(18_000);
        assert_eq!(money.rupiah(), 18_000);
        assert!(!money.is_zero());
        assert!(!money.is_negative());
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_rupiah(51_060).to_string(), "Rp51.060");
        assert_eq!(Money::from_rupiah(500).to_string(), "Rp500");
        assert_eq!(Money::from_rupiah(1_250_000).to_string(), "Rp1.250.000");
        assert_eq!(Money::from_rupiah(-4_000).to_string(), "-Rp4.000");
        assert_eq!(Money::zero().to_string(), "Rp0");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_rupiah(28_000);
        let b = Money::from_rupiah(18_000);

        assert_eq!((a + b).rupiah(), 46_000);
        assert_eq!((a - b).rupiah(), 10_000);
        assert_eq!((a * 3).rupiah(), 84_000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.rupiah(), 64_000);
    }

    #[test]
    fn test_checked_arithmetic() {
        let big = Money::from_rupiah(i64::MAX / 2 + 1);
        assert_eq!(big.checked_multiply_quantity(2), None);
        assert_eq!(big.checked_add(big), None);

        let latte = Money::from_rupiah(28_000);
        assert_eq!(latte.checked_multiply_quantity(3), Some(Money::from_rupiah(84_000)));
        assert_eq!(latte.checked_add(latte), Some(Money::from_rupiah(56_000)));
    }

    #[test]
    fn test_tax_is_truncated() {
        let rate = TaxRate::from_bps(1100);
        assert_eq!(Money::from_rupiah(46_000).calculate_tax(rate).rupiah(), 5_060);
        // 10.89 → 10, never rounded up
        assert_eq!(Money::from_rupiah(99).calculate_tax(rate).rupiah(), 10);
        assert_eq!(Money::from_rupiah(9).calculate_tax(rate).rupiah(), 0);
    }

    #[test]
    fn test_tax_matches_integer_percent_formula() {
        // subtotal * 11 / 100 and subtotal * 1100 / 10000 agree for every amount
        for subtotal in [0_i64, 1, 9, 10, 99, 101, 18_000, 46_000, 123_457, 9_999_999] {
            let via_bps = Money::from_rupiah(subtotal).calculate_tax(TaxRate::ORDER);
            assert_eq!(via_bps.rupiah(), subtotal * 11 / 100, "subtotal {}", subtotal);
        }
    }

    #[test]
    fn test_serializes_as_plain_integer() {
        let json = serde_json::to_string(&Money::from_rupiah(51_060)).unwrap();
        assert_eq!(json, "51060");
    }
}
