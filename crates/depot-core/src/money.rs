//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  The backend stores prices as numeric(10,2) and ships them as JSON     │
//! │  numbers. Summing them as f64:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: parse once at the boundary into integer centavos,       │
//! │  do every sum and product on i64, format back with two decimals.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use depot_core::money::Money;
//!
//! let price = Money::parse_decimal("50.00").unwrap();
//! let line = price.multiply_quantity(2);
//!
//! assert_eq!(line.to_decimal_string(), "100.00");
//! assert_eq!(line.to_string(), "R$ 100.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in centavos (the smallest currency unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: sums never overflow for realistic report periods
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Serialized as cents**: the presentation layer formats it
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole units and cents.
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` is -5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a quantity, saturating at the `i64`
    /// bounds. Rows from the backend are checked with
    /// [`Money::checked_multiply_quantity`] before they get here.
    ///
    /// ## Example
    /// ```rust
    /// use depot_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(1250);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 3750);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// `None` when the line total does not fit in `i64` cents.
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Parses a plain decimal string such as `"50"`, `"50.5"` or `"-3.25"`.
    ///
    /// ## Rules
    /// - Optional leading `-`
    /// - Digits, optionally followed by `.` and more digits
    /// - A trailing exponent (`1e2`, as serde_json may print for large
    ///   floats) is rejected
    /// - More than two fraction digits round half away from zero
    ///
    /// Returns `None` for anything else, including the empty string.
    ///
    /// ## Example
    /// ```rust
    /// use depot_core::money::Money;
    ///
    /// assert_eq!(Money::parse_decimal("12.5"), Some(Money::from_cents(1250)));
    /// assert_eq!(Money::parse_decimal("0.005"), Some(Money::from_cents(1)));
    /// assert_eq!(Money::parse_decimal("abc"), None);
    /// ```
    pub fn parse_decimal(input: &str) -> Option<Money> {
        let input = input.trim();
        let (negative, digits) = match input.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, input),
        };

        let (whole, fraction) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return None;
        }
        if !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return None;
        }

        let whole_value: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().ok()?
        };

        // First two fraction digits are cents, the third decides rounding
        let mut frac_digits = fraction.bytes().map(|b| i64::from(b - b'0'));
        let tens = frac_digits.next().unwrap_or(0);
        let ones = frac_digits.next().unwrap_or(0);
        let round_up = frac_digits.next().is_some_and(|d| d >= 5);

        let mut cents = whole_value.checked_mul(100)?.checked_add(tens * 10 + ones)?;
        if round_up {
            cents = cents.checked_add(1)?;
        }

        Some(Money(if negative { -cents } else { cents }))
    }

    /// Formats as a plain decimal with exactly two fraction digits and no
    /// grouping separators (`"1234.50"`, `"-0.05"`).
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Human-readable form with the Brazilian real symbol. Use
/// `ConsoleConfig::format_currency` when the symbol is configurable.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R$ {}", self.to_decimal_string())
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal_plain_and_fractional() {
        assert_eq!(Money::parse_decimal("50"), Some(Money::from_cents(5000)));
        assert_eq!(Money::parse_decimal("50.0"), Some(Money::from_cents(5000)));
        assert_eq!(Money::parse_decimal("50.00"), Some(Money::from_cents(5000)));
        assert_eq!(Money::parse_decimal("7.5"), Some(Money::from_cents(750)));
        assert_eq!(Money::parse_decimal(".25"), Some(Money::from_cents(25)));
        assert_eq!(Money::parse_decimal("-3.25"), Some(Money::from_cents(-325)));
    }

    #[test]
    fn test_parse_decimal_rounds_third_digit() {
        assert_eq!(Money::parse_decimal("1.004"), Some(Money::from_cents(100)));
        assert_eq!(Money::parse_decimal("1.005"), Some(Money::from_cents(101)));
        assert_eq!(Money::parse_decimal("-1.005"), Some(Money::from_cents(-101)));
    }

    #[test]
    fn test_parse_decimal_rejects_garbage() {
        assert_eq!(Money::parse_decimal(""), None);
        assert_eq!(Money::parse_decimal("-"), None);
        assert_eq!(Money::parse_decimal("."), None);
        assert_eq!(Money::parse_decimal("1,50"), None);
        assert_eq!(Money::parse_decimal("1e2"), None);
        assert_eq!(Money::parse_decimal("R$ 5"), None);
    }

    #[test]
    fn test_to_decimal_string() {
        assert_eq!(Money::from_cents(0).to_decimal_string(), "0.00");
        assert_eq!(Money::from_cents(5).to_decimal_string(), "0.05");
        assert_eq!(Money::from_cents(123456).to_decimal_string(), "1234.56");
        assert_eq!(Money::from_cents(-5).to_decimal_string(), "-0.05");
    }

    #[test]
    fn test_display_uses_real_symbol() {
        assert_eq!(Money::from_cents(10000).to_string(), "R$ 100.00");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_major_minor(10, 50);
        let b = Money::from_cents(250);
        assert_eq!((a + b).cents(), 1300);
        assert_eq!((a - b).cents(), 800);
        assert_eq!((b * 4).cents(), 1000);

        let total: Money = [a, b, b].iter().sum();
        assert_eq!(total.cents(), 1550);
        assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    }

    #[test]
    fn test_overflow_saturates_and_checked_reports_it() {
        let huge = Money::from_cents(9_999_999_999);
        assert_eq!(huge.checked_multiply_quantity(2_147_483_647), None);
        assert_eq!(huge.multiply_quantity(2_147_483_647).cents(), i64::MAX);
        assert_eq!(huge.checked_multiply_quantity(3), Some(Money::from_cents(29_999_999_997)));

        let max = Money::from_cents(i64::MAX);
        assert_eq!(max.checked_add(Money::from_cents(1)), None);
        assert_eq!((max + Money::from_cents(1)).cents(), i64::MAX);
        let total: Money = [max, max].iter().sum();
        assert_eq!(total.cents(), i64::MAX);
    }
}
