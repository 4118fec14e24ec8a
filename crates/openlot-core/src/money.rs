//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    A $12,000.50 car is 1_200_050 cents, exactly.                        │
//! │    The database, the checkout total, and the API all use cents.         │
//! │    Only display formatting converts to dollars.                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use openlot_core::money::Money;
//!
//! // Create from cents (preferred)
//! let price = Money::from_cents(1_200_050); // $12,000.50
//!
//! // Parse user input
//! let parsed = Money::parse("12000.50").unwrap();
//! assert_eq!(parsed, price);
//!
//! // Arithmetic
//! let total = price + Money::from_cents(500_000);
//! assert_eq!(total.cents(), 1_700_050);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use crate::error::ValidationError;
use crate::MAX_PRICE_CENTS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents for USD).
///
/// ## Design Decisions
/// - **i64 (signed)**: Room for large sums; refunds would be negative
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use openlot_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99 for positive values).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero money.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks whether the value is a valid listing price.
    ///
    /// ## Rules
    /// - Strictly positive (free cars are data-entry errors)
    /// - At most [`MAX_PRICE_CENTS`]
    pub fn validate_price(&self) -> Result<(), ValidationError> {
        if self.0 <= 0 {
            return Err(ValidationError::OutOfRange {
                field: "price",
                min: 1,
                max: MAX_PRICE_CENTS,
            });
        }
        if self.0 > MAX_PRICE_CENTS {
            return Err(ValidationError::OutOfRange {
                field: "price",
                min: 1,
                max: MAX_PRICE_CENTS,
            });
        }
        Ok(())
    }

    /// Parses a user-entered decimal amount into Money.
    ///
    /// Accepts `"12000"`, `"12000.5"`, `"12000.50"` and tolerates thousands
    /// separators (`"12,000.50"`). At most two fractional digits.
    ///
    /// ## Example
    /// ```rust
    /// use openlot_core::money::Money;
    ///
    /// assert_eq!(Money::parse("12000").unwrap().cents(), 1_200_000);
    /// assert_eq!(Money::parse("12,000.50").unwrap().cents(), 1_200_050);
    /// assert!(Money::parse("12.345").is_err());
    /// assert!(Money::parse("-5").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let cleaned: String = input.trim().chars().filter(|c| *c != ',').collect();

        if cleaned.is_empty() {
            return Err(ValidationError::Required { field: "price" });
        }

        let invalid = || ValidationError::InvalidFormat {
            field: "price",
            reason: "must be a number like 12000 or 12000.50",
        };

        let (whole, frac) = match cleaned.split_once('.') {
            Some((w, f)) => (w, f),
            None => (cleaned.as_str(), ""),
        };

        if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if frac.len() > 2 || !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let dollars: i64 = whole.parse().map_err(|_| invalid())?;

        // "5" after the point means 50 cents, not 5
        let cents: i64 = if frac.is_empty() {
            0
        } else if frac.len() == 1 {
            frac.parse::<i64>().map_err(|_| invalid())? * 10
        } else {
            frac.parse().map_err(|_| invalid())?
        };

        let money = Money(
            dollars
                .checked_mul(100)
                .and_then(|d| d.checked_add(cents))
                .ok_or_else(invalid)?,
        );
        money.validate_price()?;
        Ok(money)
    }

    /// Formats the value for display with a currency code.
    ///
    /// ## Example
    /// ```rust
    /// use openlot_core::money::Money;
    ///
    /// let price = Money::from_cents(1_200_050);
    /// assert_eq!(price.display("USD"), "USD 12,000.50");
    /// ```
    pub fn display(&self, currency: &str) -> String {
        format!("{} {}", currency, self)
    }
}

impl fmt::Display for Money {
    /// Formats as `12,000.50` with thousands separators.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let negative = self.0 < 0;
        let dollars = self.dollars().abs();
        let cents = self.cents_part();

        // Insert separators every three digits, right to left
        let digits = dollars.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }

        if negative {
            write!(f, "-{}.{:02}", grouped, cents)
        } else {
            write!(f, "{}.{:02}", grouped, cents)
        }
    }
}

// =============================================================================
// Arithmetic
// =============================================================================

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
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
    fn test_from_cents() {
        let m = Money::from_cents(1099);
        assert_eq!(m.cents(), 1099);
        assert_eq!(m.dollars(), 10);
        assert_eq!(m.cents_part(), 99);
    }

    #[test]
    fn test_parse_whole_dollars() {
        assert_eq!(Money::parse("12000").unwrap().cents(), 1_200_000);
    }

    #[test]
    fn test_parse_with_cents() {
        assert_eq!(Money::parse("12000.50").unwrap().cents(), 1_200_050);
        assert_eq!(Money::parse("12000.5").unwrap().cents(), 1_200_050);
    }

    #[test]
    fn test_parse_with_separators() {
        assert_eq!(Money::parse("12,000.50").unwrap().cents(), 1_200_050);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Money::parse("").is_err());
        assert!(Money::parse("abc").is_err());
        assert!(Money::parse("12.345").is_err());
        assert!(Money::parse("-5").is_err());
        assert!(Money::parse("0").is_err()); // price must be positive
    }

    #[test]
    fn test_parse_rejects_absurd_price() {
        assert!(Money::parse("999999999999").is_err());
    }

    #[test]
    fn test_display_formatting() {
        assert_eq!(Money::from_cents(1_200_050).to_string(), "12,000.50");
        assert_eq!(Money::from_cents(999).to_string(), "9.99");
        assert_eq!(Money::from_cents(100_000_000).to_string(), "1,000,000.00");
        assert_eq!(Money::from_cents(1_200_050).display("USD"), "USD 12,000.50");
    }

    #[test]
    fn test_sum() {
        let total: Money = [10_000, 5_000]
            .iter()
            .map(|c| Money::from_cents(*c))
            .sum();
        assert_eq!(total.cents(), 15_000);
    }
}
