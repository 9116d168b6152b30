//! # Money Module
//!
//! Provides the `Money` type for rent, commission and remittance amounts.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  With floats:                                                           │
//! │    1000.10 * 0.1 = 100.01000000000001                                  │
//! │    owner = 1000.10 - 100.01000000000001 = 900.0899999999999            │
//! │    owner + commission != gross once both are rounded for storage       │
//! │                                                                         │
//! │  OUR SOLUTION: Integer centavos                                         │
//! │    commission = round_half_up(100010 * 1000 / 10000) = 10001           │
//! │    owner      = 100010 - 10001                       = 90009           │
//! │    owner + commission == gross, always                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use imobi_core::money::Money;
//! use imobi_core::types::Percentage;
//!
//! let rent = Money::from_cents(150_000); // R$1500.00
//! let split = rent.split(Percentage::from_bps(1000)); // 10%
//!
//! assert_eq!(split.commission.cents(), 15_000);
//! assert_eq!(split.owner.cents(), 135_000);
//! assert_eq!(split.owner + split.commission, split.gross);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::Percentage;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in centavos (1/100 of the currency unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: a negative rent is representable so validation can
///   reject it with a proper error instead of the type silently wrapping
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Single currency**: there is no currency tag by design of the domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from centavos.
    ///
    /// ## Example
    /// ```rust
    /// use imobi_core::money::Money;
    ///
    /// let rent = Money::from_cents(120_050); // R$1200.50
    /// assert_eq!(rent.cents(), 120_050);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole units and centavos.
    ///
    /// For negative amounts only the major unit should be negative:
    /// `from_major_minor(-5, 50)` is -5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in centavos.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the centavo portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
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

    /// Adds two amounts, or `None` when the sum leaves the i64 range.
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(sum) => Some(Money(sum)),
            None => None,
        }
    }

    /// Applies a percentage and rounds to the nearest centavo.
    ///
    /// ## Rounding
    /// Half-up, ties away from zero: `(amount * bps ± 5000) / 10000` in i128.
    /// The result saturates at the i64 bounds for absurd rates.
    ///
    /// ## Example
    /// ```rust
    /// use imobi_core::money::Money;
    /// use imobi_core::types::Percentage;
    ///
    /// // 10.00 × 8.25% = 0.825 → 0.83
    /// let fee = Money::from_cents(1000).percentage_of(Percentage::from_bps(825));
    /// assert_eq!(fee.cents(), 83);
    /// ```
    pub fn percentage_of(&self, rate: Percentage) -> Money {
        let product = self.0 as i128 * rate.bps() as i128;
        let rounded = if product >= 0 {
            (product + 5000) / 10000
        } else {
            (product - 5000) / 10000
        };
        let cents = i64::try_from(rounded).unwrap_or(if rounded < 0 { i64::MIN } else { i64::MAX });
        Money(cents)
    }

    /// Splits a gross amount into agency commission and owner remittance.
    ///
    /// The commission is rounded once; the owner receives the exact
    /// remainder, so no centavo is ever lost between the two parts.
    ///
    /// ## User Workflow
    /// ```text
    /// Rent: 1000.00, administration fee 10%
    ///      │
    ///      ▼
    /// split(10%) ← THIS FUNCTION
    ///      │
    ///      ├── commission = 100.00 (agency)
    ///      └── owner      = 900.00 (remitted to the property owner)
    /// ```
    pub fn split(&self, rate: Percentage) -> CommissionSplit {
        let commission = self.percentage_of(rate);
        CommissionSplit {
            gross: *self,
            owner: *self - commission,
            commission,
        }
    }
}

// =============================================================================
// Commission Split
// =============================================================================

/// Result of [`Money::split`]. `owner + commission == gross` by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CommissionSplit {
    pub gross: Money,
    pub owner: Money,
    pub commission: Money,
}

// =============================================================================
// Parsing
// =============================================================================

/// Parses a plain decimal string into hundredths.
///
/// Accepts an optional leading `-`, ASCII digits, and at most two digits
/// after a `.`. Shared by [`Money`] (centavos) and [`Percentage`] (basis
/// points), which are both hundredths of their display unit.
pub(crate) fn parse_hundredths(input: &str, field: &str) -> Result<i64, ValidationError> {
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = input.trim();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let (whole, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    if whole.is_empty() && frac.is_empty() {
        return Err(invalid("expected a decimal number"));
    }
    if !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid("expected a decimal number"));
    }
    if frac.len() > 2 {
        return Err(invalid("at most two decimal places allowed"));
    }

    let whole_value: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid("number too large"))?
    };
    let frac_value: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().map_err(|_| invalid("expected a decimal number"))? * 10,
        _ => frac.parse().map_err(|_| invalid("expected a decimal number"))?,
    };

    let value = whole_value
        .checked_mul(100)
        .and_then(|v| v.checked_add(frac_value))
        .ok_or_else(|| invalid("number too large"))?;

    Ok(if negative { -value } else { value })
}

/// Parses `"1500"`, `"1500.5"` or `"1500.50"` into centavos.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hundredths(s, "amount").map(Money)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-oriented rendering, e.g. `R$1200.50`. Presentation formatting
/// belongs to the UI.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}R${}.{:02}", sign, self.major().abs(), self.minor())
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

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
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
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(10, 99).cents(), 1099);
        assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(120_050).to_string(), "R$1200.50");
        assert_eq!(Money::from_cents(500).to_string(), "R$5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-R$5.50");
        assert_eq!(Money::zero().to_string(), "R$0.00");
    }

    #[test]
    fn test_parse() {
        assert_eq!("1500".parse::<Money>().unwrap().cents(), 150_000);
        assert_eq!("1500.5".parse::<Money>().unwrap().cents(), 150_050);
        assert_eq!("1500.05".parse::<Money>().unwrap().cents(), 150_005);
        assert_eq!(" 0.99 ".parse::<Money>().unwrap().cents(), 99);
        assert_eq!(".5".parse::<Money>().unwrap().cents(), 50);
        assert_eq!("-3.25".parse::<Money>().unwrap().cents(), -325);

        assert!("".parse::<Money>().is_err());
        assert!("-".parse::<Money>().is_err());
        assert!(".".parse::<Money>().is_err());
        assert!("1.234".parse::<Money>().is_err());
        assert!("1,50".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("99999999999999999999".parse::<Money>().is_err());
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);

        let total: Money = [a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 2000);

        assert_eq!(a.checked_add(b), Some(Money::from_cents(1500)));
        assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
    }

    #[test]
    fn test_percentage_of_basic() {
        // 1000.00 at 10% = 100.00
        let rent = Money::from_cents(100_000);
        assert_eq!(rent.percentage_of(Percentage::from_bps(1000)).cents(), 10_000);
    }

    #[test]
    fn test_percentage_of_rounds_half_up() {
        // 10.00 at 8.25% = 0.825 → 0.83
        assert_eq!(Money::from_cents(1000).percentage_of(Percentage::from_bps(825)).cents(), 83);
        // 333.33 at 8.25% = 27.499725 → 27.50
        assert_eq!(Money::from_cents(33_333).percentage_of(Percentage::from_bps(825)).cents(), 2750);
        // 0.01 at 10% = 0.001 → 0.00
        assert_eq!(Money::from_cents(1).percentage_of(Percentage::from_bps(1000)).cents(), 0);
        // ties away from zero on negative amounts
        assert_eq!(Money::from_cents(-1000).percentage_of(Percentage::from_bps(825)).cents(), -83);
    }

    #[test]
    fn test_split_is_exact() {
        let rents = [0, 1, 99, 100_010, 123_457, 33_333, 999_999_99];
        let rates = [0, 1, 333, 825, 1000, 1250, 3333, 10000];

        for cents in rents {
            for bps in rates {
                let split = Money::from_cents(cents).split(Percentage::from_bps(bps));
                assert_eq!(
                    split.owner + split.commission,
                    split.gross,
                    "rent {} at {} bps",
                    cents,
                    bps
                );
            }
        }
    }

    #[test]
    fn test_split_full_and_zero_commission() {
        let rent = Money::from_cents(250_000);

        let none = rent.split(Percentage::zero());
        assert!(none.commission.is_zero());
        assert_eq!(none.owner, rent);

        let all = rent.split(Percentage::from_bps(10_000));
        assert_eq!(all.commission, rent);
        assert!(all.owner.is_zero());
    }
}
