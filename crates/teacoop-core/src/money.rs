//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Farmer balances are summed over hundreds of deliveries, so every       │
//! │  drifting fraction ends up on somebody's payout slip.                   │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    85.00 per kg is stored as 8500 cents                                 │
//! │    Amounts for fractional weights are rounded once, to the cent        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use teacoop_core::money::Money;
//! use teacoop_core::weight::Weight;
//!
//! let price_per_kg = Money::from_major(85);
//! let delivered = Weight::from_kg(250);
//!
//! let total = price_per_kg.for_weight(delivered);
//! assert_eq!(total, Money::from_major(21_250));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::weight::{Weight, GRAMS_PER_KG};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: margins can go negative
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Serialized as the raw cent count** so stored payloads stay exact
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use teacoop_core::money::Money;
    ///
    /// let price = Money::from_cents(8550); // 85.50
    /// assert_eq!(price.cents(), 8550);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole currency units.
    #[inline]
    pub const fn from_major(units: i64) -> Self {
        Money(units * 100)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit portion (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
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

    /// Treats `self` as a price per kilogram and returns the amount owed for `weight`.
    ///
    /// ## Rounding
    /// `price_cents × grams / 1000`, rounded half away from zero to the cent.
    /// Whole-kilogram weights never round.
    ///
    /// ## Example
    /// ```rust
    /// use teacoop_core::money::Money;
    /// use teacoop_core::weight::Weight;
    ///
    /// let price = Money::from_major(450);
    /// assert_eq!(price.for_weight(Weight::from_kg(10)), Money::from_major(4_500));
    ///
    /// // 62.5 kg × 400.00
    /// assert_eq!(
    ///     Money::from_major(400).for_weight(Weight::from_grams(62_500)),
    ///     Money::from_major(25_000)
    /// );
    /// ```
    pub fn for_weight(&self, weight: Weight) -> Money {
        let cents = self.weight_product(weight);
        Money::from_cents(cents.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }

    /// Like [`Money::for_weight`], but `None` when the amount does not fit in cents.
    pub fn checked_for_weight(&self, weight: Weight) -> Option<Money> {
        i64::try_from(self.weight_product(weight))
            .ok()
            .map(Money::from_cents)
    }

    fn weight_product(&self, weight: Weight) -> i128 {
        // i128: price × grams overflows i64 for large stock values
        let product = self.0 as i128 * weight.grams() as i128;
        let divisor = GRAMS_PER_KG as i128;
        let half = divisor / 2;
        if product >= 0 {
            (product + half) / divisor
        } else {
            (product - half) / divisor
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows a plain two-decimal amount; currency symbols are the UI's job.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.cents_part())
    }
}

/// Parses user input such as `"85"`, `"85.5"` or `"85.50"` without touching floats.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_fixed(s, 2, "amount").map(Money::from_cents)
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

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Fixed-point Parsing
// =============================================================================

/// Parses a non-negative decimal string into an integer scaled by `10^scale`.
///
/// Shared by [`Money`] (scale 2) and [`Weight`] (scale 3).
pub(crate) fn parse_fixed(input: &str, scale: u32, field: &str) -> Result<i64, ValidationError> {
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: reason.to_string(),
    };

    let input = input.trim();
    if input.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    let (whole, fraction) = match input.split_once('.') {
        Some((w, f)) => (w, f),
        None => (input, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid("expected a number"));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("expected a non-negative decimal number"));
    }
    if fraction.len() > scale as usize {
        return Err(invalid(&format!("at most {} decimal places allowed", scale)));
    }

    let factor = 10_i64.pow(scale);
    let whole: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid("number is too large"))?
    };
    let padded = format!("{:0<width$}", fraction, width = scale as usize);
    let fraction: i64 = if padded.is_empty() {
        0
    } else {
        padded.parse().map_err(|_| invalid("expected a number"))?
    };

    whole
        .checked_mul(factor)
        .and_then(|w| w.checked_add(fraction))
        .ok_or_else(|| invalid("number is too large"))
}

// =============================================================================
// Unit Tests
// =============================================================================
