//! # Weight Module
//!
//! Integer weights in grams. Same reasoning as [`crate::money`]: deliveries,
//! lot outputs and sale quantities are summed and compared constantly, so they
//! are stored as whole grams and only shown as kilograms.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::parse_fixed;

/// Grams in one kilogram.
pub const GRAMS_PER_KG: i64 = 1000;

/// A weight in grams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Weight(i64);

impl Weight {
    #[inline]
    pub const fn from_grams(grams: i64) -> Self {
        Weight(grams)
    }

    #[inline]
    pub const fn from_kg(kg: i64) -> Self {
        Weight(kg * GRAMS_PER_KG)
    }

    #[inline]
    pub const fn grams(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Weight(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Kilograms as a float, for display and chart output only.
    #[inline]
    pub fn as_kg_f64(&self) -> f64 {
        self.0 as f64 / GRAMS_PER_KG as f64
    }

    /// Difference clamped at zero (e.g. remaining stock after oversold sales).
    #[inline]
    pub fn saturating_sub(self, other: Weight) -> Weight {
        Weight((self.0 - other.0).max(0))
    }
}

/// Displays kilograms with up to three decimals: `62.5 kg`, `100 kg`.
impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let whole = (self.0 / GRAMS_PER_KG).abs();
        let fraction = (self.0 % GRAMS_PER_KG).abs();
        if fraction == 0 {
            write!(f, "{}{} kg", sign, whole)
        } else {
            let digits = format!("{:03}", fraction);
            write!(f, "{}{}.{} kg", sign, whole, digits.trim_end_matches('0'))
        }
    }
}

/// Parses a kilogram amount such as `"62.5"` into grams.
impl FromStr for Weight {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_fixed(s, 3, "weight").map(Weight::from_grams)
    }
}

impl Default for Weight {
    fn default() -> Self {
        Weight::zero()
    }
}

impl Add for Weight {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Weight(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Weight {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Weight {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Weight(self.0.saturating_sub(other.0))
    }
}

impl Sum for Weight {
    fn sum<I: Iterator<Item = Weight>>(iter: I) -> Self {
        iter.fold(Weight::zero(), |acc, w| acc + w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Weight::from_kg(100).to_string(), "100 kg");
        assert_eq!(Weight::from_grams(62_500).to_string(), "62.5 kg");
        assert_eq!(Weight::from_grams(1_005).to_string(), "1.005 kg");
    }

    #[test]
    fn test_parse_kilograms() {
        assert_eq!("62.5".parse::<Weight>().unwrap(), Weight::from_grams(62_500));
        assert_eq!("250".parse::<Weight>().unwrap(), Weight::from_kg(250));
        assert!("0.0001".parse::<Weight>().is_err());
        assert!("heavy".parse::<Weight>().is_err());
    }

    #[test]
    fn test_saturating_sub() {
        let output = Weight::from_kg(30);
        assert_eq!(output.saturating_sub(Weight::from_kg(10)), Weight::from_kg(20));
        assert_eq!(output.saturating_sub(Weight::from_kg(45)), Weight::zero());
    }
}
