//! # Domain Types
//!
//! The five record types of the cooperative ledger and their status enums.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────┐   ┌──────────────┐   ┌────────────────┐              │
//! │  │   Farmer     │◄──│  Delivery    │◄──│ ProcessedLot   │              │
//! │  │  F…          │   │  IB…         │   │  PB…           │              │
//! │  │  status      │   │  raw weight  │   │  output weight │              │
//! │  │  preference  │   │  price/kg    │   │  loss %        │              │
//! │  └──────────────┘   └──────────────┘   └───────▲────────┘              │
//! │                                                │                        │
//! │  ┌──────────────┐   ┌──────────────┐           │                        │
//! │  │   Buyer      │◄──│    Sale      │───────────┘                        │
//! │  │  B…          │   │  S…          │                                    │
//! │  └──────────────┘   └──────────────┘                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Child records copy display fields from their parents at creation time
//! (`farmer_name`, `buyer_name`, `grade`). Those copies are frozen: renaming a
//! farmer does not rewrite old deliveries.
//!
//! ## Units
//! Money fields end in `_cents`, weights in `_grams`. Accessors return the
//! [`Money`] / [`Weight`] wrappers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::weight::Weight;

// =============================================================================
// Enum Helpers
// =============================================================================

/// Implements `Display` and `FromStr` with the wire spelling of each variant.
macro_rules! wire_enum {
    ($ty:ident, $field:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            /// All variants, in declaration order.
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            /// The serialized spelling of this variant.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                $(
                    if s.eq_ignore_ascii_case($text) {
                        return Ok($ty::$variant);
                    }
                )+
                Err(ValidationError::NotAllowed {
                    field: $field.to_string(),
                    allowed: vec![$($text.to_string()),+],
                })
            }
        }
    };
}

// =============================================================================
// Tea Grade
// =============================================================================

/// Leaf quality grade assigned at delivery and again after processing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub enum TeaGrade {
    #[default]
    A,
    B,
    C,
}

wire_enum!(TeaGrade, "grade", { A => "A", B => "B", C => "C" });

impl TeaGrade {
    /// Display label used by charts ("Grade A").
    pub fn label(&self) -> String {
        format!("Grade {}", self.as_str())
    }
}

// =============================================================================
// Statuses
// =============================================================================

/// Whether a farmer or buyer is currently trading with the cooperative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PartyStatus {
    #[default]
    Active,
    Inactive,
}

wire_enum!(PartyStatus, "status", { Active => "active", Inactive => "inactive" });

/// What the farmer wants done with their processed tea.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum OutputPreference {
    SelfCollect,
    #[default]
    CoopSell,
}

wire_enum!(OutputPreference, "output preference", {
    SelfCollect => "self-collect",
    CoopSell => "coop-sell",
});

/// Lifecycle of an incoming delivery.
///
/// ```text
/// pending ──► processing ──► processed ──► sold
///    │                          ▲
///    └──────────────────────────┘  (processing a lot forces `processed`)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    #[default]
    Pending,
    Processing,
    Processed,
    Sold,
}

wire_enum!(DeliveryStatus, "delivery status", {
    Pending => "pending",
    Processing => "processing",
    Processed => "processed",
    Sold => "sold",
});

impl DeliveryStatus {
    /// Only deliveries that have not been turned into a lot may be processed.
    pub const fn is_processable(&self) -> bool {
        matches!(self, DeliveryStatus::Pending | DeliveryStatus::Processing)
    }
}

/// Stock status of a processed lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum LotStatus {
    #[default]
    Available,
    Reserved,
    Sold,
}

wire_enum!(LotStatus, "lot status", {
    Available => "available",
    Reserved => "reserved",
    Sold => "sold",
});

/// How far a buyer has paid for a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Partial,
    Paid,
}

wire_enum!(PaymentStatus, "payment status", {
    Pending => "pending",
    Partial => "partial",
    Paid => "paid",
});

// =============================================================================
// Farmer
// =============================================================================

/// A cooperative member who delivers green leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Farmer {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub location: String,
    #[ts(as = "String")]
    pub registration_date: NaiveDate,
    pub status: PartyStatus,
    pub output_preference: OutputPreference,
    /// Cumulative delivered weight. Not editable through the farmer form.
    pub total_delivered_grams: i64,
    /// Amount owed to the farmer. Not editable through the farmer form.
    pub balance_cents: i64,
}

impl Farmer {
    #[inline]
    pub fn total_delivered(&self) -> Weight {
        Weight::from_grams(self.total_delivered_grams)
    }

    #[inline]
    pub fn balance(&self) -> Money {
        Money::from_cents(self.balance_cents)
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == PartyStatus::Active
    }
}

// =============================================================================
// Delivery
// =============================================================================

/// A batch of raw leaf brought in by a farmer (an "incoming batch").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    pub id: String,
    pub farmer_id: String,
    /// Farmer name at time of delivery (frozen).
    pub farmer_name: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub raw_weight_grams: i64,
    pub grade: TeaGrade,
    /// Moisture content, 0-100 %.
    pub moisture_pct: u8,
    pub price_per_kg_cents: i64,
    /// raw weight × price per kg.
    pub total_amount_cents: i64,
    pub status: DeliveryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Delivery {
    #[inline]
    pub fn raw_weight(&self) -> Weight {
        Weight::from_grams(self.raw_weight_grams)
    }

    #[inline]
    pub fn price_per_kg(&self) -> Money {
        Money::from_cents(self.price_per_kg_cents)
    }

    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }
}

// =============================================================================
// Processed Lot
// =============================================================================

/// Made tea produced from one delivery (a "processed batch").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedLot {
    pub id: String,
    /// Source delivery.
    pub delivery_id: String,
    /// Copied from the source delivery (frozen).
    pub farmer_id: String,
    pub farmer_name: String,
    #[ts(as = "String")]
    pub processed_date: NaiveDate,
    /// Source delivery's raw weight at processing time; never changes afterwards.
    pub input_weight_grams: i64,
    pub output_weight_grams: i64,
    pub grade: TeaGrade,
    /// round((input - output) / input × 100)
    pub processing_loss_pct: i64,
    /// 0-100.
    pub quality_score: u8,
    pub packaging_type: String,
    pub status: LotStatus,
}

impl ProcessedLot {
    #[inline]
    pub fn input_weight(&self) -> Weight {
        Weight::from_grams(self.input_weight_grams)
    }

    #[inline]
    pub fn output_weight(&self) -> Weight {
        Weight::from_grams(self.output_weight_grams)
    }

    /// Share of input weight that survived processing.
    #[inline]
    pub fn efficiency_pct(&self) -> i64 {
        100 - self.processing_loss_pct
    }
}

// =============================================================================
// Buyer
// =============================================================================

/// A company that purchases processed tea.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Buyer {
    pub id: String,
    pub company_name: String,
    pub contact_person: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    #[ts(as = "String")]
    pub registration_date: NaiveDate,
    /// Cumulative purchases. Not editable through the buyer form.
    pub total_purchases_cents: i64,
    pub status: PartyStatus,
}

impl Buyer {
    #[inline]
    pub fn total_purchases(&self) -> Money {
        Money::from_cents(self.total_purchases_cents)
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == PartyStatus::Active
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A quantity of a processed lot sold to a buyer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    pub buyer_id: String,
    /// Buyer company name at time of sale (frozen).
    pub buyer_name: String,
    pub lot_id: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub quantity_grams: i64,
    /// Lot grade at time of sale (frozen).
    pub grade: TeaGrade,
    pub price_per_kg_cents: i64,
    /// quantity × price per kg.
    pub total_amount_cents: i64,
    pub payment_status: PaymentStatus,
    /// Lot's farmer at time of sale (frozen).
    pub farmer_id: String,
    pub farmer_name: String,
}

impl Sale {
    #[inline]
    pub fn quantity(&self) -> Weight {
        Weight::from_grams(self.quantity_grams)
    }

    #[inline]
    pub fn price_per_kg(&self) -> Money {
        Money::from_cents(self.price_per_kg_cents)
    }

    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }

    #[inline]
    pub fn is_outstanding(&self) -> bool {
        self.payment_status != PaymentStatus::Paid
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_wire_spelling() {
        assert_eq!(
            serde_json::to_string(&OutputPreference::SelfCollect).unwrap(),
            "\"self-collect\""
        );
        assert_eq!(serde_json::to_string(&DeliveryStatus::Processed).unwrap(), "\"processed\"");
        assert_eq!(serde_json::to_string(&TeaGrade::B).unwrap(), "\"B\"");
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("coop-sell".parse::<OutputPreference>().unwrap(), OutputPreference::CoopSell);
        assert_eq!("Paid".parse::<PaymentStatus>().unwrap(), PaymentStatus::Paid);
        assert_eq!("a".parse::<TeaGrade>().unwrap(), TeaGrade::A);
        assert_eq!("C".parse::<TeaGrade>().unwrap(), TeaGrade::C);

        let err = "archived".parse::<LotStatus>().unwrap_err();
        assert!(matches!(err, ValidationError::NotAllowed { .. }));
    }

    #[test]
    fn test_processable_statuses() {
        assert!(DeliveryStatus::Pending.is_processable());
        assert!(DeliveryStatus::Processing.is_processable());
        assert!(!DeliveryStatus::Processed.is_processable());
        assert!(!DeliveryStatus::Sold.is_processable());
    }

    #[test]
    fn test_grade_label() {
        assert_eq!(TeaGrade::A.label(), "Grade A");
    }

    #[test]
    fn test_delivery_serializes_camel_case() {
        let delivery = Delivery {
            id: "IB001".to_string(),
            farmer_id: "F001".to_string(),
            farmer_name: "James Mwangi".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            raw_weight_grams: 250_000,
            grade: TeaGrade::A,
            moisture_pct: 72,
            price_per_kg_cents: 8_500,
            total_amount_cents: 2_125_000,
            status: DeliveryStatus::Processed,
            notes: None,
        };

        let json = serde_json::to_value(&delivery).unwrap();
        assert_eq!(json["farmerId"], "F001");
        assert_eq!(json["rawWeightGrams"], 250_000);
        assert_eq!(json["date"], "2024-01-15");
        assert!(json.get("notes").is_none());
    }
}
