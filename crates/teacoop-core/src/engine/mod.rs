//! # Domain Rule Engine
//!
//! Create / update / delete for every record type, plus the lifecycle
//! cascades between them.
//!
//! ## Mutation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   &Collections ──┐                                                      │
//! │   input payload ─┼──► engine op ──► Ok(Transition)                      │
//! │   MutationContext┘        │           ├── collections (new snapshot)    │
//! │                           │           ├── changed keys                  │
//! │                           │           ├── record id                     │
//! │                           │           └── cascades                      │
//! │                           │                                             │
//! │                           └──────► Err(CoreError)  (input untouched)    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Operations never mutate their input. The caller persists exactly the
//! collections listed in [`Transition::changed`].
//!
//! ## Lifecycle
//! ```text
//! Delivery: pending ──► processing ──► processed ──► sold
//!              └──── process_delivery ────┘
//!
//! Lot:      available ──► reserved ──► sold
//!              └──── record_sale ─────────┘
//! ```

mod buyer;
mod delivery;
mod farmer;
mod processing;
mod sale;

pub use buyer::{delete_buyer, register_buyer, update_buyer, BuyerInput};
pub use delivery::{delete_delivery, record_delivery, update_delivery, DeliveryInput};
pub use farmer::{delete_farmer, register_farmer, update_farmer, FarmerInput};
pub use processing::{
    delete_lot, process_delivery, processing_loss_pct, update_lot, LotInput, DEFAULT_PACKAGING,
    DEFAULT_QUALITY_SCORE,
};
pub use sale::{delete_sale, record_sale, update_sale, SaleInput, SaleUpdate, DEFAULT_SALE_PRICE};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::collections::{insert, CollectionKey, Collections, Record};
use crate::error::{CoreResult, ValidationError};
use crate::ids::IdGenerator;
use crate::money::Money;
use crate::types::{DeliveryStatus, LotStatus};
use crate::weight::Weight;

// =============================================================================
// Configuration
// =============================================================================

/// What a sale does to the status of the lot it draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LotSalePolicy {
    /// Any sale marks the lot `sold`, whatever the quantity.
    #[default]
    MarkSoldOnAnySale,
    /// The lot is marked `sold` once its sales add up to its output weight.
    TrackRemaining,
}

impl fmt::Display for LotSalePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LotSalePolicy::MarkSoldOnAnySale => "mark-sold-on-any-sale",
            LotSalePolicy::TrackRemaining => "track-remaining",
        })
    }
}

impl FromStr for LotSalePolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "mark-sold-on-any-sale" => Ok(LotSalePolicy::MarkSoldOnAnySale),
            "track-remaining" => Ok(LotSalePolicy::TrackRemaining),
            _ => Err(ValidationError::NotAllowed {
                field: "lot sale policy".to_string(),
                allowed: vec![
                    "mark-sold-on-any-sale".to_string(),
                    "track-remaining".to_string(),
                ],
            }),
        }
    }
}

/// Engine-wide rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    pub lot_sale_policy: LotSalePolicy,
}

/// Everything an operation needs besides the collections and the payload.
#[derive(Clone, Copy)]
pub struct MutationContext<'a> {
    /// Date stamped on new records.
    pub today: NaiveDate,
    pub ids: &'a dyn IdGenerator,
    pub config: &'a EngineConfig,
}

impl<'a> MutationContext<'a> {
    pub fn new(today: NaiveDate, ids: &'a dyn IdGenerator, config: &'a EngineConfig) -> Self {
        Self { today, ids, config }
    }
}

impl fmt::Debug for MutationContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutationContext")
            .field("today", &self.today)
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Transition
// =============================================================================

/// A status change an operation applied to a record other than the one it
/// created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Cascade {
    #[serde(rename_all = "camelCase")]
    DeliveryStatusChanged {
        delivery_id: String,
        from: DeliveryStatus,
        to: DeliveryStatus,
    },
    #[serde(rename_all = "camelCase")]
    LotStatusChanged {
        lot_id: String,
        from: LotStatus,
        to: LotStatus,
    },
}

/// The outcome of a successful operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub collections: Collections,
    pub changed: BTreeSet<CollectionKey>,
    /// Id of the created, updated or deleted record.
    pub record_id: String,
    pub cascades: Vec<Cascade>,
}

impl Transition {
    fn unchanged(collections: &Collections, record_id: &str) -> Self {
        Self {
            collections: collections.clone(),
            changed: BTreeSet::new(),
            record_id: record_id.to_string(),
            cascades: Vec::new(),
        }
    }

    /// True when nothing needs to be persisted.
    pub fn is_noop(&self) -> bool {
        self.changed.is_empty()
    }

    /// The newly created / updated record, looked up in the new snapshot.
    pub fn record<T: Record>(&self) -> Option<&T> {
        self.collections.find(&self.record_id)
    }
}

// =============================================================================
// Shared Operations
// =============================================================================

/// `price_per_kg × weight`, rejected when it does not fit in cents.
fn line_amount(price_per_kg: Money, weight: Weight) -> CoreResult<Money> {
    price_per_kg.checked_for_weight(weight).ok_or_else(|| {
        ValidationError::OutOfRange {
            field: "total amount (cents)".to_string(),
            min: i64::MIN,
            max: i64::MAX,
        }
        .into()
    })
}

/// Adds a new record to its collection.
fn create<T: Record>(collections: &Collections, record: T) -> Transition {
    let record_id = record.id().to_string();
    let mut next = collections.clone();
    insert(T::slot(&mut next), record);
    Transition {
        collections: next,
        changed: BTreeSet::from([T::KEY]),
        record_id,
        cascades: Vec::new(),
    }
}

/// Replaces the record with `id` by `edit(current)`.
///
/// An edit that produces an identical record yields an empty changed-set.
fn update<T, F>(collections: &Collections, id: &str, edit: F) -> CoreResult<Transition>
where
    T: Record,
    F: FnOnce(&T) -> CoreResult<T>,
{
    let current = collections.require::<T>(id)?;
    let edited = edit(current)?;
    if &edited == current {
        return Ok(Transition::unchanged(collections, id));
    }

    let mut next = collections.clone();
    if let Some(slot) = T::slot(&mut next).iter_mut().find(|r| r.id() == id) {
        *slot = edited;
    }
    Ok(Transition {
        collections: next,
        changed: BTreeSet::from([T::KEY]),
        record_id: id.to_string(),
        cascades: Vec::new(),
    })
}

/// Removes the record with `id`. Unknown ids are a no-op. Never cascades.
fn delete<T: Record>(collections: &Collections, id: &str) -> Transition {
    if collections.find::<T>(id).is_none() {
        return Transition::unchanged(collections, id);
    }
    let mut next = collections.clone();
    T::slot(&mut next).retain(|r| r.id() != id);
    Transition {
        collections: next,
        changed: BTreeSet::from([T::KEY]),
        record_id: id.to_string(),
        cascades: Vec::new(),
    }
}

// =============================================================================
// Test Fixtures
// =============================================================================
