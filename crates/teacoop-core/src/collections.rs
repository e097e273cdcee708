//! # Collections
//!
//! The five independently stored record sequences and the [`Record`] trait
//! that ties each record type to its storage key.
//!
//! ```text
//! ┌──────────────────┬──────────────────┬────────┬─────────────────────┐
//! │ CollectionKey    │ storage key      │ prefix │ new records go      │
//! ├──────────────────┼──────────────────┼────────┼─────────────────────┤
//! │ Farmers          │ farmers          │ F      │ appended            │
//! │ Deliveries       │ incomingBatches  │ IB     │ prepended           │
//! │ ProcessedLots    │ processedBatches │ PB     │ prepended           │
//! │ Buyers           │ buyers           │ B      │ appended            │
//! │ Sales            │ sales            │ S      │ prepended           │
//! └──────────────────┴──────────────────┴────────┴─────────────────────┘
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::types::{Buyer, Delivery, Farmer, ProcessedLot, Sale};

// =============================================================================
// Collection Key
// =============================================================================

/// Names one of the five stored collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CollectionKey {
    Farmers,
    Deliveries,
    ProcessedLots,
    Buyers,
    Sales,
}

impl CollectionKey {
    pub const ALL: &'static [CollectionKey] = &[
        CollectionKey::Farmers,
        CollectionKey::Deliveries,
        CollectionKey::ProcessedLots,
        CollectionKey::Buyers,
        CollectionKey::Sales,
    ];

    /// Key under which the collection is persisted.
    pub const fn storage_key(&self) -> &'static str {
        match self {
            CollectionKey::Farmers => "farmers",
            CollectionKey::Deliveries => "incomingBatches",
            CollectionKey::ProcessedLots => "processedBatches",
            CollectionKey::Buyers => "buyers",
            CollectionKey::Sales => "sales",
        }
    }

    /// Prefix of generated ids.
    pub const fn id_prefix(&self) -> &'static str {
        match self {
            CollectionKey::Farmers => "F",
            CollectionKey::Deliveries => "IB",
            CollectionKey::ProcessedLots => "PB",
            CollectionKey::Buyers => "B",
            CollectionKey::Sales => "S",
        }
    }

    /// Entity name used in "not found" messages.
    pub const fn entity_name(&self) -> &'static str {
        match self {
            CollectionKey::Farmers => "farmer",
            CollectionKey::Deliveries | CollectionKey::ProcessedLots => "batch",
            CollectionKey::Buyers => "buyer",
            CollectionKey::Sales => "sale",
        }
    }

    /// Whether new records are inserted at the front.
    pub const fn prepends(&self) -> bool {
        matches!(
            self,
            CollectionKey::Deliveries | CollectionKey::ProcessedLots | CollectionKey::Sales
        )
    }

    pub fn from_storage_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.storage_key() == key)
    }
}

impl fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.storage_key())
    }
}

/// Accepts storage keys and the short names used on the command line.
impl FromStr for CollectionKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        if let Some(found) = Self::from_storage_key(key) {
            return Ok(found);
        }
        match key.to_ascii_lowercase().as_str() {
            "farmer" | "farmers" => Ok(CollectionKey::Farmers),
            "delivery" | "deliveries" => Ok(CollectionKey::Deliveries),
            "lot" | "lots" | "processing" => Ok(CollectionKey::ProcessedLots),
            "buyer" | "buyers" => Ok(CollectionKey::Buyers),
            "sale" | "sales" => Ok(CollectionKey::Sales),
            _ => Err(ValidationError::NotAllowed {
                field: "collection".to_string(),
                allowed: ["farmers", "deliveries", "lots", "buyers", "sales"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            }),
        }
    }
}

// =============================================================================
// Record Trait
// =============================================================================

/// A stored record type.
pub trait Record: Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The collection this record type lives in.
    const KEY: CollectionKey;

    fn id(&self) -> &str;

    /// Borrows this record type's sequence out of `collections`.
    fn slice(collections: &Collections) -> &[Self];

    /// Mutable access to this record type's sequence.
    fn slot(collections: &mut Collections) -> &mut Vec<Self>;
}

macro_rules! impl_record {
    ($ty:ty, $key:expr, $field:ident) => {
        impl Record for $ty {
            const KEY: CollectionKey = $key;

            fn id(&self) -> &str {
                &self.id
            }

            fn slice(collections: &Collections) -> &[Self] {
                &collections.$field
            }

            fn slot(collections: &mut Collections) -> &mut Vec<Self> {
                &mut collections.$field
            }
        }
    };
}

impl_record!(Farmer, CollectionKey::Farmers, farmers);
impl_record!(Delivery, CollectionKey::Deliveries, deliveries);
impl_record!(ProcessedLot, CollectionKey::ProcessedLots, lots);
impl_record!(Buyer, CollectionKey::Buyers, buyers);
impl_record!(Sale, CollectionKey::Sales, sales);

// =============================================================================
// Collections
// =============================================================================

/// A snapshot of all five collections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collections {
    pub farmers: Vec<Farmer>,
    pub deliveries: Vec<Delivery>,
    pub lots: Vec<ProcessedLot>,
    pub buyers: Vec<Buyer>,
    pub sales: Vec<Sale>,
}

impl Collections {
    pub fn get<T: Record>(&self) -> &[T] {
        T::slice(self)
    }

    /// Looks up a record by id.
    pub fn find<T: Record>(&self, id: &str) -> Option<&T> {
        T::slice(self).iter().find(|r| r.id() == id)
    }

    /// Looks up a record by id, failing with `"<entity> not found: <id>"`.
    pub fn require<T: Record>(&self, id: &str) -> Result<&T, ValidationError> {
        self.find(id)
            .ok_or_else(|| ValidationError::unknown(T::KEY.entity_name(), id))
    }

    pub fn farmer(&self, id: &str) -> Option<&Farmer> {
        self.find(id)
    }

    pub fn delivery(&self, id: &str) -> Option<&Delivery> {
        self.find(id)
    }

    pub fn lot(&self, id: &str) -> Option<&ProcessedLot> {
        self.find(id)
    }

    pub fn buyer(&self, id: &str) -> Option<&Buyer> {
        self.find(id)
    }

    pub fn sale(&self, id: &str) -> Option<&Sale> {
        self.find(id)
    }

    /// Number of records in the given collection.
    pub fn len_of(&self, key: CollectionKey) -> usize {
        match key {
            CollectionKey::Farmers => self.farmers.len(),
            CollectionKey::Deliveries => self.deliveries.len(),
            CollectionKey::ProcessedLots => self.lots.len(),
            CollectionKey::Buyers => self.buyers.len(),
            CollectionKey::Sales => self.sales.len(),
        }
    }

    /// Serializes one collection to its stored JSON array.
    pub fn payload(&self, key: CollectionKey) -> serde_json::Result<String> {
        match key {
            CollectionKey::Farmers => serde_json::to_string(&self.farmers),
            CollectionKey::Deliveries => serde_json::to_string(&self.deliveries),
            CollectionKey::ProcessedLots => serde_json::to_string(&self.lots),
            CollectionKey::Buyers => serde_json::to_string(&self.buyers),
            CollectionKey::Sales => serde_json::to_string(&self.sales),
        }
    }
}

/// Inserts a new record at the end its collection expects.
pub(crate) fn insert<T: Record>(records: &mut Vec<T>, record: T) {
    if T::KEY.prepends() {
        records.insert(0, record);
    } else {
        records.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_keys() {
        assert_eq!(CollectionKey::Deliveries.storage_key(), "incomingBatches");
        assert_eq!(CollectionKey::ProcessedLots.storage_key(), "processedBatches");
        assert_eq!(
            CollectionKey::from_storage_key("processedBatches"),
            Some(CollectionKey::ProcessedLots)
        );
        assert_eq!(CollectionKey::from_storage_key("orders"), None);
    }

    #[test]
    fn test_parse_collection_names() {
        assert_eq!("lots".parse::<CollectionKey>().unwrap(), CollectionKey::ProcessedLots);
        assert_eq!("incomingBatches".parse::<CollectionKey>().unwrap(), CollectionKey::Deliveries);
        assert_eq!("Sales".parse::<CollectionKey>().unwrap(), CollectionKey::Sales);
        assert!("orders".parse::<CollectionKey>().is_err());
    }

    #[test]
    fn test_require_reports_entity() {
        let collections = Collections::default();
        let err = collections.require::<Delivery>("IB009").unwrap_err();
        assert_eq!(err.to_string(), "batch not found: IB009");
        let err = collections.require::<Farmer>("F001").unwrap_err();
        assert_eq!(err.to_string(), "farmer not found: F001");
    }

    #[test]
    fn test_empty_payload_is_json_array() {
        let collections = Collections::default();
        for key in CollectionKey::ALL {
            assert_eq!(collections.payload(*key).unwrap(), "[]");
        }
    }
}
