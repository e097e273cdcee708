//! # Commands Module
//!
//! One function per user action. Each takes the shared [`AppState`] and
//! returns a serializable response or an [`ApiError`](crate::error::ApiError).
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs         ◄─── shared responses, delete
//! ├── farmers.rs     ◄─── farmer registry
//! ├── deliveries.rs  ◄─── incoming batches
//! ├── processing.rs  ◄─── processed lots
//! ├── buyers.rs      ◄─── buyer registry
//! ├── sales.rs       ◄─── sales of lots
//! └── dashboard.rs   ◄─── dashboard, reports, ledgers
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Read command                                                          │
//! │     state.snapshot() ──► core filter / stats ──► response              │
//! │                                                                         │
//! │  Write command                                                         │
//! │     state.mutate(|collections, ctx| engine op)                         │
//! │        ├── write lock                                                  │
//! │        ├── load_all                                                    │
//! │        ├── engine op → Transition                                      │
//! │        └── commit changed keys (one SQLite transaction)                │
//! │     ──► Mutation { record, cascades, warnings }                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod buyers;
pub mod dashboard;
pub mod deliveries;
pub mod farmers;
pub mod processing;
pub mod sales;

use serde::Serialize;
use tracing::info;

use teacoop_core::engine::{
    delete_buyer, delete_delivery, delete_farmer, delete_lot, delete_sale,
};
use teacoop_core::{Cascade, CollectionKey, Record, Transition};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// A filtered view plus the summary cards shown above it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing<S, T> {
    pub summary: S,
    pub records: Vec<T>,
}

/// The record a write command created or updated.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mutation<T> {
    pub record: T,
    /// False when the submitted form matched the stored record.
    pub changed: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cascades: Vec<Cascade>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl<T: Record> Mutation<T> {
    fn from_transition(transition: Transition) -> ApiResult<Self> {
        let record = transition.record::<T>().cloned().ok_or_else(|| {
            ApiError::internal(format!(
                "{} {} missing after write",
                T::KEY.entity_name(),
                transition.record_id
            ))
        })?;
        Ok(Mutation {
            record,
            changed: !transition.is_noop(),
            cascades: transition.cascades,
            warnings: Vec::new(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub collection: CollectionKey,
    pub id: String,
    /// False when no record had that id.
    pub deleted: bool,
}

/// Deletes one record. Unknown ids succeed with `deleted: false`.
///
/// Nothing cascades: deliveries of a deleted farmer and sales of a deleted
/// lot keep their references.
pub async fn delete_record(
    state: &AppState,
    collection: CollectionKey,
    id: &str,
) -> ApiResult<DeleteResponse> {
    let transition = state
        .mutate(|c, _| {
            Ok(match collection {
                CollectionKey::Farmers => delete_farmer(c, id),
                CollectionKey::Deliveries => delete_delivery(c, id),
                CollectionKey::ProcessedLots => delete_lot(c, id),
                CollectionKey::Buyers => delete_buyer(c, id),
                CollectionKey::Sales => delete_sale(c, id),
            })
        })
        .await?;

    let deleted = !transition.is_noop();
    info!(collection = %collection, id, deleted, "Delete");
    Ok(DeleteResponse {
        collection,
        id: id.to_string(),
        deleted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::fixtures;

    #[tokio::test]
    async fn test_delete_known_and_unknown() {
        let state = fixtures::state().await;

        let gone = delete_record(&state, CollectionKey::Sales, "S001").await.unwrap();
        assert!(gone.deleted);
        assert!(state.snapshot().await.unwrap().sale("S001").is_none());

        let missing = delete_record(&state, CollectionKey::Sales, "S999").await.unwrap();
        assert!(!missing.deleted);
        assert_eq!(state.db().sales().version().await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_delete_farmer_keeps_their_deliveries() {
        let state = fixtures::state().await;
        delete_record(&state, CollectionKey::Farmers, "F001").await.unwrap();

        let snapshot = state.snapshot().await.unwrap();
        assert!(snapshot.farmer("F001").is_none());
        assert_eq!(
            snapshot.delivery("IB001").map(|d| d.farmer_name.as_str()),
            Some("James Mwangi")
        );
    }
}
