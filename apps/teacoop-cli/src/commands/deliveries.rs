//! # Delivery Commands

use serde::{Deserialize, Serialize};
use tracing::info;

use teacoop_core::engine::{self, DeliveryInput};
use teacoop_core::search::{self, DeliveryFilter};
use teacoop_core::stats::{self, DeliverySummary};
use teacoop_core::{Delivery, DeliveryStatus, Money, TeaGrade, Weight};

use super::{Listing, Mutation};
use crate::error::ApiResult;
use crate::state::AppState;

/// The deliveries view. Count, weight and value cover the rows shown;
/// the pending count covers every delivery.
pub async fn list_deliveries(
    state: &AppState,
    filter: &DeliveryFilter,
) -> ApiResult<Listing<DeliverySummary, Delivery>> {
    let collections = state.snapshot().await?;
    let rows = filter.apply(&collections.deliveries)?;
    let summary = DeliverySummary {
        pending: stats::delivery_summary(&collections.deliveries).pending,
        ..stats::delivery_summary(rows.iter().copied())
    };
    Ok(Listing {
        summary,
        records: rows.into_iter().cloned().collect(),
    })
}

/// Deliveries the processing form can pick from.
pub async fn processable_deliveries(state: &AppState) -> ApiResult<Vec<Delivery>> {
    let collections = state.snapshot().await?;
    Ok(search::processable_deliveries(&collections)
        .into_iter()
        .cloned()
        .collect())
}

pub async fn record_delivery(
    state: &AppState,
    input: &DeliveryInput,
) -> ApiResult<Mutation<Delivery>> {
    let transition = state
        .mutate(|c, ctx| engine::record_delivery(c, input, ctx))
        .await?;
    info!(
        delivery_id = %transition.record_id,
        farmer_id = %input.farmer_id,
        raw_weight = %input.raw_weight,
        "Delivery recorded"
    );
    Mutation::from_transition(transition)
}

pub async fn update_delivery(
    state: &AppState,
    id: &str,
    input: &DeliveryInput,
) -> ApiResult<Mutation<Delivery>> {
    let transition = state
        .mutate(|c, _| engine::update_delivery(c, id, input))
        .await?;
    info!(delivery_id = %id, changed = !transition.is_noop(), "Delivery updated");
    Mutation::from_transition(transition)
}

/// The delivery edit form; blank fields keep the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryPatch {
    pub farmer_id: Option<String>,
    pub raw_weight: Option<Weight>,
    pub grade: Option<TeaGrade>,
    pub moisture_pct: Option<u8>,
    pub price_per_kg: Option<Money>,
    pub status: Option<DeliveryStatus>,
    pub notes: Option<String>,
}

impl DeliveryPatch {
    fn apply(&self, current: &Delivery) -> DeliveryInput {
        DeliveryInput {
            farmer_id: self.farmer_id.clone().unwrap_or_else(|| current.farmer_id.clone()),
            raw_weight: self.raw_weight.unwrap_or_else(|| current.raw_weight()),
            grade: self.grade.unwrap_or(current.grade),
            moisture_pct: self.moisture_pct.unwrap_or(current.moisture_pct),
            price_per_kg: self.price_per_kg.unwrap_or_else(|| current.price_per_kg()),
            status: self.status.unwrap_or(current.status),
            notes: self.notes.clone().or_else(|| current.notes.clone()),
        }
    }
}

/// Merges `patch` over the stored delivery inside the write lock.
pub async fn edit_delivery(
    state: &AppState,
    id: &str,
    patch: &DeliveryPatch,
) -> ApiResult<Mutation<Delivery>> {
    let transition = state
        .mutate(|c, _| {
            let input = patch.apply(c.require::<Delivery>(id)?);
            engine::update_delivery(c, id, &input)
        })
        .await?;
    info!(delivery_id = %id, changed = !transition.is_noop(), "Delivery edited");
    Mutation::from_transition(transition)
}
