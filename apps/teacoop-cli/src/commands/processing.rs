//! # Processing Commands

use serde::{Deserialize, Serialize};
use tracing::info;

use teacoop_core::engine::{self, LotInput};
use teacoop_core::search::{self, LotFilter};
use teacoop_core::stats::{self, LotLedger, ProcessingSummary};
use teacoop_core::{Delivery, LotStatus, ProcessedLot, TeaGrade, Weight};

use super::{Listing, Mutation};
use crate::error::ApiResult;
use crate::state::AppState;

/// The processing form as submitted; blanks take the form defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest {
    pub output_weight: Weight,
    /// Defaults to the source delivery's grade.
    #[serde(default)]
    pub grade: Option<TeaGrade>,
    #[serde(default)]
    pub quality_score: Option<u8>,
    #[serde(default)]
    pub packaging_type: Option<String>,
    #[serde(default)]
    pub status: Option<LotStatus>,
}

impl ProcessRequest {
    fn resolve(&self, source: Option<&Delivery>) -> LotInput {
        let grade = self
            .grade
            .or_else(|| source.map(|d| d.grade))
            .unwrap_or_default();
        let mut input = LotInput::new(self.output_weight, grade);
        if let Some(score) = self.quality_score {
            input.quality_score = score;
        }
        if let Some(packaging) = &self.packaging_type {
            input.packaging_type = packaging.clone();
        }
        if let Some(status) = self.status {
            input.status = status;
        }
        input
    }
}

/// The processing view. The summary always covers every lot.
pub async fn list_lots(
    state: &AppState,
    filter: &LotFilter,
) -> ApiResult<Listing<ProcessingSummary, ProcessedLot>> {
    let collections = state.snapshot().await?;
    let records = filter.apply(&collections.lots)?.into_iter().cloned().collect();
    Ok(Listing {
        summary: stats::processing_summary(&collections),
        records,
    })
}

/// Lots the sales form can pick from.
pub async fn available_lots(state: &AppState) -> ApiResult<Vec<ProcessedLot>> {
    let collections = state.snapshot().await?;
    Ok(search::available_lots(&collections).into_iter().cloned().collect())
}

/// Creates a lot from a delivery and marks the delivery processed.
pub async fn process_delivery(
    state: &AppState,
    delivery_id: &str,
    request: &ProcessRequest,
) -> ApiResult<Mutation<ProcessedLot>> {
    let transition = state
        .mutate(|c, ctx| {
            let input = request.resolve(c.delivery(delivery_id));
            engine::process_delivery(c, delivery_id, &input, ctx)
        })
        .await?;
    info!(
        lot_id = %transition.record_id,
        delivery_id = %delivery_id,
        output_weight = %request.output_weight,
        "Delivery processed"
    );
    Mutation::from_transition(transition)
}

pub async fn update_lot(
    state: &AppState,
    id: &str,
    input: &LotInput,
) -> ApiResult<Mutation<ProcessedLot>> {
    let transition = state.mutate(|c, _| engine::update_lot(c, id, input)).await?;
    info!(lot_id = %id, changed = !transition.is_noop(), "Lot updated");
    Mutation::from_transition(transition)
}

/// The lot edit form; blank fields keep the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotPatch {
    pub output_weight: Option<Weight>,
    pub grade: Option<TeaGrade>,
    pub quality_score: Option<u8>,
    pub packaging_type: Option<String>,
    pub status: Option<LotStatus>,
}

impl LotPatch {
    fn apply(&self, current: &ProcessedLot) -> LotInput {
        LotInput {
            output_weight: self.output_weight.unwrap_or_else(|| current.output_weight()),
            grade: self.grade.unwrap_or(current.grade),
            quality_score: self.quality_score.unwrap_or(current.quality_score),
            packaging_type: self
                .packaging_type
                .clone()
                .unwrap_or_else(|| current.packaging_type.clone()),
            status: self.status.unwrap_or(current.status),
        }
    }
}

/// Merges `patch` over the stored lot inside the write lock.
pub async fn edit_lot(
    state: &AppState,
    id: &str,
    patch: &LotPatch,
) -> ApiResult<Mutation<ProcessedLot>> {
    let transition = state
        .mutate(|c, _| {
            let input = patch.apply(c.require::<ProcessedLot>(id)?);
            engine::update_lot(c, id, &input)
        })
        .await?;
    info!(lot_id = %id, changed = !transition.is_noop(), "Lot edited");
    Mutation::from_transition(transition)
}

/// Sold and remaining weight per lot.
pub async fn lot_ledgers(state: &AppState) -> ApiResult<Vec<LotLedger>> {
    let collections = state.snapshot().await?;
    Ok(stats::lot_ledgers(&collections))
}
