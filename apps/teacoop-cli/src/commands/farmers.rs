//! # Farmer Commands

use serde::{Deserialize, Serialize};
use tracing::info;

use teacoop_core::engine::{self, FarmerInput};
use teacoop_core::search::{self, FarmerFilter};
use teacoop_core::stats::{self, FarmerLedger, FarmerSummary};
use teacoop_core::{Farmer, OutputPreference, PartyStatus};

use super::{Listing, Mutation};
use crate::error::ApiResult;
use crate::state::AppState;

/// The farmers view: summary cards over all farmers, rows matching `filter`.
pub async fn list_farmers(
    state: &AppState,
    filter: &FarmerFilter,
) -> ApiResult<Listing<FarmerSummary, Farmer>> {
    let collections = state.snapshot().await?;
    let records = filter.apply(&collections.farmers)?.into_iter().cloned().collect();
    Ok(Listing {
        summary: stats::farmer_summary(&collections.farmers),
        records,
    })
}

/// Farmers the delivery form can pick from.
pub async fn active_farmers(state: &AppState) -> ApiResult<Vec<Farmer>> {
    let collections = state.snapshot().await?;
    Ok(search::active_farmers(&collections).into_iter().cloned().collect())
}

pub async fn register_farmer(state: &AppState, input: &FarmerInput) -> ApiResult<Mutation<Farmer>> {
    let transition = state
        .mutate(|c, ctx| engine::register_farmer(c, input, ctx))
        .await?;
    info!(farmer_id = %transition.record_id, "Farmer registered");
    Mutation::from_transition(transition)
}

pub async fn update_farmer(
    state: &AppState,
    id: &str,
    input: &FarmerInput,
) -> ApiResult<Mutation<Farmer>> {
    let transition = state
        .mutate(|c, _| engine::update_farmer(c, id, input))
        .await?;
    info!(farmer_id = %id, changed = !transition.is_noop(), "Farmer updated");
    Mutation::from_transition(transition)
}

/// The farmer edit form; blank fields keep the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmerPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub status: Option<PartyStatus>,
    pub output_preference: Option<OutputPreference>,
}

impl FarmerPatch {
    fn apply(&self, current: &Farmer) -> FarmerInput {
        FarmerInput {
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            phone: self.phone.clone().unwrap_or_else(|| current.phone.clone()),
            location: self.location.clone().unwrap_or_else(|| current.location.clone()),
            status: self.status.unwrap_or(current.status),
            output_preference: self.output_preference.unwrap_or(current.output_preference),
        }
    }
}

/// Merges `patch` over the stored farmer inside the write lock.
pub async fn edit_farmer(
    state: &AppState,
    id: &str,
    patch: &FarmerPatch,
) -> ApiResult<Mutation<Farmer>> {
    let transition = state
        .mutate(|c, _| {
            let input = patch.apply(c.require::<Farmer>(id)?);
            engine::update_farmer(c, id, &input)
        })
        .await?;
    info!(farmer_id = %id, changed = !transition.is_noop(), "Farmer edited");
    Mutation::from_transition(transition)
}

/// Delivered weight, value and lot counts summed from the records.
pub async fn farmer_ledgers(state: &AppState) -> ApiResult<Vec<FarmerLedger>> {
    let collections = state.snapshot().await?;
    Ok(stats::farmer_ledgers(&collections))
}
