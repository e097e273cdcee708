//! # Buyer Commands

use serde::{Deserialize, Serialize};
use tracing::info;

use teacoop_core::engine::{self, BuyerInput};
use teacoop_core::search::{self, BuyerFilter};
use teacoop_core::stats::{self, BuyerLedger, BuyerSummary};
use teacoop_core::{Buyer, PartyStatus};

use super::{Listing, Mutation};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_buyers(
    state: &AppState,
    filter: &BuyerFilter,
) -> ApiResult<Listing<BuyerSummary, Buyer>> {
    let collections = state.snapshot().await?;
    let records = filter.apply(&collections.buyers)?.into_iter().cloned().collect();
    Ok(Listing {
        summary: stats::buyer_summary(&collections.buyers),
        records,
    })
}

/// Buyers the sales form can pick from.
pub async fn active_buyers(state: &AppState) -> ApiResult<Vec<Buyer>> {
    let collections = state.snapshot().await?;
    Ok(search::active_buyers(&collections).into_iter().cloned().collect())
}

pub async fn register_buyer(state: &AppState, input: &BuyerInput) -> ApiResult<Mutation<Buyer>> {
    let transition = state
        .mutate(|c, ctx| engine::register_buyer(c, input, ctx))
        .await?;
    info!(buyer_id = %transition.record_id, "Buyer registered");
    Mutation::from_transition(transition)
}

pub async fn update_buyer(
    state: &AppState,
    id: &str,
    input: &BuyerInput,
) -> ApiResult<Mutation<Buyer>> {
    let transition = state.mutate(|c, _| engine::update_buyer(c, id, input)).await?;
    info!(buyer_id = %id, changed = !transition.is_noop(), "Buyer updated");
    Mutation::from_transition(transition)
}

/// The buyer edit form; blank fields keep the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerPatch {
    pub company_name: Option<String>,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub status: Option<PartyStatus>,
}

impl BuyerPatch {
    fn apply(&self, current: &Buyer) -> BuyerInput {
        let keep = |field: &Option<String>, stored: &String| {
            field.clone().unwrap_or_else(|| stored.clone())
        };
        BuyerInput {
            company_name: keep(&self.company_name, &current.company_name),
            contact_person: keep(&self.contact_person, &current.contact_person),
            email: keep(&self.email, &current.email),
            phone: keep(&self.phone, &current.phone),
            address: keep(&self.address, &current.address),
            status: self.status.unwrap_or(current.status),
        }
    }
}

/// Merges `patch` over the stored buyer inside the write lock.
pub async fn edit_buyer(
    state: &AppState,
    id: &str,
    patch: &BuyerPatch,
) -> ApiResult<Mutation<Buyer>> {
    let transition = state
        .mutate(|c, _| {
            let input = patch.apply(c.require::<Buyer>(id)?);
            engine::update_buyer(c, id, &input)
        })
        .await?;
    info!(buyer_id = %id, changed = !transition.is_noop(), "Buyer edited");
    Mutation::from_transition(transition)
}

/// Purchased weight, spend and outstanding amount summed from the sales.
pub async fn buyer_ledgers(state: &AppState) -> ApiResult<Vec<BuyerLedger>> {
    let collections = state.snapshot().await?;
    Ok(stats::buyer_ledgers(&collections))
}
