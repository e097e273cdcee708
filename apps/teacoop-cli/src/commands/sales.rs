//! # Sale Commands

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use teacoop_core::engine::{self, SaleInput, SaleUpdate};
use teacoop_core::search::SaleFilter;
use teacoop_core::stats::{self, SalesSummary};
use teacoop_core::{Collections, Money, PaymentStatus, Sale, Transition, Weight};

use super::{Listing, Mutation};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_sales(
    state: &AppState,
    filter: &SaleFilter,
) -> ApiResult<Listing<SalesSummary, Sale>> {
    let collections = state.snapshot().await?;
    let records = filter.apply(&collections.sales)?.into_iter().cloned().collect();
    Ok(Listing {
        summary: stats::sales_summary(&collections),
        records,
    })
}

/// Records a sale. Selling more than the lot produced is allowed but reported.
pub async fn record_sale(state: &AppState, input: &SaleInput) -> ApiResult<Mutation<Sale>> {
    let transition = state
        .mutate(|c, ctx| engine::record_sale(c, input, ctx))
        .await?;
    info!(
        sale_id = %transition.record_id,
        lot_id = %input.lot_id,
        buyer_id = %input.buyer_id,
        quantity = %input.quantity,
        "Sale recorded"
    );

    let warnings = oversold_warning(&transition.collections, &input.lot_id)
        .into_iter()
        .collect();
    let mut mutation = Mutation::from_transition(transition)?;
    mutation.warnings = warnings;
    Ok(mutation)
}

pub async fn update_sale(
    state: &AppState,
    id: &str,
    input: &SaleUpdate,
) -> ApiResult<Mutation<Sale>> {
    let transition = state.mutate(|c, _| engine::update_sale(c, id, input)).await?;
    info!(sale_id = %id, changed = !transition.is_noop(), "Sale updated");
    with_oversold_warning(transition)
}

/// The sale edit form; blank fields keep the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalePatch {
    pub buyer_id: Option<String>,
    pub quantity: Option<Weight>,
    pub price_per_kg: Option<Money>,
    pub payment_status: Option<PaymentStatus>,
}

impl SalePatch {
    fn apply(&self, current: &Sale) -> SaleUpdate {
        SaleUpdate {
            buyer_id: self.buyer_id.clone().unwrap_or_else(|| current.buyer_id.clone()),
            quantity: self.quantity.unwrap_or_else(|| current.quantity()),
            price_per_kg: self.price_per_kg.unwrap_or_else(|| current.price_per_kg()),
            payment_status: self.payment_status.unwrap_or(current.payment_status),
        }
    }
}

/// Merges `patch` over the stored sale inside the write lock.
pub async fn edit_sale(state: &AppState, id: &str, patch: &SalePatch) -> ApiResult<Mutation<Sale>> {
    let transition = state
        .mutate(|c, _| {
            let input = patch.apply(c.require::<Sale>(id)?);
            engine::update_sale(c, id, &input)
        })
        .await?;
    info!(sale_id = %id, changed = !transition.is_noop(), "Sale edited");
    with_oversold_warning(transition)
}

fn with_oversold_warning(transition: Transition) -> ApiResult<Mutation<Sale>> {
    let lot_id = transition.record::<Sale>().map(|s| s.lot_id.clone());
    let warnings = lot_id
        .and_then(|lot_id| oversold_warning(&transition.collections, &lot_id))
        .into_iter()
        .collect();
    let mut mutation = Mutation::from_transition(transition)?;
    mutation.warnings = warnings;
    Ok(mutation)
}

fn oversold_warning(collections: &Collections, lot_id: &str) -> Option<String> {
    let lot = collections.lot(lot_id)?;
    let ledger = stats::lot_ledger(collections, lot);
    if !ledger.oversold {
        return None;
    }
    warn!(lot_id, sold = %ledger.sold, output = %ledger.output, "Lot oversold");
    Some(format!(
        "lot {} oversold: {} sold of {} output",
        lot_id, ledger.sold, ledger.output
    ))
}
