//! Sales of processed lots to buyers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{delete, line_amount, update, Cascade, LotSalePolicy, MutationContext, Transition};
use crate::collections::{insert, CollectionKey, Collections, Record};
use crate::error::CoreResult;
use crate::money::Money;
use crate::types::{Buyer, LotStatus, PaymentStatus, ProcessedLot, Sale};
use crate::validation::{validate_price, validate_weight};
use crate::weight::Weight;

/// Price per kg offered by the sales form.
pub const DEFAULT_SALE_PRICE: Money = Money::from_major(450);

/// The sales form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleInput {
    pub buyer_id: String,
    pub lot_id: String,
    pub quantity: Weight,
    #[serde(default = "default_price")]
    pub price_per_kg: Money,
    #[serde(default)]
    pub payment_status: PaymentStatus,
}

/// The sales edit form; the lot of an existing sale cannot change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleUpdate {
    pub buyer_id: String,
    pub quantity: Weight,
    pub price_per_kg: Money,
    pub payment_status: PaymentStatus,
}

fn default_price() -> Money {
    DEFAULT_SALE_PRICE
}

fn validate_terms(quantity: Weight, price_per_kg: Money) -> CoreResult<()> {
    validate_weight("quantity", quantity)?;
    validate_price(price_per_kg)?;
    Ok(())
}

/// Records a sale from a lot.
///
/// ## Rules
/// - Buyer and lot must exist
/// - `total_amount = quantity × price_per_kg`
/// - Grade and farmer are copied from the lot, buyer name from the buyer
/// - Quantity above the lot's output is accepted
/// - The lot's status follows the configured [`LotSalePolicy`]
pub fn record_sale(
    collections: &Collections,
    input: &SaleInput,
    ctx: &MutationContext<'_>,
) -> CoreResult<Transition> {
    validate_terms(input.quantity, input.price_per_kg)?;
    let buyer = collections.require::<Buyer>(&input.buyer_id)?;
    let lot = collections.require::<ProcessedLot>(&input.lot_id)?;
    let total = line_amount(input.price_per_kg, input.quantity)?;

    let sale = Sale {
        id: ctx.ids.next_id(CollectionKey::Sales),
        buyer_id: buyer.id.clone(),
        buyer_name: buyer.company_name.clone(),
        lot_id: lot.id.clone(),
        date: ctx.today,
        quantity_grams: input.quantity.grams(),
        grade: lot.grade,
        price_per_kg_cents: input.price_per_kg.cents(),
        total_amount_cents: total.cents(),
        payment_status: input.payment_status,
        farmer_id: lot.farmer_id.clone(),
        farmer_name: lot.farmer_name.clone(),
    };
    let sale_id = sale.id.clone();
    let lot_id = lot.id.clone();
    let previous_status = lot.status;

    let mut next = collections.clone();
    insert(Sale::slot(&mut next), sale);

    let new_status = match ctx.config.lot_sale_policy {
        LotSalePolicy::MarkSoldOnAnySale => LotStatus::Sold,
        LotSalePolicy::TrackRemaining => {
            let sold: Weight = next
                .sales
                .iter()
                .filter(|s| s.lot_id == lot_id)
                .map(Sale::quantity)
                .sum();
            if sold >= lot.output_weight() {
                LotStatus::Sold
            } else {
                previous_status
            }
        }
    };

    let mut changed = BTreeSet::from([CollectionKey::Sales]);
    let mut cascades = Vec::new();
    if new_status != previous_status {
        if let Some(slot) = next.lots.iter_mut().find(|l| l.id == lot_id) {
            slot.status = new_status;
        }
        changed.insert(CollectionKey::ProcessedLots);
        cascades.push(Cascade::LotStatusChanged {
            lot_id,
            from: previous_status,
            to: new_status,
        });
    }

    Ok(Transition {
        collections: next,
        changed,
        record_id: sale_id,
        cascades,
    })
}

/// Edits a sale. The buyer name is refreshed; the lot must still exist.
/// No cascade.
pub fn update_sale(
    collections: &Collections,
    id: &str,
    input: &SaleUpdate,
) -> CoreResult<Transition> {
    validate_terms(input.quantity, input.price_per_kg)?;
    let buyer = collections.require::<Buyer>(&input.buyer_id)?;
    let current = collections.require::<Sale>(id)?;
    collections.require::<ProcessedLot>(&current.lot_id)?;
    let total = line_amount(input.price_per_kg, input.quantity)?;

    update::<Sale, _>(collections, id, |current| {
        Ok(Sale {
            buyer_id: buyer.id.clone(),
            buyer_name: buyer.company_name.clone(),
            quantity_grams: input.quantity.grams(),
            price_per_kg_cents: input.price_per_kg.cents(),
            total_amount_cents: total.cents(),
            payment_status: input.payment_status,
            ..current.clone()
        })
    })
}

pub fn delete_sale(collections: &Collections, id: &str) -> Transition {
    delete::<Sale>(collections, id)
}
