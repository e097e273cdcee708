//! Incoming deliveries of raw leaf.

use serde::{Deserialize, Serialize};

use super::{create, delete, line_amount, update, MutationContext, Transition};
use crate::collections::{CollectionKey, Collections};
use crate::error::CoreResult;
use crate::money::Money;
use crate::types::{Delivery, DeliveryStatus, Farmer, TeaGrade};
use crate::validation::{validate_notes, validate_percentage, validate_price, validate_raw_weight};
use crate::weight::Weight;

/// The delivery form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryInput {
    pub farmer_id: String,
    pub raw_weight: Weight,
    pub grade: TeaGrade,
    pub moisture_pct: u8,
    pub price_per_kg: Money,
    #[serde(default)]
    pub status: DeliveryStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

impl DeliveryInput {
    fn validate(&self) -> CoreResult<()> {
        validate_raw_weight(self.raw_weight)?;
        validate_percentage("moisture", i64::from(self.moisture_pct))?;
        validate_price(self.price_per_kg)?;
        validate_notes(self.notes.as_deref())?;
        Ok(())
    }

    fn notes(&self) -> Option<String> {
        self.notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
    }
}

/// Records a delivery for an existing farmer.
///
/// ## Rules
/// - The farmer must exist (active or not)
/// - `total_amount = raw_weight × price_per_kg`
/// - The farmer's name is copied onto the delivery
/// - Farmer totals are not touched
pub fn record_delivery(
    collections: &Collections,
    input: &DeliveryInput,
    ctx: &MutationContext<'_>,
) -> CoreResult<Transition> {
    input.validate()?;
    let farmer = collections.require::<Farmer>(&input.farmer_id)?;
    let total = line_amount(input.price_per_kg, input.raw_weight)?;

    let delivery = Delivery {
        id: ctx.ids.next_id(CollectionKey::Deliveries),
        farmer_id: farmer.id.clone(),
        farmer_name: farmer.name.clone(),
        date: ctx.today,
        raw_weight_grams: input.raw_weight.grams(),
        grade: input.grade,
        moisture_pct: input.moisture_pct,
        price_per_kg_cents: input.price_per_kg.cents(),
        total_amount_cents: total.cents(),
        status: input.status,
        notes: input.notes(),
    };
    Ok(create(collections, delivery))
}

/// Edits a delivery. The farmer name is re-read from the (possibly new)
/// farmer and the total recomputed; id and date are kept.
pub fn update_delivery(
    collections: &Collections,
    id: &str,
    input: &DeliveryInput,
) -> CoreResult<Transition> {
    input.validate()?;
    let farmer = collections.require::<Farmer>(&input.farmer_id)?;
    let total = line_amount(input.price_per_kg, input.raw_weight)?;

    update::<Delivery, _>(collections, id, |current| {
        Ok(Delivery {
            farmer_id: farmer.id.clone(),
            farmer_name: farmer.name.clone(),
            raw_weight_grams: input.raw_weight.grams(),
            grade: input.grade,
            moisture_pct: input.moisture_pct,
            price_per_kg_cents: input.price_per_kg.cents(),
            total_amount_cents: total.cents(),
            status: input.status,
            notes: input.notes(),
            ..current.clone()
        })
    })
}

pub fn delete_delivery(collections: &Collections, id: &str) -> Transition {
    delete::<Delivery>(collections, id)
}
