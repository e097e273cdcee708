//! Turning a delivery into a processed lot.
//!
//! ```text
//!  Delivery IB001 (250 kg, pending)
//!        │  process_delivery(output 62.5 kg)
//!        ▼
//!  Lot PB… (input 250 kg, output 62.5 kg, loss 75 %)
//!  Delivery IB001 status ──► processed
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{delete, update, Cascade, MutationContext, Transition};
use crate::collections::{insert, CollectionKey, Collections, Record};
use crate::error::{CoreError, CoreResult};
use crate::stats::percent_half_up;
use crate::types::{Delivery, DeliveryStatus, LotStatus, ProcessedLot, TeaGrade};
use crate::validation::{clean_name, validate_percentage, validate_weight};
use crate::weight::Weight;

/// Default packaging offered by the processing form.
pub const DEFAULT_PACKAGING: &str = "25kg bags";

/// Default quality score offered by the processing form.
pub const DEFAULT_QUALITY_SCORE: u8 = 90;

/// The processing form (used both to create and to edit a lot).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotInput {
    pub output_weight: Weight,
    pub grade: TeaGrade,
    #[serde(default = "default_quality_score")]
    pub quality_score: u8,
    #[serde(default = "default_packaging")]
    pub packaging_type: String,
    #[serde(default)]
    pub status: LotStatus,
}

fn default_quality_score() -> u8 {
    DEFAULT_QUALITY_SCORE
}

fn default_packaging() -> String {
    DEFAULT_PACKAGING.to_string()
}

impl LotInput {
    /// A form pre-filled with the defaults.
    pub fn new(output_weight: Weight, grade: TeaGrade) -> Self {
        Self {
            output_weight,
            grade,
            quality_score: DEFAULT_QUALITY_SCORE,
            packaging_type: default_packaging(),
            status: LotStatus::Available,
        }
    }

    fn validate(&self) -> CoreResult<String> {
        validate_weight("output weight", self.output_weight)?;
        validate_percentage("quality score", i64::from(self.quality_score))?;
        Ok(clean_name("packaging type", &self.packaging_type)?)
    }
}

/// Percentage of input weight lost in processing, rounded half up.
///
/// `round((input - output) / input × 100)`, where ties round toward
/// positive infinity (so -2.5 becomes -2). Output heavier than input gives a
/// negative loss. `input_grams` must be positive.
pub fn processing_loss_pct(input_grams: i64, output_grams: i64) -> i64 {
    percent_half_up(input_grams - output_grams, input_grams)
}

/// Processes a pending / in-progress delivery into a new lot.
///
/// ## Rules
/// - The delivery must exist ("batch not found")
/// - Its status must be `pending` or `processing`
/// - Its raw weight must be positive
/// - The lot copies input weight, farmer id and farmer name from the delivery
/// - The delivery is forced to `processed`, whatever status the lot gets
pub fn process_delivery(
    collections: &Collections,
    delivery_id: &str,
    input: &LotInput,
    ctx: &MutationContext<'_>,
) -> CoreResult<Transition> {
    let packaging_type = input.validate()?;
    let source = collections.require::<Delivery>(delivery_id)?;

    if !source.status.is_processable() {
        return Err(CoreError::DeliveryNotProcessable {
            delivery_id: source.id.clone(),
            status: source.status,
        });
    }
    if !source.raw_weight().is_positive() {
        return Err(CoreError::ZeroInputWeight {
            delivery_id: source.id.clone(),
        });
    }

    let lot = ProcessedLot {
        id: ctx.ids.next_id(CollectionKey::ProcessedLots),
        delivery_id: source.id.clone(),
        farmer_id: source.farmer_id.clone(),
        farmer_name: source.farmer_name.clone(),
        processed_date: ctx.today,
        input_weight_grams: source.raw_weight_grams,
        output_weight_grams: input.output_weight.grams(),
        grade: input.grade,
        processing_loss_pct: processing_loss_pct(
            source.raw_weight_grams,
            input.output_weight.grams(),
        ),
        quality_score: input.quality_score,
        packaging_type,
        status: input.status,
    };
    let lot_id = lot.id.clone();
    let previous_status = source.status;

    let mut next = collections.clone();
    insert(ProcessedLot::slot(&mut next), lot);
    if let Some(delivery) = next.deliveries.iter_mut().find(|d| d.id == delivery_id) {
        delivery.status = DeliveryStatus::Processed;
    }

    Ok(Transition {
        collections: next,
        changed: BTreeSet::from([CollectionKey::ProcessedLots, CollectionKey::Deliveries]),
        record_id: lot_id,
        cascades: vec![Cascade::DeliveryStatusChanged {
            delivery_id: delivery_id.to_string(),
            from: previous_status,
            to: DeliveryStatus::Processed,
        }],
    })
}

/// Edits a lot. Loss is recomputed from the source delivery's current raw
/// weight; the stored input weight stays as it was. No cascade.
pub fn update_lot(
    collections: &Collections,
    id: &str,
    input: &LotInput,
) -> CoreResult<Transition> {
    let packaging_type = input.validate()?;
    let current = collections.require::<ProcessedLot>(id)?;
    let source = collections.require::<Delivery>(&current.delivery_id)?;
    if !source.raw_weight().is_positive() {
        return Err(CoreError::ZeroInputWeight {
            delivery_id: source.id.clone(),
        });
    }
    let loss = processing_loss_pct(source.raw_weight_grams, input.output_weight.grams());

    update::<ProcessedLot, _>(collections, id, |current| {
        Ok(ProcessedLot {
            output_weight_grams: input.output_weight.grams(),
            grade: input.grade,
            quality_score: input.quality_score,
            packaging_type,
            processing_loss_pct: loss,
            status: input.status,
            ..current.clone()
        })
    })
}

pub fn delete_lot(collections: &Collections, id: &str) -> Transition {
    delete::<ProcessedLot>(collections, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fixtures::{today, Harness};
    use crate::engine::{record_delivery, update_delivery, DeliveryInput};
    use crate::error::ValidationError;
    use crate::money::Money;
    use crate::seed;
    use proptest::prelude::*;

    #[test]
    fn test_loss_rounding() {
        assert_eq!(processing_loss_pct(100_000, 30_000), 70);
        assert_eq!(processing_loss_pct(250_000, 62_500), 75);
        // 2.5 % rounds up
        assert_eq!(processing_loss_pct(1_000, 975), 3);
        // -2.5 % rounds toward +inf
        assert_eq!(processing_loss_pct(1_000, 1_025), -2);
        assert_eq!(processing_loss_pct(3_000, 2_000), 33);
        assert_eq!(processing_loss_pct(3_000, 1_000), 67);
        assert_eq!(processing_loss_pct(5_000, 0), 100);
    }

    #[test]
    fn test_process_pending_delivery() {
        let harness = Harness::new();
        let collections = seed::collections();
        let input = LotInput::new(Weight::from_kg(80), TeaGrade::A);
        let transition = process_delivery(&collections, "IB003", &input, &harness.ctx()).unwrap();

        let lot = &transition.collections.lots[0];
        assert_eq!(lot.id, transition.record_id);
        assert_eq!(lot.delivery_id, "IB003");
        assert_eq!(lot.farmer_id, "F003");
        assert_eq!(lot.farmer_name, "Peter Omondi");
        assert_eq!(lot.input_weight(), Weight::from_kg(320));
        assert_eq!(lot.processing_loss_pct, 75);
        assert_eq!(lot.processed_date, today());
        assert_eq!(lot.packaging_type, DEFAULT_PACKAGING);
        assert_eq!(lot.quality_score, DEFAULT_QUALITY_SCORE);

        assert_eq!(
            transition.collections.delivery("IB003").unwrap().status,
            DeliveryStatus::Processed
        );
        assert_eq!(
            transition.cascades,
            vec![Cascade::DeliveryStatusChanged {
                delivery_id: "IB003".to_string(),
                from: DeliveryStatus::Pending,
                to: DeliveryStatus::Processed,
            }]
        );
        assert!(transition.changed.contains(&CollectionKey::Deliveries));
        assert!(transition.changed.contains(&CollectionKey::ProcessedLots));
    }

    #[test]
    fn test_delivery_forced_to_processed_even_for_reserved_lot() {
        let harness = Harness::new();
        let collections = seed::collections();
        let mut input = LotInput::new(Weight::from_kg(45), TeaGrade::B);
        input.status = LotStatus::Reserved;
        // IB002 is `processing`
        let transition = process_delivery(&collections, "IB002", &input, &harness.ctx()).unwrap();
        assert_eq!(transition.collections.lots[0].status, LotStatus::Reserved);
        assert_eq!(
            transition.collections.delivery("IB002").unwrap().status,
            DeliveryStatus::Processed
        );
    }

    #[test]
    fn test_processed_delivery_rejected() {
        let harness = Harness::new();
        let collections = seed::collections();
        let input = LotInput::new(Weight::from_kg(10), TeaGrade::A);
        let err = process_delivery(&collections, "IB001", &input, &harness.ctx()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::DeliveryNotProcessable {
                status: DeliveryStatus::Processed,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_delivery_rejected() {
        let harness = Harness::new();
        let collections = seed::collections();
        let input = LotInput::new(Weight::from_kg(10), TeaGrade::A);
        let err = process_delivery(&collections, "IB999", &input, &harness.ctx()).unwrap_err();
        assert_eq!(err.as_validation(), Some(&ValidationError::unknown("batch", "IB999")));
    }

    #[test]
    fn test_zero_weight_legacy_delivery_rejected() {
        let harness = Harness::new();
        let mut collections = seed::collections();
        collections.deliveries[2].raw_weight_grams = 0;
        let id = collections.deliveries[2].id.clone();
        let input = LotInput::new(Weight::zero(), TeaGrade::A);
        let err = process_delivery(&collections, &id, &input, &harness.ctx()).unwrap_err();
        assert!(matches!(err, CoreError::ZeroInputWeight { .. }));
    }

    #[test]
    fn test_update_lot_uses_current_source_weight() {
        let collections = seed::collections();

        // re-weigh the source of PB001 from 250 kg to 200 kg
        let source = collections.delivery("IB001").unwrap().clone();
        let reweigh = DeliveryInput {
            farmer_id: source.farmer_id.clone(),
            raw_weight: Weight::from_kg(200),
            grade: source.grade,
            moisture_pct: source.moisture_pct,
            price_per_kg: Money::from_cents(source.price_per_kg_cents),
            status: source.status,
            notes: source.notes.clone(),
        };
        let collections = update_delivery(&collections, "IB001", &reweigh)
            .unwrap()
            .collections;

        let edit = LotInput::new(Weight::from_kg(50), TeaGrade::A);
        let transition = update_lot(&collections, "PB001", &edit).unwrap();
        let lot = transition.collections.lot("PB001").unwrap();
        assert_eq!(lot.processing_loss_pct, 75);
        assert_eq!(lot.input_weight(), Weight::from_kg(250));
        assert!(transition.cascades.is_empty());
    }

    #[test]
    fn test_update_lot_with_deleted_source() {
        let collections = seed::collections();
        let collections = crate::engine::delete_delivery(&collections, "IB001").collections;
        let edit = LotInput::new(Weight::from_kg(50), TeaGrade::A);
        let err = update_lot(&collections, "PB001", &edit).unwrap_err();
        assert_eq!(err.to_string(), "Validation error: batch not found: IB001");
    }

    #[test]
    fn test_failed_processing_leaves_input_untouched() {
        let harness = Harness::new();
        let collections = seed::collections();
        let snapshot = collections.clone();
        let input = LotInput::new(Weight::from_kg(10), TeaGrade::A);
        let _ = process_delivery(&collections, "IB005", &input, &harness.ctx());
        assert_eq!(collections, snapshot);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_loss_and_cascade(raw_kg in 1i64..5_000, output_pct in 0i64..=100) {
            let harness = Harness::new();
            let delivery = DeliveryInput {
                farmer_id: "F001".to_string(),
                raw_weight: Weight::from_kg(raw_kg),
                grade: TeaGrade::B,
                moisture_pct: 70,
                price_per_kg: Money::from_major(80),
                status: DeliveryStatus::Pending,
                notes: None,
            };
            let recorded = record_delivery(&seed::collections(), &delivery, &harness.ctx()).unwrap();
            let delivery_id = recorded.record_id.clone();

            let output_grams = raw_kg * 1000 * output_pct / 100;
            let input = LotInput::new(Weight::from_grams(output_grams), TeaGrade::B);
            let processed =
                process_delivery(&recorded.collections, &delivery_id, &input, &harness.ctx()).unwrap();

            let lot = &processed.collections.lots[0];
            prop_assert_eq!(lot.processing_loss_pct, 100 - output_pct);
            prop_assert_eq!(lot.input_weight_grams, raw_kg * 1000);
            prop_assert_eq!(
                processed.collections.delivery(&delivery_id).unwrap().status,
                DeliveryStatus::Processed
            );
        }
    }
}
