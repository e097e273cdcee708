//! Farmer registration.

use serde::{Deserialize, Serialize};

use super::{create, delete, update, MutationContext, Transition};
use crate::collections::{CollectionKey, Collections};
use crate::error::CoreResult;
use crate::types::{Farmer, OutputPreference, PartyStatus};
use crate::validation::{clean_name, validate_optional_text};

/// The farmer form. Totals are deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmerInput {
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub status: PartyStatus,
    #[serde(default)]
    pub output_preference: OutputPreference,
}

impl FarmerInput {
    fn validate(&self) -> CoreResult<String> {
        validate_optional_text("phone", &self.phone)?;
        validate_optional_text("location", &self.location)?;
        Ok(clean_name("name", &self.name)?)
    }
}

/// Registers a farmer with zero totals, dated today, at the end of the list.
pub fn register_farmer(
    collections: &Collections,
    input: &FarmerInput,
    ctx: &MutationContext<'_>,
) -> CoreResult<Transition> {
    let name = input.validate()?;
    let farmer = Farmer {
        id: ctx.ids.next_id(CollectionKey::Farmers),
        name,
        phone: input.phone.trim().to_string(),
        location: input.location.trim().to_string(),
        registration_date: ctx.today,
        status: input.status,
        output_preference: input.output_preference,
        total_delivered_grams: 0,
        balance_cents: 0,
    };
    Ok(create(collections, farmer))
}

/// Replaces the form fields; totals and registration date are kept.
pub fn update_farmer(
    collections: &Collections,
    id: &str,
    input: &FarmerInput,
) -> CoreResult<Transition> {
    let name = input.validate()?;
    update::<Farmer, _>(collections, id, |current| {
        Ok(Farmer {
            name,
            phone: input.phone.trim().to_string(),
            location: input.location.trim().to_string(),
            status: input.status,
            output_preference: input.output_preference,
            ..current.clone()
        })
    })
}

pub fn delete_farmer(collections: &Collections, id: &str) -> Transition {
    delete::<Farmer>(collections, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fixtures::{today, Harness};
    use crate::seed;

    fn input(name: &str) -> FarmerInput {
        FarmerInput {
            name: name.to_string(),
            phone: "+254 700 000 000".to_string(),
            location: "Kericho".to_string(),
            status: PartyStatus::Active,
            output_preference: OutputPreference::CoopSell,
        }
    }

    #[test]
    fn test_register_appends_with_zero_totals() {
        let harness = Harness::new();
        let collections = seed::collections();
        let transition = register_farmer(&collections, &input("Mary Chebet"), &harness.ctx()).unwrap();

        let farmers = &transition.collections.farmers;
        assert_eq!(farmers.len(), collections.farmers.len() + 1);
        let created = farmers.last().unwrap();
        assert_eq!(created.id, transition.record_id);
        assert_eq!(created.id, "F100");
        assert_eq!(created.total_delivered_grams, 0);
        assert_eq!(created.balance_cents, 0);
        assert_eq!(created.registration_date, today());
        assert_eq!(transition.changed.len(), 1);
    }

    #[test]
    fn test_register_requires_name() {
        let harness = Harness::new();
        let collections = Collections::default();
        assert!(register_farmer(&collections, &input("  "), &harness.ctx()).is_err());
    }

    #[test]
    fn test_update_keeps_totals() {
        let collections = seed::collections();
        let mut edit = input("James M. Mwangi");
        edit.status = PartyStatus::Inactive;
        let transition = update_farmer(&collections, "F001", &edit).unwrap();

        let farmer = transition.collections.farmer("F001").unwrap();
        assert_eq!(farmer.name, "James M. Mwangi");
        assert_eq!(farmer.status, PartyStatus::Inactive);
        assert_eq!(farmer.total_delivered_grams, 2_450_000);
        assert_eq!(farmer.balance_cents, 12_500_000);
        // snapshot names on deliveries are frozen
        assert_eq!(
            transition.collections.delivery("IB001").unwrap().farmer_name,
            "James Mwangi"
        );
    }

    #[test]
    fn test_update_with_same_values_is_noop() {
        let collections = seed::collections();
        let current = collections.farmer("F002").unwrap();
        let same = FarmerInput {
            name: current.name.clone(),
            phone: current.phone.clone(),
            location: current.location.clone(),
            status: current.status,
            output_preference: current.output_preference,
        };
        let transition = update_farmer(&collections, "F002", &same).unwrap();
        assert!(transition.is_noop());
        assert_eq!(transition.collections, collections);
    }
}
