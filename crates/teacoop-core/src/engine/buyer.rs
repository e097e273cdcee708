//! Buyer registration.

use serde::{Deserialize, Serialize};

use super::{create, delete, update, MutationContext, Transition};
use crate::collections::{CollectionKey, Collections};
use crate::error::CoreResult;
use crate::types::{Buyer, PartyStatus};
use crate::validation::{clean_name, validate_email, validate_optional_text};

/// The buyer form. `total_purchases` is not part of it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerInput {
    pub company_name: String,
    #[serde(default)]
    pub contact_person: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub status: PartyStatus,
}

struct CleanBuyer {
    company_name: String,
    contact_person: String,
    email: String,
    phone: String,
    address: String,
}

impl BuyerInput {
    fn validate(&self) -> CoreResult<CleanBuyer> {
        let company_name = clean_name("company name", &self.company_name)?;
        validate_optional_text("contact person", &self.contact_person)?;
        validate_optional_text("phone", &self.phone)?;
        validate_optional_text("address", &self.address)?;
        validate_email(&self.email)?;
        Ok(CleanBuyer {
            company_name,
            contact_person: self.contact_person.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
        })
    }
}

/// Registers a buyer with zero purchases, dated today, at the end of the list.
pub fn register_buyer(
    collections: &Collections,
    input: &BuyerInput,
    ctx: &MutationContext<'_>,
) -> CoreResult<Transition> {
    let clean = input.validate()?;
    let buyer = Buyer {
        id: ctx.ids.next_id(CollectionKey::Buyers),
        company_name: clean.company_name,
        contact_person: clean.contact_person,
        email: clean.email,
        phone: clean.phone,
        address: clean.address,
        registration_date: ctx.today,
        total_purchases_cents: 0,
        status: input.status,
    };
    Ok(create(collections, buyer))
}

pub fn update_buyer(
    collections: &Collections,
    id: &str,
    input: &BuyerInput,
) -> CoreResult<Transition> {
    let clean = input.validate()?;
    update::<Buyer, _>(collections, id, |current| {
        Ok(Buyer {
            company_name: clean.company_name,
            contact_person: clean.contact_person,
            email: clean.email,
            phone: clean.phone,
            address: clean.address,
            status: input.status,
            ..current.clone()
        })
    })
}

pub fn delete_buyer(collections: &Collections, id: &str) -> Transition {
    delete::<Buyer>(collections, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fixtures::Harness;
    use crate::seed;

    fn input() -> BuyerInput {
        BuyerInput {
            company_name: "Rift Valley Brews".to_string(),
            contact_person: "Ann Achieng".to_string(),
            email: "ann@riftbrews.co.ke".to_string(),
            phone: "+254 710 000 111".to_string(),
            address: "Oginga Odinga St, Kisumu".to_string(),
            status: PartyStatus::Active,
        }
    }

    #[test]
    fn test_register_appends_with_zero_purchases() {
        let harness = Harness::new();
        let collections = seed::collections();
        let transition = register_buyer(&collections, &input(), &harness.ctx()).unwrap();

        let buyer = transition.collections.buyers.last().unwrap();
        assert_eq!(buyer.id, "B100");
        assert_eq!(buyer.total_purchases_cents, 0);
        assert_eq!(transition.collections.buyers.len(), 4);
    }

    #[test]
    fn test_bad_email_rejected() {
        let harness = Harness::new();
        let mut bad = input();
        bad.email = "ann.riftbrews".to_string();
        assert!(register_buyer(&Collections::default(), &bad, &harness.ctx()).is_err());
    }

    #[test]
    fn test_update_keeps_purchases_and_sale_snapshots() {
        let collections = seed::collections();
        let mut edit = input();
        edit.company_name = "KTE Holdings".to_string();
        let transition = update_buyer(&collections, "B001", &edit).unwrap();

        let buyer = transition.collections.buyer("B001").unwrap();
        assert_eq!(buyer.company_name, "KTE Holdings");
        assert_eq!(buyer.total_purchases_cents, 250_000_000);
        assert_eq!(
            transition.collections.sale("S001").unwrap().buyer_name,
            "Kenya Tea Exporters Ltd"
        );
    }

    #[test]
    fn test_delete_buyer_keeps_sales() {
        let collections = seed::collections();
        let transition = delete_buyer(&collections, "B001");
        assert!(transition.collections.buyer("B001").is_none());
        assert_eq!(transition.collections.sales, collections.sales);
    }
}
