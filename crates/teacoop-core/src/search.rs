//! # Search
//!
//! Filters used by the management views: a case-insensitive substring query
//! over a few text fields, plus optional enum filters.
//!
//! | View        | Query matches                         | Filters        |
//! |-------------|---------------------------------------|----------------|
//! | Farmers     | name, location, id                    | status         |
//! | Deliveries  | id, farmer name                       | status, grade  |
//! | Processing  | id, farmer name                       | status         |
//! | Buyers      | company name, contact person, id      | status         |
//! | Sales       | id, buyer name, farmer name           | payment status |

use serde::{Deserialize, Serialize};

use crate::collections::Collections;
use crate::types::{
    Buyer, Delivery, DeliveryStatus, Farmer, LotStatus, PartyStatus, PaymentStatus, ProcessedLot,
    Sale, TeaGrade,
};
use crate::validation::{validate_search_query, ValidationResult};

/// A record with text fields the search box matches against.
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;

    /// `needle` must already be lowercase.
    fn matches(&self, needle: &str) -> bool {
        needle.is_empty()
            || self
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(needle))
    }
}

impl Searchable for Farmer {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.location.as_str(), self.id.as_str()]
    }
}

impl Searchable for Delivery {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.id.as_str(), self.farmer_name.as_str()]
    }
}

impl Searchable for ProcessedLot {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.id.as_str(), self.farmer_name.as_str()]
    }
}

impl Searchable for Buyer {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.company_name.as_str(), self.contact_person.as_str(), self.id.as_str()]
    }
}

impl Searchable for Sale {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.id.as_str(), self.buyer_name.as_str(), self.farmer_name.as_str()]
    }
}

/// Applies `query` and `keep` to `records`, preserving order.
pub fn search<'a, T, F>(records: &'a [T], query: &str, keep: F) -> ValidationResult<Vec<&'a T>>
where
    T: Searchable,
    F: Fn(&T) -> bool,
{
    let needle = validate_search_query(query)?.to_lowercase();
    Ok(records
        .iter()
        .filter(|r| r.matches(&needle) && keep(*r))
        .collect())
}

fn allows<T: PartialEq>(filter: Option<T>, value: T) -> bool {
    filter.map_or(true, |wanted| wanted == value)
}

// =============================================================================
// View Filters
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FarmerFilter {
    pub query: String,
    pub status: Option<PartyStatus>,
}

impl FarmerFilter {
    pub fn apply<'a>(&self, farmers: &'a [Farmer]) -> ValidationResult<Vec<&'a Farmer>> {
        search(farmers, &self.query, |f| allows(self.status, f.status))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryFilter {
    pub query: String,
    pub status: Option<DeliveryStatus>,
    pub grade: Option<TeaGrade>,
}

impl DeliveryFilter {
    pub fn apply<'a>(&self, deliveries: &'a [Delivery]) -> ValidationResult<Vec<&'a Delivery>> {
        search(deliveries, &self.query, |d| {
            allows(self.status, d.status) && allows(self.grade, d.grade)
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LotFilter {
    pub query: String,
    pub status: Option<LotStatus>,
}

impl LotFilter {
    pub fn apply<'a>(&self, lots: &'a [ProcessedLot]) -> ValidationResult<Vec<&'a ProcessedLot>> {
        search(lots, &self.query, |l| allows(self.status, l.status))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuyerFilter {
    pub query: String,
    pub status: Option<PartyStatus>,
}

impl BuyerFilter {
    pub fn apply<'a>(&self, buyers: &'a [Buyer]) -> ValidationResult<Vec<&'a Buyer>> {
        search(buyers, &self.query, |b| allows(self.status, b.status))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaleFilter {
    pub query: String,
    pub payment_status: Option<PaymentStatus>,
}

impl SaleFilter {
    pub fn apply<'a>(&self, sales: &'a [Sale]) -> ValidationResult<Vec<&'a Sale>> {
        search(sales, &self.query, |s| allows(self.payment_status, s.payment_status))
    }
}

// =============================================================================
// Form Pick Lists
// =============================================================================

/// Farmers offered by the delivery form.
pub fn active_farmers(collections: &Collections) -> Vec<&Farmer> {
    collections.farmers.iter().filter(|f| f.is_active()).collect()
}

/// Buyers offered by the sales form.
pub fn active_buyers(collections: &Collections) -> Vec<&Buyer> {
    collections.buyers.iter().filter(|b| b.is_active()).collect()
}

/// Deliveries offered by the processing form.
pub fn processable_deliveries(collections: &Collections) -> Vec<&Delivery> {
    collections
        .deliveries
        .iter()
        .filter(|d| d.status.is_processable())
        .collect()
}

/// Lots offered by the sales form.
pub fn available_lots(collections: &Collections) -> Vec<&ProcessedLot> {
    collections
        .lots
        .iter()
        .filter(|l| l.status == LotStatus::Available)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    fn ids<T: crate::collections::Record>(records: Vec<&T>) -> Vec<&str> {
        records.into_iter().map(|r| r.id()).collect()
    }

    #[test]
    fn test_farmer_search_by_location_case_insensitive() {
        let seed = seed::collections();
        let filter = FarmerFilter {
            query: "HILLS".to_string(),
            status: None,
        };
        assert_eq!(ids(filter.apply(&seed.farmers).unwrap()), vec!["F002"]);
    }

    #[test]
    fn test_farmer_status_filter() {
        let seed = seed::collections();
        let filter = FarmerFilter {
            query: String::new(),
            status: Some(PartyStatus::Inactive),
        };
        assert_eq!(ids(filter.apply(&seed.farmers).unwrap()), vec!["F005"]);
    }

    #[test]
    fn test_delivery_search_combines_filters() {
        let seed = seed::collections();
        let filter = DeliveryFilter {
            query: "james".to_string(),
            status: Some(DeliveryStatus::Processed),
            grade: Some(TeaGrade::A),
        };
        assert_eq!(ids(filter.apply(&seed.deliveries).unwrap()), vec!["IB001", "IB005"]);

        let by_id = DeliveryFilter {
            query: "ib004".to_string(),
            ..DeliveryFilter::default()
        };
        assert_eq!(ids(by_id.apply(&seed.deliveries).unwrap()), vec!["IB004"]);
    }

    #[test]
    fn test_buyer_search_by_contact() {
        let seed = seed::collections();
        let filter = BuyerFilter {
            query: "wangari".to_string(),
            status: None,
        };
        assert_eq!(ids(filter.apply(&seed.buyers).unwrap()), vec!["B002"]);
    }

    #[test]
    fn test_sale_search_by_farmer_and_payment() {
        let seed = seed::collections();
        let filter = SaleFilter {
            query: "mwangi".to_string(),
            payment_status: Some(PaymentStatus::Pending),
        };
        assert_eq!(ids(filter.apply(&seed.sales).unwrap()), vec!["S002"]);
    }

    #[test]
    fn test_lot_status_filter() {
        let seed = seed::collections();
        let filter = LotFilter {
            query: String::new(),
            status: Some(LotStatus::Sold),
        };
        assert_eq!(ids(filter.apply(&seed.lots).unwrap()), vec!["PB002"]);
    }

    #[test]
    fn test_long_query_rejected() {
        let seed = seed::collections();
        let filter = FarmerFilter {
            query: "x".repeat(101),
            status: None,
        };
        assert!(filter.apply(&seed.farmers).is_err());
    }

    #[test]
    fn test_pick_lists() {
        let seed = seed::collections();
        assert_eq!(active_farmers(&seed).len(), 4);
        assert_eq!(active_buyers(&seed).len(), 3);
        assert_eq!(ids(processable_deliveries(&seed)), vec!["IB002", "IB003", "IB004"]);
        assert_eq!(ids(available_lots(&seed)), vec!["PB001"]);
    }
}
