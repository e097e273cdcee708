//! # Default Dataset
//!
//! Records written to a collection the first time it is loaded. The store
//! seeds each collection independently, so an absent `sales` key gets these
//! two sales even when `buyers` already holds user data.

use chrono::NaiveDate;

use crate::collections::Collections;
use crate::types::{
    Buyer, Delivery, DeliveryStatus, Farmer, LotStatus, OutputPreference, PartyStatus,
    PaymentStatus, ProcessedLot, Sale, TeaGrade,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}

#[allow(clippy::too_many_arguments)]
fn farmer(
    id: &str,
    name: &str,
    phone: &str,
    location: &str,
    registered: NaiveDate,
    status: PartyStatus,
    output_preference: OutputPreference,
    delivered_kg: i64,
    balance: i64,
) -> Farmer {
    Farmer {
        id: id.to_string(),
        name: name.to_string(),
        phone: phone.to_string(),
        location: location.to_string(),
        registration_date: registered,
        status,
        output_preference,
        total_delivered_grams: delivered_kg * 1000,
        balance_cents: balance * 100,
    }
}

// One row per record, kept tabular.
#[rustfmt::skip]
pub fn farmers() -> Vec<Farmer> {
    use OutputPreference::{CoopSell, SelfCollect};
    use PartyStatus::{Active, Inactive};

    vec![
        farmer("F001", "James Mwangi", "+254 712 345 678", "Kericho Valley", date(2023, 1, 15), Active, CoopSell, 2450, 125_000),
        farmer("F002", "Sarah Wanjiku", "+254 723 456 789", "Nandi Hills", date(2023, 2, 20), Active, SelfCollect, 1820, 45_000),
        farmer("F003", "Peter Omondi", "+254 734 567 890", "Kisii Highlands", date(2023, 3, 10), Active, CoopSell, 3100, 189_000),
        farmer("F004", "Grace Njeri", "+254 745 678 901", "Limuru", date(2023, 4, 5), Active, CoopSell, 980, 67_000),
        farmer("F005", "David Kiprop", "+254 756 789 012", "Bomet", date(2023, 5, 12), Inactive, SelfCollect, 560, 0),
    ]
}

#[allow(clippy::too_many_arguments)]
fn delivery(
    id: &str,
    farmer_id: &str,
    farmer_name: &str,
    day: NaiveDate,
    raw_kg: i64,
    grade: TeaGrade,
    moisture_pct: u8,
    price_per_kg: i64,
    status: DeliveryStatus,
) -> Delivery {
    Delivery {
        id: id.to_string(),
        farmer_id: farmer_id.to_string(),
        farmer_name: farmer_name.to_string(),
        date: day,
        raw_weight_grams: raw_kg * 1000,
        grade,
        moisture_pct,
        price_per_kg_cents: price_per_kg * 100,
        total_amount_cents: raw_kg * price_per_kg * 100,
        status,
        notes: None,
    }
}

#[rustfmt::skip]
pub fn deliveries() -> Vec<Delivery> {
    use DeliveryStatus::{Pending, Processed, Processing};

    vec![
        delivery("IB001", "F001", "James Mwangi", date(2024, 1, 15), 250, TeaGrade::A, 72, 85, Processed),
        delivery("IB002", "F002", "Sarah Wanjiku", date(2024, 1, 16), 180, TeaGrade::B, 68, 75, Processing),
        delivery("IB003", "F003", "Peter Omondi", date(2024, 1, 17), 320, TeaGrade::A, 70, 85, Pending),
        delivery("IB004", "F004", "Grace Njeri", date(2024, 1, 18), 150, TeaGrade::C, 75, 60, Pending),
        delivery("IB005", "F001", "James Mwangi", date(2024, 1, 19), 200, TeaGrade::A, 71, 85, Processed),
    ]
}

pub fn lots() -> Vec<ProcessedLot> {
    vec![
        ProcessedLot {
            id: "PB001".to_string(),
            delivery_id: "IB001".to_string(),
            farmer_id: "F001".to_string(),
            farmer_name: "James Mwangi".to_string(),
            processed_date: date(2024, 1, 17),
            input_weight_grams: 250_000,
            output_weight_grams: 62_500,
            grade: TeaGrade::A,
            processing_loss_pct: 75,
            quality_score: 92,
            packaging_type: "25kg bags".to_string(),
            status: LotStatus::Available,
        },
        ProcessedLot {
            id: "PB002".to_string(),
            delivery_id: "IB005".to_string(),
            farmer_id: "F001".to_string(),
            farmer_name: "James Mwangi".to_string(),
            processed_date: date(2024, 1, 21),
            input_weight_grams: 200_000,
            output_weight_grams: 52_000,
            grade: TeaGrade::A,
            processing_loss_pct: 74,
            quality_score: 94,
            packaging_type: "25kg bags".to_string(),
            status: LotStatus::Sold,
        },
    ]
}

#[allow(clippy::too_many_arguments)]
fn buyer(
    id: &str,
    company_name: &str,
    contact_person: &str,
    email: &str,
    phone: &str,
    address: &str,
    registered: NaiveDate,
    total_purchases: i64,
) -> Buyer {
    Buyer {
        id: id.to_string(),
        company_name: company_name.to_string(),
        contact_person: contact_person.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        address: address.to_string(),
        registration_date: registered,
        total_purchases_cents: total_purchases * 100,
        status: PartyStatus::Active,
    }
}

#[rustfmt::skip]
pub fn buyers() -> Vec<Buyer> {
    vec![
        buyer("B001", "Kenya Tea Exporters Ltd", "John Kamau", "john@ktexporters.co.ke", "+254 720 111 222", "Mombasa Road, Nairobi", date(2023, 1, 1), 2_500_000),
        buyer("B002", "Highland Blends Co.", "Mary Wangari", "mary@highlandblends.com", "+254 721 222 333", "Industrial Area, Nakuru", date(2023, 3, 15), 1_800_000),
        buyer("B003", "African Tea Trading", "Ahmed Hassan", "ahmed@africanteaTrading.com", "+254 722 333 444", "Kenyatta Avenue, Eldoret", date(2023, 6, 20), 950_000),
    ]
}

pub fn sales() -> Vec<Sale> {
    vec![
        Sale {
            id: "S001".to_string(),
            buyer_id: "B001".to_string(),
            buyer_name: "Kenya Tea Exporters Ltd".to_string(),
            lot_id: "PB002".to_string(),
            date: date(2024, 1, 22),
            quantity_grams: 52_000,
            grade: TeaGrade::A,
            price_per_kg_cents: 45_000,
            total_amount_cents: 2_340_000,
            payment_status: PaymentStatus::Paid,
            farmer_id: "F001".to_string(),
            farmer_name: "James Mwangi".to_string(),
        },
        Sale {
            id: "S002".to_string(),
            buyer_id: "B002".to_string(),
            buyer_name: "Highland Blends Co.".to_string(),
            lot_id: "PB001".to_string(),
            date: date(2024, 1, 23),
            quantity_grams: 30_000,
            grade: TeaGrade::A,
            price_per_kg_cents: 44_000,
            total_amount_cents: 1_320_000,
            payment_status: PaymentStatus::Pending,
            farmer_id: "F001".to_string(),
            farmer_name: "James Mwangi".to_string(),
        },
    ]
}

/// The full default dataset.
pub fn collections() -> Collections {
    Collections {
        farmers: farmers(),
        deliveries: deliveries(),
        lots: lots(),
        buyers: buyers(),
        sales: sales(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::processing_loss_pct;

    #[test]
    fn test_seed_sizes() {
        let seed = collections();
        assert_eq!(seed.farmers.len(), 5);
        assert_eq!(seed.deliveries.len(), 5);
        assert_eq!(seed.lots.len(), 2);
        assert_eq!(seed.buyers.len(), 3);
        assert_eq!(seed.sales.len(), 2);
    }

    #[test]
    fn test_seed_derived_fields_are_consistent() {
        let seed = collections();
        for d in &seed.deliveries {
            assert_eq!(d.total_amount(), d.price_per_kg().for_weight(d.raw_weight()));
        }
        for lot in &seed.lots {
            assert_eq!(
                lot.processing_loss_pct,
                processing_loss_pct(lot.input_weight_grams, lot.output_weight_grams)
            );
        }
        for s in &seed.sales {
            assert_eq!(s.total_amount(), s.price_per_kg().for_weight(s.quantity()));
        }
    }
}
