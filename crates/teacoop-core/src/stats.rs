//! # Aggregation Layer
//!
//! Read-only figures for the dashboard, the management views and the reports
//! page. Every function recomputes from the collections it is given; nothing
//! is cached.
//!
//! ## Stored vs Derived Totals
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Farmer.total_delivered / Farmer.balance / Buyer.total_purchases        │
//! │    stored on the record, only ever set by the seed data                 │
//! │    → used by the reports page (top farmers, buyer activity)             │
//! │                                                                         │
//! │  farmer_ledgers / buyer_ledgers / lot_ledgers                           │
//! │    summed from deliveries and sales on every call                       │
//! │    → always agree with the records that exist right now                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::collections::Collections;
use crate::money::Money;
use crate::types::{
    Buyer, Delivery, DeliveryStatus, Farmer, LotStatus, OutputPreference, PartyStatus,
    PaymentStatus, ProcessedLot, Sale, TeaGrade,
};
use crate::weight::Weight;

/// Number of farmers listed in the contribution report.
pub const TOP_FARMER_COUNT: usize = 5;

// =============================================================================
// Valuation
// =============================================================================

/// How unsold stock is valued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationConfig {
    /// Price per kg applied to the output weight of available lots.
    pub inventory_unit_price: Money,
}

impl ValuationConfig {
    pub const DEFAULT_UNIT_PRICE: Money = Money::from_major(400);
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            inventory_unit_price: Self::DEFAULT_UNIT_PRICE,
        }
    }
}

/// `round(part / whole × 100)` with ties toward +∞; 0 when `whole` is 0.
pub fn percent_half_up(part: i64, whole: i64) -> i64 {
    if whole == 0 {
        return 0;
    }
    let (part, whole) = if whole < 0 {
        (-(part as i128), -(whole as i128))
    } else {
        (part as i128, whole as i128)
    };
    (200 * part + whole).div_euclid(2 * whole) as i64
}

// =============================================================================
// Dashboard
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub total_farmers: usize,
    pub active_farmers: usize,
    pub total_buyers: usize,
    pub active_buyers: usize,
    /// Deliveries with status `pending`.
    pub pending_deliveries: usize,
    pub processed_lots: usize,
    /// Lots whose processed date falls in the reference month.
    pub lots_processed_this_month: usize,
    /// Value of sales dated in the reference month.
    pub sales_this_month: Money,
    pub total_sales_value: Money,
    pub inventory_value: Money,
    pub outstanding_payments: Money,
}

fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// Value of all `available` lots at the configured unit price.
pub fn inventory_value(lots: &[ProcessedLot], valuation: &ValuationConfig) -> Money {
    lots.iter()
        .filter(|l| l.status == LotStatus::Available)
        .map(|l| valuation.inventory_unit_price.for_weight(l.output_weight()))
        .sum()
}

/// Sum of sale amounts not yet fully paid.
pub fn outstanding_payments(sales: &[Sale]) -> Money {
    sales
        .iter()
        .filter(|s| s.is_outstanding())
        .map(Sale::total_amount)
        .sum()
}

pub fn dashboard(
    collections: &Collections,
    reference: NaiveDate,
    valuation: &ValuationConfig,
) -> Dashboard {
    Dashboard {
        total_farmers: collections.farmers.len(),
        active_farmers: collections.farmers.iter().filter(|f| f.is_active()).count(),
        total_buyers: collections.buyers.len(),
        active_buyers: collections.buyers.iter().filter(|b| b.is_active()).count(),
        pending_deliveries: collections
            .deliveries
            .iter()
            .filter(|d| d.status == DeliveryStatus::Pending)
            .count(),
        processed_lots: collections.lots.len(),
        lots_processed_this_month: collections
            .lots
            .iter()
            .filter(|l| same_month(l.processed_date, reference))
            .count(),
        sales_this_month: collections
            .sales
            .iter()
            .filter(|s| same_month(s.date, reference))
            .map(Sale::total_amount)
            .sum(),
        total_sales_value: collections.sales.iter().map(Sale::total_amount).sum(),
        inventory_value: inventory_value(&collections.lots, valuation),
        outstanding_payments: outstanding_payments(&collections.sales),
    }
}

// =============================================================================
// View Summaries
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct FarmerSummary {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub coop_sell: usize,
    pub self_collect: usize,
}

pub fn farmer_summary<'a>(farmers: impl IntoIterator<Item = &'a Farmer>) -> FarmerSummary {
    farmers.into_iter().fold(FarmerSummary::default(), |mut acc, f| {
        acc.total += 1;
        match f.status {
            PartyStatus::Active => acc.active += 1,
            PartyStatus::Inactive => acc.inactive += 1,
        }
        match f.output_preference {
            OutputPreference::CoopSell => acc.coop_sell += 1,
            OutputPreference::SelfCollect => acc.self_collect += 1,
        }
        acc
    })
}

/// Totals over whatever slice of deliveries the view is showing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DeliverySummary {
    pub count: usize,
    pub total_weight: Weight,
    pub total_value: Money,
    pub pending: usize,
}

pub fn delivery_summary<'a>(deliveries: impl IntoIterator<Item = &'a Delivery>) -> DeliverySummary {
    deliveries
        .into_iter()
        .fold(DeliverySummary::default(), |mut acc, d| {
            acc.count += 1;
            acc.total_weight += d.raw_weight();
            acc.total_value += d.total_amount();
            if d.status == DeliveryStatus::Pending {
                acc.pending += 1;
            }
            acc
        })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingSummary {
    pub lot_count: usize,
    pub total_output: Weight,
    pub available_output: Weight,
    /// Rounded mean quality score, 0 without lots.
    pub average_quality: i64,
    /// Deliveries still `pending` or `processing`.
    pub awaiting_processing: usize,
}

/// Rounded mean of all lots' quality scores; 0 when there are none.
pub fn average_quality(lots: &[ProcessedLot]) -> i64 {
    let total: i64 = lots.iter().map(|l| i64::from(l.quality_score)).sum();
    percent_half_up(total, lots.len() as i64 * 100)
}

pub fn processing_summary(collections: &Collections) -> ProcessingSummary {
    ProcessingSummary {
        lot_count: collections.lots.len(),
        total_output: collections.lots.iter().map(ProcessedLot::output_weight).sum(),
        available_output: collections
            .lots
            .iter()
            .filter(|l| l.status == LotStatus::Available)
            .map(ProcessedLot::output_weight)
            .sum(),
        average_quality: average_quality(&collections.lots),
        awaiting_processing: collections
            .deliveries
            .iter()
            .filter(|d| d.status.is_processable())
            .count(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub count: usize,
    pub revenue: Money,
    pub pending_payments: Money,
    /// Output weight of lots still `available`.
    pub available_stock: Weight,
}

pub fn sales_summary(collections: &Collections) -> SalesSummary {
    SalesSummary {
        count: collections.sales.len(),
        revenue: collections.sales.iter().map(Sale::total_amount).sum(),
        pending_payments: outstanding_payments(&collections.sales),
        available_stock: collections
            .lots
            .iter()
            .filter(|l| l.status == LotStatus::Available)
            .map(ProcessedLot::output_weight)
            .sum(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BuyerSummary {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    /// Sum of the stored per-buyer totals.
    pub total_purchases: Money,
}

pub fn buyer_summary<'a>(buyers: impl IntoIterator<Item = &'a Buyer>) -> BuyerSummary {
    buyers.into_iter().fold(BuyerSummary::default(), |mut acc, b| {
        acc.total += 1;
        match b.status {
            PartyStatus::Active => acc.active += 1,
            PartyStatus::Inactive => acc.inactive += 1,
        }
        acc.total_purchases += b.total_purchases();
        acc
    })
}

// =============================================================================
// Reports
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct GradeShare {
    pub grade: TeaGrade,
    pub label: String,
    pub weight: Weight,
    pub share_pct: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceCount {
    pub preference: OutputPreference,
    pub farmers: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LotEfficiency {
    pub lot_id: String,
    pub efficiency_pct: i64,
    pub quality_score: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct FarmerContribution {
    pub farmer_id: String,
    pub name: String,
    pub delivered: Weight,
    pub balance: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BuyerActivity {
    pub buyer_id: String,
    pub company_name: String,
    pub total_purchases: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Financials {
    /// Sum of sale amounts.
    pub revenue: Money,
    /// Sum of delivery amounts.
    pub cost: Money,
    pub gross_margin: Money,
    /// round(margin / revenue × 100), 0 without revenue.
    pub margin_pct: i64,
}

/// Volumes per calendar month (`YYYY-MM`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyVolume {
    pub month: String,
    pub incoming: Weight,
    pub processed: Weight,
    pub sold: Weight,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub grade_distribution: Vec<GradeShare>,
    pub preferences: Vec<PreferenceCount>,
    pub efficiency: Vec<LotEfficiency>,
    pub top_farmers: Vec<FarmerContribution>,
    pub buyer_activity: Vec<BuyerActivity>,
    pub financials: Financials,
    pub monthly_volumes: Vec<MonthlyVolume>,
}

/// Delivered raw weight per grade, with each grade's share of the total.
pub fn grade_distribution(deliveries: &[Delivery]) -> Vec<GradeShare> {
    let total: Weight = deliveries.iter().map(Delivery::raw_weight).sum();
    TeaGrade::ALL
        .iter()
        .map(|&grade| {
            let weight: Weight = deliveries
                .iter()
                .filter(|d| d.grade == grade)
                .map(Delivery::raw_weight)
                .sum();
            GradeShare {
                grade,
                label: grade.label(),
                weight,
                share_pct: percent_half_up(weight.grams(), total.grams()),
            }
        })
        .collect()
}

pub fn preference_counts(farmers: &[Farmer]) -> Vec<PreferenceCount> {
    [OutputPreference::CoopSell, OutputPreference::SelfCollect]
        .into_iter()
        .map(|preference| PreferenceCount {
            preference,
            farmers: farmers
                .iter()
                .filter(|f| f.output_preference == preference)
                .count(),
        })
        .collect()
}

pub fn lot_efficiency(lots: &[ProcessedLot]) -> Vec<LotEfficiency> {
    lots.iter()
        .map(|l| LotEfficiency {
            lot_id: l.id.clone(),
            efficiency_pct: l.efficiency_pct(),
            quality_score: l.quality_score,
        })
        .collect()
}

/// Farmers with a positive stored delivered total, largest first.
pub fn top_farmers(farmers: &[Farmer], limit: usize) -> Vec<FarmerContribution> {
    let mut ranked: Vec<&Farmer> = farmers
        .iter()
        .filter(|f| f.total_delivered_grams > 0)
        .collect();
    ranked.sort_by(|a, b| b.total_delivered_grams.cmp(&a.total_delivered_grams));
    ranked
        .into_iter()
        .take(limit)
        .map(|f| FarmerContribution {
            farmer_id: f.id.clone(),
            name: f.name.clone(),
            delivered: f.total_delivered(),
            balance: f.balance(),
        })
        .collect()
}

pub fn buyer_activity(buyers: &[Buyer]) -> Vec<BuyerActivity> {
    buyers
        .iter()
        .map(|b| BuyerActivity {
            buyer_id: b.id.clone(),
            company_name: b.company_name.clone(),
            total_purchases: b.total_purchases(),
        })
        .collect()
}

pub fn financials(collections: &Collections) -> Financials {
    let revenue: Money = collections.sales.iter().map(Sale::total_amount).sum();
    let cost: Money = collections.deliveries.iter().map(Delivery::total_amount).sum();
    let gross_margin = revenue - cost;
    Financials {
        revenue,
        cost,
        gross_margin,
        margin_pct: percent_half_up(gross_margin.cents(), revenue.cents()),
    }
}

fn month_entry(months: &mut BTreeMap<String, MonthlyVolume>, date: NaiveDate) -> &mut MonthlyVolume {
    let key = format!("{:04}-{:02}", date.year(), date.month());
    months.entry(key.clone()).or_insert_with(|| MonthlyVolume {
        month: key,
        ..MonthlyVolume::default()
    })
}

/// Incoming, processed and sold weight per month, oldest first.
pub fn monthly_volumes(collections: &Collections) -> Vec<MonthlyVolume> {
    let mut months = BTreeMap::new();
    for d in &collections.deliveries {
        month_entry(&mut months, d.date).incoming += d.raw_weight();
    }
    for l in &collections.lots {
        month_entry(&mut months, l.processed_date).processed += l.output_weight();
    }
    for s in &collections.sales {
        month_entry(&mut months, s.date).sold += s.quantity();
    }
    months.into_values().collect()
}

pub fn report(collections: &Collections) -> Report {
    Report {
        grade_distribution: grade_distribution(&collections.deliveries),
        preferences: preference_counts(&collections.farmers),
        efficiency: lot_efficiency(&collections.lots),
        top_farmers: top_farmers(&collections.farmers, TOP_FARMER_COUNT),
        buyer_activity: buyer_activity(&collections.buyers),
        financials: financials(collections),
        monthly_volumes: monthly_volumes(collections),
    }
}

// =============================================================================
// Derived Ledgers
// =============================================================================

/// A farmer's totals summed from the deliveries that exist now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct FarmerLedger {
    pub farmer_id: String,
    pub name: String,
    pub deliveries: usize,
    pub delivered: Weight,
    pub earned: Money,
}

/// A buyer's totals summed from the sales that exist now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BuyerLedger {
    pub buyer_id: String,
    pub company_name: String,
    pub sales: usize,
    pub purchased: Weight,
    pub spent: Money,
    pub outstanding: Money,
}

/// How much of a lot has been sold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LotLedger {
    pub lot_id: String,
    pub status: LotStatus,
    pub output: Weight,
    pub sold: Weight,
    /// Output minus sold, never below zero.
    pub remaining: Weight,
    pub oversold: bool,
}

pub fn farmer_ledgers(collections: &Collections) -> Vec<FarmerLedger> {
    collections
        .farmers
        .iter()
        .map(|f| {
            let own = collections.deliveries.iter().filter(|d| d.farmer_id == f.id);
            let summary = delivery_summary(own);
            FarmerLedger {
                farmer_id: f.id.clone(),
                name: f.name.clone(),
                deliveries: summary.count,
                delivered: summary.total_weight,
                earned: summary.total_value,
            }
        })
        .collect()
}

pub fn buyer_ledgers(collections: &Collections) -> Vec<BuyerLedger> {
    collections
        .buyers
        .iter()
        .map(|b| {
            let own: Vec<&Sale> = collections
                .sales
                .iter()
                .filter(|s| s.buyer_id == b.id)
                .collect();
            BuyerLedger {
                buyer_id: b.id.clone(),
                company_name: b.company_name.clone(),
                sales: own.len(),
                purchased: own.iter().map(|s| s.quantity()).sum(),
                spent: own.iter().map(|s| s.total_amount()).sum(),
                outstanding: own
                    .iter()
                    .filter(|s| s.payment_status != PaymentStatus::Paid)
                    .map(|s| s.total_amount())
                    .sum(),
            }
        })
        .collect()
}

/// Sold and remaining weight for one lot.
pub fn lot_ledger(collections: &Collections, lot: &ProcessedLot) -> LotLedger {
    let sold: Weight = collections
        .sales
        .iter()
        .filter(|s| s.lot_id == lot.id)
        .map(Sale::quantity)
        .sum();
    LotLedger {
        lot_id: lot.id.clone(),
        status: lot.status,
        output: lot.output_weight(),
        sold,
        remaining: lot.output_weight().saturating_sub(sold),
        oversold: sold > lot.output_weight(),
    }
}

pub fn lot_ledgers(collections: &Collections) -> Vec<LotLedger> {
    collections
        .lots
        .iter()
        .map(|lot| lot_ledger(collections, lot))
        .collect()
}

// =============================================================================
// Reference Lookups
// =============================================================================

/// Current name of a farmer, for display next to a (possibly stale) snapshot.
pub fn farmer_name_for<'a>(collections: &'a Collections, farmer_id: &str) -> Option<&'a str> {
    collections.farmer(farmer_id).map(|f| f.name.as_str())
}

/// Current company name of a buyer.
pub fn buyer_name_for<'a>(collections: &'a Collections, buyer_id: &str) -> Option<&'a str> {
    collections.buyer(buyer_id).map(|b| b.company_name.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{update_farmer, FarmerInput};
    use crate::seed;

    fn january() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()
    }

    #[test]
    fn test_percent_half_up() {
        assert_eq!(percent_half_up(1, 2), 50);
        assert_eq!(percent_half_up(1, 3), 33);
        assert_eq!(percent_half_up(2, 3), 67);
        assert_eq!(percent_half_up(1, 8), 13);
        assert_eq!(percent_half_up(-1, 8), -12);
        assert_eq!(percent_half_up(5, 0), 0);
    }

    #[test]
    fn test_dashboard_over_seed() {
        let seed = seed::collections();
        let dash = dashboard(&seed, january(), &ValuationConfig::default());

        assert_eq!(dash.total_farmers, 5);
        assert_eq!(dash.active_farmers, 4);
        assert_eq!(dash.total_buyers, 3);
        assert_eq!(dash.active_buyers, 3);
        assert_eq!(dash.pending_deliveries, 2);
        assert_eq!(dash.processed_lots, 2);
        assert_eq!(dash.lots_processed_this_month, 2);
        assert_eq!(dash.sales_this_month, Money::from_major(36_600));
        assert_eq!(dash.total_sales_value, Money::from_major(36_600));
        // PB001: 62.5 kg × 400
        assert_eq!(dash.inventory_value, Money::from_major(25_000));
        assert_eq!(dash.outstanding_payments, Money::from_major(13_200));
    }

    #[test]
    fn test_dashboard_other_month() {
        let seed = seed::collections();
        let march = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let dash = dashboard(&seed, march, &ValuationConfig::default());
        assert_eq!(dash.lots_processed_this_month, 0);
        assert_eq!(dash.sales_this_month, Money::zero());
    }

    #[test]
    fn test_inventory_value_uses_configured_price() {
        let seed = seed::collections();
        let valuation = ValuationConfig {
            inventory_unit_price: Money::from_major(500),
        };
        assert_eq!(inventory_value(&seed.lots, &valuation), Money::from_major(31_250));
    }

    #[test]
    fn test_empty_collections() {
        let empty = Collections::default();
        let dash = dashboard(&empty, january(), &ValuationConfig::default());
        assert_eq!(dash.total_sales_value, Money::zero());
        assert_eq!(average_quality(&empty.lots), 0);
        assert_eq!(financials(&empty).margin_pct, 0);
        assert!(monthly_volumes(&empty).is_empty());
        assert!(grade_distribution(&empty.deliveries)
            .iter()
            .all(|g| g.share_pct == 0));
    }

    #[test]
    fn test_view_summaries() {
        let seed = seed::collections();

        let farmers = farmer_summary(&seed.farmers);
        assert_eq!((farmers.active, farmers.inactive), (4, 1));
        assert_eq!((farmers.coop_sell, farmers.self_collect), (3, 2));

        let deliveries = delivery_summary(&seed.deliveries);
        assert_eq!(deliveries.count, 5);
        assert_eq!(deliveries.total_weight, Weight::from_kg(1_100));
        assert_eq!(deliveries.total_value, Money::from_major(87_950));
        assert_eq!(deliveries.pending, 2);

        let processing = processing_summary(&seed);
        assert_eq!(processing.total_output, Weight::from_grams(114_500));
        assert_eq!(processing.available_output, Weight::from_grams(62_500));
        assert_eq!(processing.average_quality, 93);
        assert_eq!(processing.awaiting_processing, 3);

        let sales = sales_summary(&seed);
        assert_eq!(sales.revenue, Money::from_major(36_600));
        assert_eq!(sales.pending_payments, Money::from_major(13_200));
        assert_eq!(sales.available_stock, Weight::from_grams(62_500));

        let buyers = buyer_summary(&seed.buyers);
        assert_eq!(buyers.total_purchases, Money::from_major(5_250_000));
    }

    #[test]
    fn test_report_over_seed() {
        let seed = seed::collections();
        let report = report(&seed);

        let shares: Vec<(TeaGrade, i64, i64)> = report
            .grade_distribution
            .iter()
            .map(|g| (g.grade, g.weight.grams() / 1000, g.share_pct))
            .collect();
        assert_eq!(
            shares,
            vec![(TeaGrade::A, 770, 70), (TeaGrade::B, 180, 16), (TeaGrade::C, 150, 14)]
        );

        assert_eq!(report.preferences[0].farmers, 3);
        assert_eq!(report.preferences[1].farmers, 2);

        assert_eq!(report.efficiency[0].efficiency_pct, 25);
        assert_eq!(report.efficiency[1].efficiency_pct, 26);

        let top: Vec<&str> = report.top_farmers.iter().map(|f| f.farmer_id.as_str()).collect();
        assert_eq!(top, vec!["F003", "F001", "F002", "F004", "F005"]);

        assert_eq!(report.financials.revenue, Money::from_major(36_600));
        assert_eq!(report.financials.cost, Money::from_major(87_950));
        assert_eq!(report.financials.gross_margin, Money::from_major(-51_350));
        assert_eq!(report.financials.margin_pct, -140);

        assert_eq!(report.monthly_volumes.len(), 1);
        assert_eq!(report.monthly_volumes[0].month, "2024-01");
        assert_eq!(report.monthly_volumes[0].sold, Weight::from_kg(82));
    }

    #[test]
    fn test_top_farmers_skips_zero_and_limits() {
        let mut seed = seed::collections();
        seed.farmers[4].total_delivered_grams = 0;
        let top = top_farmers(&seed.farmers, 3);
        assert_eq!(top.len(), 3);
        assert!(top.iter().all(|f| f.farmer_id != "F005"));
    }

    #[test]
    fn test_ledgers() {
        let seed = seed::collections();

        let farmers = farmer_ledgers(&seed);
        let james = farmers.iter().find(|l| l.farmer_id == "F001").unwrap();
        assert_eq!(james.deliveries, 2);
        assert_eq!(james.delivered, Weight::from_kg(450));
        assert_eq!(james.earned, Money::from_major(38_250));
        let david = farmers.iter().find(|l| l.farmer_id == "F005").unwrap();
        assert_eq!(david.deliveries, 0);

        let buyers = buyer_ledgers(&seed);
        let highland = buyers.iter().find(|l| l.buyer_id == "B002").unwrap();
        assert_eq!(highland.spent, Money::from_major(13_200));
        assert_eq!(highland.outstanding, Money::from_major(13_200));

        let lots = lot_ledgers(&seed);
        assert_eq!(lots[0].remaining, Weight::from_grams(32_500));
        assert!(!lots[0].oversold);
        assert_eq!(lots[1].remaining, Weight::zero());
    }

    #[test]
    fn test_name_lookup_follows_edits() {
        let seed = seed::collections();
        let edit = FarmerInput {
            name: "James K. Mwangi".to_string(),
            ..FarmerInput::default()
        };
        let edited = update_farmer(&seed, "F001", &edit).unwrap().collections;

        let delivery = edited.delivery("IB001").unwrap();
        assert_eq!(delivery.farmer_name, "James Mwangi");
        assert_eq!(farmer_name_for(&edited, &delivery.farmer_id), Some("James K. Mwangi"));
        assert_eq!(farmer_name_for(&edited, "F404"), None);
        assert_eq!(buyer_name_for(&edited, "B001"), Some("Kenya Tea Exporters Ltd"));
    }
}
