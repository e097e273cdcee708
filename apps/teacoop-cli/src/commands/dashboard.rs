//! # Dashboard and Report Commands

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use teacoop_core::stats::{self, Dashboard, Report};

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    /// Day whose month "this month" figures refer to.
    pub reference_date: NaiveDate,
    pub currency_code: String,
    #[serde(flatten)]
    pub dashboard: Dashboard,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub currency_code: String,
    #[serde(flatten)]
    pub report: Report,
}

/// Headline figures; `reference` defaults to today.
pub async fn dashboard(
    state: &AppState,
    reference: Option<NaiveDate>,
) -> ApiResult<DashboardResponse> {
    let reference_date = reference.unwrap_or_else(|| state.today());
    debug!(%reference_date, "dashboard command");

    let collections = state.snapshot().await?;
    Ok(DashboardResponse {
        reference_date,
        currency_code: state.config().currency_code.clone(),
        dashboard: stats::dashboard(&collections, reference_date, state.valuation()),
    })
}

/// The reports page: distributions, rankings, financials, monthly volumes.
pub async fn report(state: &AppState) -> ApiResult<ReportResponse> {
    debug!("report command");
    let collections = state.snapshot().await?;
    Ok(ReportResponse {
        currency_code: state.config().currency_code.clone(),
        report: stats::report(&collections),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::state::fixtures;
    use teacoop_core::Money;

    #[tokio::test]
    async fn test_dashboard_over_seed() {
        let state = fixtures::state().await;
        let january = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let response = dashboard(&state, Some(january)).await.unwrap();
        let figures = &response.dashboard;

        assert_eq!(response.currency_code, "KES");
        assert_eq!(figures.total_farmers, 5);
        assert_eq!(figures.active_farmers, 4);
        assert_eq!(figures.pending_deliveries, 2);
        assert_eq!(figures.lots_processed_this_month, 2);
        assert_eq!(figures.sales_this_month, Money::from_major(36_600));
        assert_eq!(figures.inventory_value, Money::from_major(25_000));
        assert_eq!(figures.outstanding_payments, Money::from_major(13_200));
    }

    #[tokio::test]
    async fn test_dashboard_defaults_to_today() {
        let state = fixtures::state().await;
        let response = dashboard(&state, None).await.unwrap();
        assert_eq!(response.reference_date, fixtures::today());
        assert_eq!(response.dashboard.sales_this_month, Money::zero());
    }

    #[tokio::test]
    async fn test_configured_unit_price_values_inventory() {
        let config = AppConfig {
            inventory_unit_price: Money::from_major(200),
            ..AppConfig::default()
        };
        let state = fixtures::state_with(config).await;
        let response = dashboard(&state, None).await.unwrap();
        assert_eq!(response.dashboard.inventory_value, Money::from_major(12_500));
    }

    #[tokio::test]
    async fn test_report_over_seed() {
        let state = fixtures::state().await;
        let response = report(&state).await.unwrap();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["currencyCode"], "KES");
        assert!(json.get("financials").is_some());
    }
}
