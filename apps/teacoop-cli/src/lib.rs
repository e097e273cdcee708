//! # TeaCoop Ledger Application
//!
//! Configuration, logging, the command layer and the `teacoop` binary's
//! dispatch. Every command prints one JSON document on stdout.
//!
//! ## Module Organization
//! ```text
//! teacoop_cli/
//! ├── lib.rs          ◄─── You are here (startup & dispatch)
//! ├── cli.rs          ◄─── clap subcommands and form arguments
//! ├── config.rs       ◄─── config.toml, env overrides, platform paths
//! ├── state.rs        ◄─── AppState: store, config, ids, write lock
//! ├── commands/
//! │   ├── mod.rs      ◄─── Listing / Mutation / delete
//! │   ├── farmers.rs
//! │   ├── deliveries.rs
//! │   ├── processing.rs
//! │   ├── buyers.rs
//! │   ├── sales.rs
//! │   └── dashboard.rs
//! └── error.rs        ◄─── ApiError with stable codes
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod state;

use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use teacoop_core::engine::SaleInput;
use teacoop_core::search::{BuyerFilter, DeliveryFilter, FarmerFilter, LotFilter, SaleFilter};
use teacoop_core::{CollectionKey, ValidationError};

use cli::{
    BuyerCommand, Cli, Command, ConfigCommand, DeliveryCommand, FarmerCommand, LedgerKind,
    ListArgs, LotCommand, PickList, SaleCommand,
};
use commands::sales::SalePatch;
use commands::{buyers, dashboard, deliveries, farmers, processing, sales};
use config::{default_config_path, AppConfig, ConfigError};
use error::{ApiError, ApiResult, ErrorCode};
use state::AppState;

/// Runs one parsed command line and returns the JSON to print.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Load config ──── --config / TEACOOP_CONFIG / platform file         │
/// │                      then TEACOOP_* overrides, then --database         │
/// │  2. Init logging ─── RUST_LOG, else the configured filter (stderr)     │
/// │  3. `config ...` ─── answered without touching the database            │
/// │  4. Open store ───── migrations, seed on first load                    │
/// │  5. Execute ──────── one command, then close the pool                  │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(cli: Cli) -> ApiResult<String> {
    let Cli {
        config: config_path,
        database,
        command,
    } = cli;

    let creating = matches!(command, Command::Config(ConfigCommand::Init { .. }));
    let mut config = match config_path.as_deref() {
        // `config init --config new.toml` names a file that does not exist yet.
        Some(path) if creating && !path.exists() => {
            let mut config = AppConfig::default();
            config.apply_env(|name| std::env::var(name).ok())?;
            config.validate()?;
            config
        }
        path => AppConfig::load(path)?,
    };
    if let Some(path) = database {
        config.database_path = Some(path);
    }

    init_tracing(&config.log_filter);
    debug!(?config, "Configuration loaded");

    let output = match command {
        Command::Config(sub) => config_command(sub, config_path, &config)?,
        command => {
            let state = AppState::open(config).await?;
            let result = execute(&state, command).await;
            state.db().close().await;
            result?
        }
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` wins over the configured filter. Logs go to stderr so stdout
/// stays machine-readable. Repeated calls are ignored.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Dispatches a store-backed command.
pub async fn execute(state: &AppState, command: Command) -> ApiResult<Value> {
    match command {
        Command::Dashboard { date } => json(dashboard::dashboard(state, date).await?),
        Command::Report => json(dashboard::report(state).await?),
        Command::Ledger { kind } => match kind {
            LedgerKind::Farmers => json(farmers::farmer_ledgers(state).await?),
            LedgerKind::Buyers => json(buyers::buyer_ledgers(state).await?),
            LedgerKind::Lots => json(processing::lot_ledgers(state).await?),
        },
        Command::List(args) => list(state, args).await,
        Command::Pick { list } => match list {
            PickList::Farmers => json(farmers::active_farmers(state).await?),
            PickList::Deliveries => json(deliveries::processable_deliveries(state).await?),
            PickList::Lots => json(processing::available_lots(state).await?),
            PickList::Buyers => json(buyers::active_buyers(state).await?),
        },

        Command::Farmer(FarmerCommand::Add(form)) => {
            json(farmers::register_farmer(state, &form.into()).await?)
        }
        Command::Farmer(FarmerCommand::Update { id, form }) => {
            json(farmers::edit_farmer(state, &id, &form.into()).await?)
        }
        Command::Delivery(DeliveryCommand::Add(form)) => {
            json(deliveries::record_delivery(state, &form.into()).await?)
        }
        Command::Delivery(DeliveryCommand::Update { id, form }) => {
            json(deliveries::edit_delivery(state, &id, &form.into()).await?)
        }
        Command::Process { delivery_id, form } => {
            json(processing::process_delivery(state, &delivery_id, &form.into()).await?)
        }
        Command::Lot(LotCommand::Update { id, form }) => {
            json(processing::edit_lot(state, &id, &form.into()).await?)
        }
        Command::Buyer(BuyerCommand::Add(form)) => {
            json(buyers::register_buyer(state, &form.into()).await?)
        }
        Command::Buyer(BuyerCommand::Update { id, form }) => {
            json(buyers::edit_buyer(state, &id, &form.into()).await?)
        }
        Command::Sale(SaleCommand::Add {
            buyer,
            lot,
            quantity,
            price,
            payment,
        }) => {
            let input = SaleInput {
                buyer_id: buyer,
                lot_id: lot,
                quantity,
                price_per_kg: price,
                payment_status: payment,
            };
            json(sales::record_sale(state, &input).await?)
        }
        Command::Sale(SaleCommand::Update {
            id,
            buyer,
            quantity,
            price,
            payment,
        }) => {
            let patch = SalePatch {
                buyer_id: buyer,
                quantity,
                price_per_kg: price,
                payment_status: payment,
            };
            json(sales::edit_sale(state, &id, &patch).await?)
        }
        Command::Delete { collection, id } => {
            json(commands::delete_record(state, collection, &id).await?)
        }

        Command::Config(_) => Err(ApiError::internal(
            "config commands do not use the database",
        )),
    }
}

async fn list(state: &AppState, args: ListArgs) -> ApiResult<Value> {
    let ListArgs {
        collection,
        search: query,
        status,
        grade,
    } = args;
    if grade.is_some() && collection != CollectionKey::Deliveries {
        return Err(ApiError::validation(format!(
            "grade filter only applies to deliveries, not {}",
            collection
        )));
    }
    let status = status.as_deref();

    match collection {
        CollectionKey::Farmers => {
            let filter = FarmerFilter {
                query,
                status: parse_opt(status)?,
            };
            json(farmers::list_farmers(state, &filter).await?)
        }
        CollectionKey::Deliveries => {
            let filter = DeliveryFilter {
                query,
                status: parse_opt(status)?,
                grade,
            };
            json(deliveries::list_deliveries(state, &filter).await?)
        }
        CollectionKey::ProcessedLots => {
            let filter = LotFilter {
                query,
                status: parse_opt(status)?,
            };
            json(processing::list_lots(state, &filter).await?)
        }
        CollectionKey::Buyers => {
            let filter = BuyerFilter {
                query,
                status: parse_opt(status)?,
            };
            json(buyers::list_buyers(state, &filter).await?)
        }
        CollectionKey::Sales => {
            let filter = SaleFilter {
                query,
                payment_status: parse_opt(status)?,
            };
            json(sales::list_sales(state, &filter).await?)
        }
    }
}

fn config_command(
    command: ConfigCommand,
    path: Option<PathBuf>,
    config: &AppConfig,
) -> ApiResult<Value> {
    let path = match path {
        Some(path) => path,
        None => default_config_path().ok_or(ConfigError::NoProjectDirs)?,
    };

    match command {
        ConfigCommand::Show => Ok(json!({
            "configPath": path,
            "databasePath": config.resolved_database_path()?,
            "config": config,
        })),
        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                return Err(ApiError::new(
                    ErrorCode::ConfigError,
                    format!("{} already exists; pass --force to overwrite", path.display()),
                ));
            }
            config.save(&path)?;
            info!(path = %path.display(), "Config file written");
            Ok(json!({ "configPath": path, "written": true }))
        }
    }
}

/// Parses an optional filter value, e.g. `--status pending`.
fn parse_opt<T>(text: Option<&str>) -> Result<Option<T>, ValidationError>
where
    T: FromStr<Err = ValidationError>,
{
    text.map(str::parse).transpose()
}

fn json<T: Serialize>(value: T) -> ApiResult<Value> {
    Ok(serde_json::to_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::fixtures;
    use clap::Parser;
    use teacoop_core::Money;

    async fn exec(state: &AppState, args: &[&str]) -> ApiResult<Value> {
        let argv = std::iter::once("teacoop").chain(args.iter().copied());
        let cli = Cli::try_parse_from(argv).unwrap();
        execute(state, cli.command).await
    }

    #[tokio::test]
    async fn test_delivery_to_sale_walkthrough() {
        let state = fixtures::state().await;

        let farmer = exec(&state, &["farmer", "add", "--name", "Jane Doe", "--location", "Kericho"])
            .await
            .unwrap();
        let farmer_id = farmer["record"]["id"].as_str().unwrap().to_string();

        let delivery = exec(
            &state,
            &[
                "delivery", "add", "--farmer", &farmer_id, "--weight", "100", "--grade", "A",
                "--moisture", "70", "--price", "80",
            ],
        )
        .await
        .unwrap();
        assert_eq!(delivery["record"]["farmerName"], "Jane Doe");
        let delivery_id = delivery["record"]["id"].as_str().unwrap().to_string();

        let lot = exec(&state, &["process", &delivery_id, "--output", "30"])
            .await
            .unwrap();
        assert_eq!(lot["record"]["processingLossPct"], 70);
        assert_eq!(lot["record"]["grade"], "A");
        assert_eq!(lot["record"]["status"], "available");
        let lot_id = lot["record"]["id"].as_str().unwrap().to_string();

        let sale = exec(
            &state,
            &["sale", "add", "--buyer", "B001", "--lot", &lot_id, "--quantity", "10"],
        )
        .await
        .unwrap();
        assert_eq!(sale["record"]["totalAmountCents"], 450_000);
        assert_eq!(sale["record"]["farmerId"].as_str(), Some(farmer_id.as_str()));

        let lots = exec(&state, &["list", "lots", "--search", &lot_id]).await.unwrap();
        assert_eq!(lots["records"][0]["status"], "sold");

        let processed = exec(&state, &["list", "deliveries", "--status", "processed"])
            .await
            .unwrap();
        assert!(processed["records"]
            .as_array()
            .unwrap()
            .iter()
            .any(|d| d["id"] == delivery_id.as_str()));
    }

    #[tokio::test]
    async fn test_missing_delivery_is_not_found() {
        let state = fixtures::state().await;
        let err = exec(&state, &["process", "IB999", "--output", "10"])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "batch not found: IB999");
    }

    #[tokio::test]
    async fn test_farmer_edit_keeps_unset_fields() {
        let state = fixtures::state().await;
        let edited = exec(&state, &["farmer", "update", "F005", "--name", "David K. Kiprop"])
            .await
            .unwrap();
        let farmer = &edited["record"];
        assert_eq!(farmer["name"], "David K. Kiprop");
        assert_eq!(farmer["status"], "inactive");
        assert_eq!(farmer["outputPreference"], "self-collect");
        assert_eq!(farmer["location"], "Bomet");
        assert_eq!(farmer["phone"], "+254 756 789 012");

        let active = exec(&state, &["pick", "farmers"]).await.unwrap();
        assert!(!active
            .as_array()
            .unwrap()
            .iter()
            .any(|f| f["id"] == "F005"));
    }

    #[tokio::test]
    async fn test_lot_edit_keeps_status_and_quality() {
        let state = fixtures::state().await;
        let edited = exec(&state, &["lot", "update", "PB002", "--output", "50"])
            .await
            .unwrap();
        let lot = &edited["record"];
        assert_eq!(lot["outputWeightGrams"], 50_000);
        assert_eq!(lot["processingLossPct"], 75);
        assert_eq!(lot["status"], "sold");
        assert_eq!(lot["qualityScore"], 94);
        assert_eq!(lot["packagingType"], "25kg bags");
        assert_eq!(lot["grade"], "A");
    }

    #[tokio::test]
    async fn test_processed_delivery_edit_stays_processed() {
        let state = fixtures::state().await;
        let edited = exec(&state, &["delivery", "update", "IB001", "--moisture", "73"])
            .await
            .unwrap();
        let delivery = &edited["record"];
        assert_eq!(delivery["moisturePct"], 73);
        assert_eq!(delivery["status"], "processed");
        assert_eq!(delivery["farmerId"], "F001");
        assert_eq!(delivery["rawWeightGrams"], 250_000);
        assert_eq!(delivery["pricePerKgCents"], 8_500);

        let err = exec(&state, &["process", "IB001", "--output", "10"])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
    }

    #[tokio::test]
    async fn test_buyer_and_sale_edits_keep_unset_fields() {
        let state = fixtures::state().await;
        let edited = exec(
            &state,
            &["buyer", "update", "B001", "--email", "orders@ktexporters.co.ke"],
        )
        .await
        .unwrap();
        let buyer = &edited["record"];
        assert_eq!(buyer["email"], "orders@ktexporters.co.ke");
        assert_eq!(buyer["companyName"], "Kenya Tea Exporters Ltd");
        assert_eq!(buyer["contactPerson"], "John Kamau");
        assert_eq!(buyer["address"], "Mombasa Road, Nairobi");
        assert_eq!(buyer["status"], "active");

        let edited = exec(&state, &["sale", "update", "S002", "--payment", "paid"])
            .await
            .unwrap();
        let sale = &edited["record"];
        assert_eq!(sale["paymentStatus"], "paid");
        assert_eq!(sale["buyerId"], "B002");
        assert_eq!(sale["quantityGrams"], 30_000);
        assert_eq!(sale["pricePerKgCents"], 44_000);
        assert_eq!(sale["totalAmountCents"], 1_320_000);
    }

    #[tokio::test]
    async fn test_edit_of_missing_record_is_not_found() {
        let state = fixtures::state().await;
        let err = exec(&state, &["buyer", "update", "B404", "--phone", "1"])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "buyer not found: B404");
    }

    #[tokio::test]
    async fn test_list_filters() {
        let state = fixtures::state().await;

        let grade_c = exec(&state, &["list", "deliveries", "--grade", "C"]).await.unwrap();
        assert_eq!(grade_c["records"].as_array().map(Vec::len), Some(1));
        assert_eq!(grade_c["records"][0]["id"], "IB004");

        let err = exec(&state, &["list", "farmers", "--grade", "A"]).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = exec(&state, &["list", "sales", "--status", "overdue"]).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let pending = exec(&state, &["list", "sales", "--status", "pending"]).await.unwrap();
        assert_eq!(pending["records"][0]["id"], "S002");
    }

    #[tokio::test]
    async fn test_pick_lists_and_ledgers() {
        let state = fixtures::state().await;

        let deliveries = exec(&state, &["pick", "deliveries"]).await.unwrap();
        let ids: Vec<&str> = deliveries
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|d| d["id"].as_str())
            .collect();
        assert_eq!(ids, vec!["IB002", "IB003", "IB004"]);

        let lots = exec(&state, &["ledger", "lots"]).await.unwrap();
        let pb001 = lots
            .as_array()
            .unwrap()
            .iter()
            .find(|l| l["lotId"] == "PB001")
            .cloned()
            .unwrap();
        assert_eq!(pb001["oversold"], false);
    }

    #[tokio::test]
    async fn test_delete_then_dashboard() {
        let state = fixtures::state().await;
        let deleted = exec(&state, &["delete", "sales", "S002"]).await.unwrap();
        assert_eq!(deleted["deleted"], true);

        let dashboard = exec(&state, &["dashboard", "--date", "2024-01-31"]).await.unwrap();
        assert_eq!(dashboard["outstandingPayments"], json!(Money::zero()));
    }

    #[tokio::test]
    async fn test_run_against_file_database() {
        let dir = std::env::temp_dir().join(format!("teacoop-run-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let config_path = dir.join("config.toml");
        let config = AppConfig {
            database_path: Some(dir.join("ledger.db")),
            ..AppConfig::default()
        };
        config.save(&config_path).unwrap();
        let config_arg = config_path.to_string_lossy().to_string();

        let cli = Cli::try_parse_from(["teacoop", "--config", &config_arg, "report"]).unwrap();
        let report: Value = serde_json::from_str(&run(cli).await.unwrap()).unwrap();
        assert_eq!(report["currencyCode"], "KES");
        assert!(dir.join("ledger.db").exists());

        let cli = Cli::try_parse_from(["teacoop", "--config", &config_arg, "config", "init"]).unwrap();
        let err = run(cli).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigError);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_config_init_writes_new_file() {
        let dir = std::env::temp_dir().join(format!("teacoop-init-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let config_path = dir.join("nested").join("config.toml");
        let config_arg = config_path.to_string_lossy().to_string();

        let cli = Cli::try_parse_from(["teacoop", "--config", &config_arg, "config", "init"]).unwrap();
        let output: Value = serde_json::from_str(&run(cli).await.unwrap()).unwrap();
        assert_eq!(output["written"], true);

        let written = AppConfig::read(&config_path).unwrap();
        assert_eq!(written.currency_code, "KES");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
