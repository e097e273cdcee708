//! Command-line surface of the `teacoop` binary.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use teacoop_core::engine::{self, BuyerInput, DeliveryInput, FarmerInput};
use teacoop_core::{
    CollectionKey, DeliveryStatus, LotStatus, Money, OutputPreference, PartyStatus, PaymentStatus,
    TeaGrade, Weight,
};

use crate::commands::buyers::BuyerPatch;
use crate::commands::deliveries::DeliveryPatch;
use crate::commands::farmers::FarmerPatch;
use crate::commands::processing::{LotPatch, ProcessRequest};

#[derive(Debug, Parser)]
#[command(name = "teacoop", version)]
#[command(about = "Tea cooperative ledger: farmers, deliveries, processing, buyers and sales")]
pub struct Cli {
    /// Config file (default: config.toml in the platform config directory)
    #[arg(long, global = true, env = "TEACOOP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database file; overrides the config file and TEACOOP_DB_PATH
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Headline figures
    Dashboard {
        /// Day whose month counts as "this month" (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Distributions, rankings, financials and monthly volumes
    Report,

    /// Totals summed from the records that exist now
    Ledger {
        #[arg(value_enum)]
        kind: LedgerKind,
    },

    /// List a collection with optional filters
    List(ListArgs),

    /// Records a form offers for selection
    Pick {
        #[arg(value_enum)]
        list: PickList,
    },

    /// Register or edit farmers
    #[command(subcommand)]
    Farmer(FarmerCommand),

    /// Record or edit deliveries
    #[command(subcommand)]
    Delivery(DeliveryCommand),

    /// Process a pending delivery into a lot
    Process {
        delivery_id: String,

        #[command(flatten)]
        form: ProcessArgs,
    },

    /// Edit processed lots
    #[command(subcommand)]
    Lot(LotCommand),

    /// Register or edit buyers
    #[command(subcommand)]
    Buyer(BuyerCommand),

    /// Record or edit sales
    #[command(subcommand)]
    Sale(SaleCommand),

    /// Delete a record; unknown ids are ignored
    Delete {
        /// farmers, deliveries, lots, buyers or sales
        collection: CollectionKey,
        id: String,
    },

    /// Show or create the config file
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LedgerKind {
    Farmers,
    Buyers,
    Lots,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PickList {
    /// Active farmers (delivery form)
    Farmers,
    /// Pending or processing deliveries (processing form)
    Deliveries,
    /// Available lots (sales form)
    Lots,
    /// Active buyers (sales form)
    Buyers,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// farmers, deliveries, lots, buyers or sales
    pub collection: CollectionKey,

    /// Case-insensitive text search
    #[arg(long, default_value = "")]
    pub search: String,

    /// Status filter; payment status for sales
    #[arg(long)]
    pub status: Option<String>,

    /// Grade filter (deliveries only)
    #[arg(long)]
    pub grade: Option<TeaGrade>,
}

// =============================================================================
// Forms
// =============================================================================

#[derive(Debug, Subcommand)]
pub enum FarmerCommand {
    Add(FarmerArgs),
    /// Edit a farmer; omitted flags keep the stored value
    Update {
        id: String,
        #[command(flatten)]
        form: FarmerEditArgs,
    },
}

#[derive(Debug, Args)]
pub struct FarmerArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long, default_value = "")]
    pub phone: String,
    #[arg(long, default_value = "")]
    pub location: String,
    #[arg(long, default_value = "active")]
    pub status: PartyStatus,
    /// self-collect or coop-sell
    #[arg(long, default_value = "coop-sell")]
    pub preference: OutputPreference,
}

impl From<FarmerArgs> for FarmerInput {
    fn from(args: FarmerArgs) -> Self {
        FarmerInput {
            name: args.name,
            phone: args.phone,
            location: args.location,
            status: args.status,
            output_preference: args.preference,
        }
    }
}

#[derive(Debug, Args)]
pub struct FarmerEditArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub status: Option<PartyStatus>,
    #[arg(long)]
    pub preference: Option<OutputPreference>,
}

impl From<FarmerEditArgs> for FarmerPatch {
    fn from(args: FarmerEditArgs) -> Self {
        FarmerPatch {
            name: args.name,
            phone: args.phone,
            location: args.location,
            status: args.status,
            output_preference: args.preference,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum DeliveryCommand {
    Add(DeliveryArgs),
    /// Edit a delivery; omitted flags keep the stored value
    Update {
        id: String,
        #[command(flatten)]
        form: DeliveryEditArgs,
    },
}

#[derive(Debug, Args)]
pub struct DeliveryArgs {
    #[arg(long)]
    pub farmer: String,
    /// Raw leaf weight in kg
    #[arg(long)]
    pub weight: Weight,
    #[arg(long)]
    pub grade: TeaGrade,
    /// Moisture content, 0-100
    #[arg(long)]
    pub moisture: u8,
    /// Price per kg
    #[arg(long)]
    pub price: Money,
    #[arg(long, default_value = "pending")]
    pub status: DeliveryStatus,
    #[arg(long)]
    pub notes: Option<String>,
}

impl From<DeliveryArgs> for DeliveryInput {
    fn from(args: DeliveryArgs) -> Self {
        DeliveryInput {
            farmer_id: args.farmer,
            raw_weight: args.weight,
            grade: args.grade,
            moisture_pct: args.moisture,
            price_per_kg: args.price,
            status: args.status,
            notes: args.notes,
        }
    }
}

#[derive(Debug, Args)]
pub struct DeliveryEditArgs {
    #[arg(long)]
    pub farmer: Option<String>,
    /// Raw leaf weight in kg
    #[arg(long)]
    pub weight: Option<Weight>,
    #[arg(long)]
    pub grade: Option<TeaGrade>,
    /// Moisture content, 0-100
    #[arg(long)]
    pub moisture: Option<u8>,
    /// Price per kg
    #[arg(long)]
    pub price: Option<Money>,
    #[arg(long)]
    pub status: Option<DeliveryStatus>,
    #[arg(long)]
    pub notes: Option<String>,
}

impl From<DeliveryEditArgs> for DeliveryPatch {
    fn from(args: DeliveryEditArgs) -> Self {
        DeliveryPatch {
            farmer_id: args.farmer,
            raw_weight: args.weight,
            grade: args.grade,
            moisture_pct: args.moisture,
            price_per_kg: args.price,
            status: args.status,
            notes: args.notes,
        }
    }
}

#[derive(Debug, Args)]
pub struct ProcessArgs {
    /// Output weight in kg
    #[arg(long)]
    pub output: Weight,
    /// Defaults to the delivery's grade
    #[arg(long)]
    pub grade: Option<TeaGrade>,
    /// Quality score, 0-100 (default 90)
    #[arg(long)]
    pub quality: Option<u8>,
    /// Packaging (default "25kg bags")
    #[arg(long)]
    pub packaging: Option<String>,
    #[arg(long)]
    pub status: Option<LotStatus>,
}

impl From<ProcessArgs> for ProcessRequest {
    fn from(args: ProcessArgs) -> Self {
        ProcessRequest {
            output_weight: args.output,
            grade: args.grade,
            quality_score: args.quality,
            packaging_type: args.packaging,
            status: args.status,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum LotCommand {
    /// Edit a lot; omitted flags keep the stored value
    Update {
        id: String,
        #[command(flatten)]
        form: LotArgs,
    },
}

#[derive(Debug, Args)]
pub struct LotArgs {
    /// Output weight in kg
    #[arg(long)]
    pub output: Option<Weight>,
    #[arg(long)]
    pub grade: Option<TeaGrade>,
    /// Quality score, 0-100
    #[arg(long)]
    pub quality: Option<u8>,
    #[arg(long)]
    pub packaging: Option<String>,
    #[arg(long)]
    pub status: Option<LotStatus>,
}

impl From<LotArgs> for LotPatch {
    fn from(args: LotArgs) -> Self {
        LotPatch {
            output_weight: args.output,
            grade: args.grade,
            quality_score: args.quality,
            packaging_type: args.packaging,
            status: args.status,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum BuyerCommand {
    Add(BuyerArgs),
    /// Edit a buyer; omitted flags keep the stored value
    Update {
        id: String,
        #[command(flatten)]
        form: BuyerEditArgs,
    },
}

#[derive(Debug, Args)]
pub struct BuyerArgs {
    #[arg(long)]
    pub company: String,
    #[arg(long, default_value = "")]
    pub contact: String,
    #[arg(long, default_value = "")]
    pub email: String,
    #[arg(long, default_value = "")]
    pub phone: String,
    #[arg(long, default_value = "")]
    pub address: String,
    #[arg(long, default_value = "active")]
    pub status: PartyStatus,
}

impl From<BuyerArgs> for BuyerInput {
    fn from(args: BuyerArgs) -> Self {
        BuyerInput {
            company_name: args.company,
            contact_person: args.contact,
            email: args.email,
            phone: args.phone,
            address: args.address,
            status: args.status,
        }
    }
}

#[derive(Debug, Args)]
pub struct BuyerEditArgs {
    #[arg(long)]
    pub company: Option<String>,
    #[arg(long)]
    pub contact: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub status: Option<PartyStatus>,
}

impl From<BuyerEditArgs> for BuyerPatch {
    fn from(args: BuyerEditArgs) -> Self {
        BuyerPatch {
            company_name: args.company,
            contact_person: args.contact,
            email: args.email,
            phone: args.phone,
            address: args.address,
            status: args.status,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum SaleCommand {
    Add {
        #[arg(long)]
        buyer: String,
        #[arg(long)]
        lot: String,
        /// Quantity in kg
        #[arg(long)]
        quantity: Weight,
        /// Price per kg
        #[arg(long, default_value_t = engine::DEFAULT_SALE_PRICE)]
        price: Money,
        #[arg(long, default_value = "pending")]
        payment: PaymentStatus,
    },
    /// Edit a sale; its lot cannot change and omitted flags keep the stored value
    Update {
        id: String,
        #[arg(long)]
        buyer: Option<String>,
        #[arg(long)]
        quantity: Option<Weight>,
        #[arg(long)]
        price: Option<Money>,
        #[arg(long)]
        payment: Option<PaymentStatus>,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the resolved configuration
    Show,
    /// Write the resolved configuration to the config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
