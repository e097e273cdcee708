//! # teacoop-core: Pure Business Logic for the TeaCoop Ledger
//!
//! Record types, the lifecycle rules that move tea from a farmer's delivery to
//! a buyer's sale, and the figures computed from the records. Nothing in this
//! crate touches a disk or a network. The engine reads time and randomness
//! only through [`MutationContext`] and its [`IdGenerator`];
//! [`TimestampIdGenerator`] is the one place that reads the system clock.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        TeaCoop Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    teacoop-cli (commands)                       │   │
//! │  │   record_delivery, process_delivery, record_sale, dashboard …   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ teacoop-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │  types   │ │  engine  │ │  stats   │ │  search  │          │   │
//! │  │   │ Farmer   │ │ create   │ │dashboard │ │ filters  │          │   │
//! │  │   │ Delivery │ │ update   │ │ reports  │ │ pick     │          │   │
//! │  │   │ Lot/Sale │ │ cascades │ │ ledgers  │ │ lists    │          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO LOGGING • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 teacoop-db (collection store)                   │   │
//! │  │          SQLite, one JSON payload per collection key            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Farmer, Delivery, ProcessedLot, Buyer, Sale and their statuses
//! - [`money`] / [`weight`] - integer cents and grams
//! - [`collections`] - the five stored sequences and the `Record` trait
//! - [`engine`] - create / update / delete with lifecycle cascades
//! - [`stats`] - dashboard, view summaries, reports, derived ledgers
//! - [`search`] - view filters and form pick lists
//! - [`ids`] - record id generation
//! - [`seed`] - the default dataset
//! - [`validation`] - field rules
//! - [`error`] - domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use teacoop_core::engine::{record_delivery, DeliveryInput, EngineConfig, MutationContext};
//! use teacoop_core::ids::SequenceIdGenerator;
//! use teacoop_core::{seed, DeliveryStatus, Money, TeaGrade, Weight};
//!
//! let ids = SequenceIdGenerator::starting_at(6);
//! let config = EngineConfig::default();
//! let today = chrono::NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
//! let ctx = MutationContext::new(today, &ids, &config);
//!
//! let input = DeliveryInput {
//!     farmer_id: "F002".to_string(),
//!     raw_weight: Weight::from_kg(100),
//!     grade: TeaGrade::B,
//!     moisture_pct: 70,
//!     price_per_kg: Money::from_major(80),
//!     status: DeliveryStatus::Pending,
//!     notes: None,
//! };
//!
//! let transition = record_delivery(&seed::collections(), &input, &ctx).unwrap();
//! let delivery = &transition.collections.deliveries[0];
//! assert_eq!(delivery.id, "IB006");
//! assert_eq!(delivery.total_amount(), Money::from_major(8_000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod collections;
pub mod engine;
pub mod error;
pub mod ids;
pub mod money;
pub mod search;
pub mod seed;
pub mod stats;
pub mod types;
pub mod validation;
pub mod weight;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use collections::{CollectionKey, Collections, Record};
pub use engine::{Cascade, EngineConfig, LotSalePolicy, MutationContext, Transition};
pub use error::{CoreError, CoreResult, ValidationError};
pub use ids::{IdGenerator, SequenceIdGenerator, TimestampIdGenerator};
pub use money::Money;
pub use stats::ValuationConfig;
pub use types::*;
pub use weight::Weight;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of names, phone numbers, locations and addresses.
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum length of delivery notes.
pub const MAX_NOTES_LENGTH: usize = 1000;

/// Maximum length of a search query.
pub const MAX_SEARCH_LENGTH: usize = 100;
