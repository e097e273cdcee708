//! # teacoop-db: Collection Store for the TeaCoop Ledger
//!
//! Persists the five record collections in SQLite, one JSON payload per
//! collection key, and commits multi-collection changes atomically.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        TeaCoop Data Flow                                │
//! │                                                                         │
//! │  teacoop command (delivery add)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    teacoop-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (collection.rs)│    │  (embedded)  │  │   │
//! │  │   │               │    │                │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ Collection-    │    │ 001_         │  │   │
//! │  │   │ load_all      │    │ Repository<T>  │    │ collections  │  │   │
//! │  │   │ commit        │    │ + SeedData     │    │ .sql         │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  SQLite: collections(key, payload, version, updated_at)         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool, `load_all` and `commit`
//! - [`repository`] - Per-collection load / save
//! - [`seed`] - Default records for first use
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use teacoop_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/teacoop.db")).await?;
//! let collections = db.load_all().await?;
//! let transition = teacoop_core::engine::delete_sale(&collections, "S002");
//! db.commit(&transition).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod seed;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::CollectionRepository;
pub use seed::SeedData;
