//! # Database Pool Management
//!
//! Connection pool creation, collection access and transactional commits.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Collection Store                                   │
//! │                                                                         │
//! │  teacoop startup                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::new(path) ← Configure pool settings                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← Create pool + run migrations            │
//! │       │                                                                 │
//! │       ├── load_all()        five collections, seeded on first use      │
//! │       │                                                                 │
//! │       │   engine (teacoop-core) → Transition { collections, changed }  │
//! │       │                                                                 │
//! │       └── commit(&transition)                                          │
//! │             BEGIN                                                       │
//! │               upsert changed key 1   (version + 1)                     │
//! │               upsert changed key 2   (version + 1)                     │
//! │             COMMIT  ← all changed collections, or none                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! File databases use WAL so readers never block the single writer.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::collection::{write_payload, CollectionRepository};
use crate::seed::SeedData;
use teacoop_core::{Buyer, CollectionKey, Collections, Delivery, Farmer, ProcessedLot, Sale, Transition};

const IN_MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/teacoop.db")
///     .max_connections(5)
///     .min_connections(1);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file, or `:memory:`.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a configuration for a database file, created if missing.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// Each `Database` built from it is isolated. The pool holds exactly one
    /// connection that is never recycled, since closing it drops the data.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY_PATH),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY_PATH
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        if self.is_in_memory() {
            return SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()));
        }

        let connect_url = format!("sqlite://{}?mode=rwc", self.database_path.display());
        let options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .create_if_missing(true);
        Ok(options)
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing collection access.
///
/// ## Usage
/// ```rust,ignore
/// let db = Database::new(DbConfig::new("./teacoop.db")).await?;
/// let collections = db.load_all().await?;
/// let transition = record_delivery(&collections, &input, &ctx)?;
/// db.commit(&transition).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    /// The SQLite connection pool.
    pool: SqlitePool,
}

impl Database {
    /// Creates the pool and runs migrations (if enabled).
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        let connect_options = config.connect_options()?;
        debug!("Connection options configured");

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout);
        pool_options = if config.is_in_memory() {
            pool_options.idle_timeout(None).max_lifetime(None)
        } else {
            pool_options.idle_timeout(Some(config.idle_timeout))
        };

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Applies pending migrations. Idempotent.
    pub async fn run_migrations(&self) -> DbResult<()> {
        info!("Running database migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    /// Returns `(total, applied)` migration counts.
    pub async fn migration_status(&self) -> DbResult<(usize, usize)> {
        migrations::migration_status(&self.pool).await
    }

    /// Returns a reference to the connection pool.
    ///
    /// Prefer the collection repositories when they cover the query.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the repository for any record type.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let lots = db.collection::<ProcessedLot>().load().await?;
    /// ```
    pub fn collection<T: SeedData>(&self) -> CollectionRepository<T> {
        CollectionRepository::new(self.pool.clone())
    }

    pub fn farmers(&self) -> CollectionRepository<Farmer> {
        self.collection()
    }

    pub fn deliveries(&self) -> CollectionRepository<Delivery> {
        self.collection()
    }

    pub fn lots(&self) -> CollectionRepository<ProcessedLot> {
        self.collection()
    }

    pub fn buyers(&self) -> CollectionRepository<Buyer> {
        self.collection()
    }

    pub fn sales(&self) -> CollectionRepository<Sale> {
        self.collection()
    }

    /// Loads all five collections, seeding any that are absent.
    pub async fn load_all(&self) -> DbResult<Collections> {
        Ok(Collections {
            farmers: self.farmers().load().await?,
            deliveries: self.deliveries().load().await?,
            lots: self.lots().load().await?,
            buyers: self.buyers().load().await?,
            sales: self.sales().load().await?,
        })
    }

    /// Writes every collection the transition changed, in one transaction.
    ///
    /// Returns the new version of each written key. A no-op transition
    /// writes nothing and returns an empty map.
    pub async fn commit(&self, transition: &Transition) -> DbResult<BTreeMap<CollectionKey, i64>> {
        let mut versions = BTreeMap::new();
        if transition.is_noop() {
            debug!(record_id = %transition.record_id, "Nothing to commit");
            return Ok(versions);
        }

        // Encode everything up front so a serialization failure never opens a transaction.
        let mut payloads = Vec::with_capacity(transition.changed.len());
        for key in &transition.changed {
            let payload = transition
                .collections
                .payload(*key)
                .map_err(|e| DbError::serialization(key.storage_key(), e))?;
            payloads.push((*key, payload));
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        for (key, payload) in &payloads {
            let version = write_payload(&mut *tx, key.storage_key(), payload).await?;
            versions.insert(*key, version);
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            record_id = %transition.record_id,
            changed = ?transition.changed,
            cascades = transition.cascades.len(),
            "Committed transition"
        );
        Ok(versions)
    }

    /// Closes the pool. Later operations fail with `ConnectionFailed`.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// True when the database answers a trivial query.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use teacoop_core::engine::{
        delete_sale, process_delivery, record_delivery, update_buyer, BuyerInput, DeliveryInput,
        LotInput,
    };
    use teacoop_core::{
        seed, DeliveryStatus, EngineConfig, MutationContext, SequenceIdGenerator, TeaGrade, Weight,
        Money,
    };

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
    }

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = db().await;
        assert!(db.health_check().await);
        assert_eq!(db.migration_status().await.unwrap(), (1, 1));
    }

    #[tokio::test]
    async fn test_config_builder() {
        let config = DbConfig::new("/tmp/teacoop-test.db")
            .max_connections(10)
            .min_connections(2)
            .run_migrations(false);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert!(!config.run_migrations);
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }

    #[tokio::test]
    async fn test_load_all_seeds_every_collection() {
        let db = db().await;
        assert_eq!(db.load_all().await.unwrap(), seed::collections());
        for key in CollectionKey::ALL {
            let version: i64 =
                sqlx::query_scalar("SELECT version FROM collections WHERE key = ?1")
                    .bind(key.storage_key())
                    .fetch_one(db.pool())
                    .await
                    .unwrap();
            assert_eq!(version, 1, "{key}");
        }
    }

    #[tokio::test]
    async fn test_commit_writes_only_changed_keys() {
        let db = db().await;
        let collections = db.load_all().await.unwrap();
        let ids = SequenceIdGenerator::starting_at(6);
        let config = EngineConfig::default();
        let ctx = MutationContext::new(today(), &ids, &config);

        let input = DeliveryInput {
            farmer_id: "F002".to_string(),
            raw_weight: Weight::from_kg(100),
            grade: TeaGrade::B,
            moisture_pct: 70,
            price_per_kg: Money::from_major(80),
            status: DeliveryStatus::Pending,
            notes: None,
        };
        let transition = record_delivery(&collections, &input, &ctx).unwrap();
        let versions = db.commit(&transition).await.unwrap();

        assert_eq!(versions, BTreeMap::from([(CollectionKey::Deliveries, 2)]));
        assert_eq!(db.farmers().version().await.unwrap(), Some(1));

        let reloaded = db.load_all().await.unwrap();
        assert_eq!(reloaded, transition.collections);
        assert_eq!(reloaded.deliveries[0].id, "IB006");
    }

    #[tokio::test]
    async fn test_commit_cascade_is_atomic() {
        let db = db().await;
        let collections = db.load_all().await.unwrap();
        let ids = SequenceIdGenerator::starting_at(3);
        let config = EngineConfig::default();
        let ctx = MutationContext::new(today(), &ids, &config);

        let transition =
            process_delivery(&collections, "IB003", &LotInput::new(Weight::from_kg(80), TeaGrade::A), &ctx)
                .unwrap();
        let versions = db.commit(&transition).await.unwrap();

        assert_eq!(versions.get(&CollectionKey::ProcessedLots), Some(&2));
        assert_eq!(versions.get(&CollectionKey::Deliveries), Some(&2));

        let reloaded = db.load_all().await.unwrap();
        assert_eq!(reloaded.lots[0].id, "PB003");
        assert_eq!(
            reloaded.delivery("IB003").map(|d| d.status),
            Some(DeliveryStatus::Processed)
        );
    }

    #[tokio::test]
    async fn test_noop_commit_writes_nothing() {
        let db = db().await;
        let collections = db.load_all().await.unwrap();

        let missing = delete_sale(&collections, "S999");
        assert!(db.commit(&missing).await.unwrap().is_empty());

        let buyer = collections.buyer("B001").unwrap().clone();
        let same = update_buyer(
            &collections,
            "B001",
            &BuyerInput {
                company_name: buyer.company_name,
                contact_person: buyer.contact_person,
                email: buyer.email,
                phone: buyer.phone,
                address: buyer.address,
                status: buyer.status,
            },
        )
        .unwrap();
        assert!(db.commit(&same).await.unwrap().is_empty());
        assert_eq!(db.sales().version().await.unwrap(), Some(1));
        assert_eq!(db.buyers().version().await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_file_database_persists_across_reopen() {
        let path = std::env::temp_dir().join(format!("teacoop-reopen-{}.db", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        let mut farmers = db.farmers().load().await.unwrap();
        farmers.truncate(2);
        db.farmers().save(&farmers).await.unwrap();
        db.close().await;

        let reopened = Database::new(DbConfig::new(&path)).await.unwrap();
        assert_eq!(reopened.farmers().load().await.unwrap(), farmers);
        assert_eq!(reopened.farmers().version().await.unwrap(), Some(2));
        reopened.close().await;

        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }

    #[tokio::test]
    async fn test_closed_pool_reports_connection_failure() {
        let db = db().await;
        db.close().await;
        assert!(!db.health_check().await);
        assert!(matches!(
            db.farmers().load().await.unwrap_err(),
            DbError::ConnectionFailed(_)
        ));
    }
}
