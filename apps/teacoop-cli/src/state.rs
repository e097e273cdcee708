//! # Application State
//!
//! Everything a command needs, built once at startup.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         AppState                                        │
//! │                                                                         │
//! │  ┌──────────────┐ ┌──────────────┐ ┌──────────────┐ ┌──────────────┐   │
//! │  │  Database    │ │  AppConfig   │ │ IdGenerator  │ │ write_lock   │   │
//! │  │  (SQLite     │ │  (read-only) │ │ (timestamp + │ │ Mutex<()>    │   │
//! │  │   pool)      │ │              │ │  random)     │ │              │   │
//! │  └──────────────┘ └──────────────┘ └──────────────┘ └──────────────┘   │
//! │                                                                         │
//! │  Reads go straight to the pool.                                        │
//! │  Mutations hold write_lock across load → engine → commit.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tokio::sync::Mutex;
use tracing::{debug, info};

use teacoop_core::{
    Collections, CoreResult, EngineConfig, IdGenerator, MutationContext, TimestampIdGenerator,
    Transition, ValuationConfig,
};
use teacoop_db::{Database, DbConfig};

use crate::config::AppConfig;
use crate::error::ApiResult;

/// Shared state for all commands.
pub struct AppState {
    db: Database,
    config: AppConfig,
    engine: EngineConfig,
    valuation: ValuationConfig,
    ids: Arc<dyn IdGenerator + Send + Sync>,
    /// Fixed "today" for reproducible runs; `None` means the local date.
    today: Option<NaiveDate>,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("db", &self.db)
            .field("config", &self.config)
            .field("today", &self.today)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Self {
        AppState {
            db,
            engine: config.engine(),
            valuation: config.valuation(),
            config,
            ids: Arc::new(TimestampIdGenerator),
            today: None,
            write_lock: Mutex::new(()),
        }
    }

    /// Opens the configured database file (running migrations) and builds the state.
    pub async fn open(config: AppConfig) -> ApiResult<Self> {
        let path = config.resolved_database_path()?;
        info!(path = %path.display(), "Opening collection store");
        let db = Database::new(DbConfig::new(path)).await?;
        Ok(AppState::new(db, config))
    }

    /// Replaces the id generator (tests use a sequence).
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator + Send + Sync>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn engine(&self) -> &EngineConfig {
        &self.engine
    }

    pub fn valuation(&self) -> &ValuationConfig {
        &self.valuation
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Current snapshot of every collection.
    pub async fn snapshot(&self) -> ApiResult<Collections> {
        Ok(self.db.load_all().await?)
    }

    /// Runs one engine operation as a load → transform → commit step.
    ///
    /// The write lock is held for the whole step, so two mutations never
    /// interleave. A failed operation or commit leaves the store untouched.
    pub async fn mutate<F>(&self, op: F) -> ApiResult<Transition>
    where
        F: FnOnce(&Collections, &MutationContext<'_>) -> CoreResult<Transition>,
    {
        let _guard = self.write_lock.lock().await;

        let collections = self.db.load_all().await?;
        let transition = {
            let ctx = MutationContext::new(self.today(), &*self.ids, &self.engine);
            op(&collections, &ctx)?
        };

        let versions = self.db.commit(&transition).await?;
        debug!(
            record_id = %transition.record_id,
            versions = ?versions,
            "Mutation applied"
        );
        Ok(transition)
    }
}
