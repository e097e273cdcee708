//! # Collection Repository
//!
//! Whole-collection load and save for one record type.
//!
//! A collection is read and written as a unit: the payload column holds the
//! complete JSON array, in display order. Records are never patched in place.

use std::fmt;
use std::marker::PhantomData;

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::seed::SeedData;
use teacoop_core::Record;

/// Repository for one stored collection.
#[derive(Clone)]
pub struct CollectionRepository<T> {
    pool: SqlitePool,
    _records: PhantomData<fn() -> T>,
}

impl<T: Record> fmt::Debug for CollectionRepository<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionRepository")
            .field("key", &T::KEY.storage_key())
            .finish()
    }
}

impl<T: SeedData> CollectionRepository<T> {
    /// Creates a new CollectionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CollectionRepository {
            pool,
            _records: PhantomData,
        }
    }

    /// Loads the collection, seeding it on first use.
    ///
    /// An absent key gets the default records, which are written back before
    /// they are returned. A present key is returned as stored, even when empty.
    pub async fn load(&self) -> DbResult<Vec<T>> {
        let key = T::KEY.storage_key();
        match read_payload(&self.pool, key).await? {
            Some(payload) => decode(key, &payload),
            None => self.seed().await,
        }
    }

    async fn seed(&self) -> DbResult<Vec<T>> {
        let key = T::KEY.storage_key();
        let records = T::seed();
        let payload = encode(key, &records)?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO collections (key, payload, version, updated_at)
            VALUES (?1, ?2, 1, ?3)
            ON CONFLICT(key) DO NOTHING
            "#,
        )
        .bind(key)
        .bind(&payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .rows_affected();

        if inserted == 0 {
            // Another writer created the key between our read and insert.
            let stored = read_payload(&self.pool, key)
                .await?
                .ok_or_else(|| DbError::Internal(format!("collection '{key}' vanished while seeding")))?;
            return decode(key, &stored);
        }

        info!(key, records = records.len(), "Seeded collection with default records");
        Ok(records)
    }

    /// Replaces the stored collection. Returns the new version.
    pub async fn save(&self, records: &[T]) -> DbResult<i64> {
        let key = T::KEY.storage_key();
        let payload = encode(key, records)?;
        let version = write_payload(&self.pool, key, &payload).await?;

        debug!(key, records = records.len(), version, "Saved collection");
        Ok(version)
    }

    /// Finds one record by id.
    pub async fn get(&self, id: &str) -> DbResult<Option<T>> {
        Ok(self.load().await?.into_iter().find(|r| r.id() == id))
    }

    pub async fn count(&self) -> DbResult<usize> {
        Ok(self.load().await?.len())
    }

    /// Current version, or `None` while the key has never been written.
    pub async fn version(&self) -> DbResult<Option<i64>> {
        let version: Option<i64> =
            sqlx::query_scalar("SELECT version FROM collections WHERE key = ?1")
                .bind(T::KEY.storage_key())
                .fetch_optional(&self.pool)
                .await?;
        Ok(version)
    }
}

// =============================================================================
// Shared Row Access
// =============================================================================

pub(crate) fn encode<T: Record>(key: &str, records: &[T]) -> DbResult<String> {
    serde_json::to_string(records).map_err(|e| DbError::serialization(key, e))
}

pub(crate) fn decode<T: Record>(key: &str, payload: &str) -> DbResult<Vec<T>> {
    serde_json::from_str(payload).map_err(|e| DbError::serialization(key, e))
}

pub(crate) async fn read_payload<'e, E>(executor: E, key: &str) -> DbResult<Option<String>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let payload: Option<String> =
        sqlx::query_scalar("SELECT payload FROM collections WHERE key = ?1")
            .bind(key)
            .fetch_optional(executor)
            .await?;
    Ok(payload)
}

/// Upserts one collection row and returns its new version.
pub(crate) async fn write_payload<'e, E>(executor: E, key: &str, payload: &str) -> DbResult<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let version: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO collections (key, payload, version, updated_at)
        VALUES (?1, ?2, 1, ?3)
        ON CONFLICT(key) DO UPDATE SET
            payload = excluded.payload,
            version = collections.version + 1,
            updated_at = excluded.updated_at
        RETURNING version
        "#,
    )
    .bind(key)
    .bind(payload)
    .bind(Utc::now())
    .fetch_one(executor)
    .await?;
    Ok(version)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use teacoop_core::{seed, Farmer, Sale};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_first_load_seeds_and_writes_back() {
        let db = db().await;
        let farmers = db.farmers();

        assert_eq!(farmers.version().await.unwrap(), None);
        assert_eq!(farmers.load().await.unwrap(), seed::farmers());
        assert_eq!(farmers.version().await.unwrap(), Some(1));

        // Second load reads the stored row, no reseed.
        farmers.load().await.unwrap();
        assert_eq!(farmers.version().await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let db = db().await;
        let sales = db.sales();

        let mut records = seed::sales();
        records.remove(0);
        records[0].payment_status = teacoop_core::PaymentStatus::Paid;

        sales.save(&records).await.unwrap();
        assert_eq!(sales.load().await.unwrap(), records);
    }

    #[tokio::test]
    async fn test_save_increments_version() {
        let db = db().await;
        let buyers = db.buyers();

        assert_eq!(buyers.save(&seed::buyers()).await.unwrap(), 1);
        assert_eq!(buyers.save(&seed::buyers()).await.unwrap(), 2);
        assert_eq!(buyers.version().await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_empty_collection_is_not_reseeded() {
        let db = db().await;
        let lots = db.lots();

        lots.save(&[]).await.unwrap();
        assert!(lots.load().await.unwrap().is_empty());
        assert_eq!(lots.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let db = db().await;
        let farmer: Option<Farmer> = db.farmers().get("F003").await.unwrap();
        assert_eq!(farmer.map(|f| f.name), Some("Peter Omondi".to_string()));
        assert!(db.farmers().get("F999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_payload_is_a_serialization_error() {
        let db = db().await;
        sqlx::query(
            "INSERT INTO collections (key, payload, version, updated_at) VALUES ('sales', '[{\"id\":1}]', 1, '2024-01-01T00:00:00Z')",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let err = db.collection::<Sale>().load().await.unwrap_err();
        assert!(matches!(err, DbError::Serialization { ref key, .. } if key == "sales"));
    }

    #[tokio::test]
    async fn test_invalid_json_rejected_by_schema() {
        let db = db().await;
        let result = sqlx::query(
            "INSERT INTO collections (key, payload, version, updated_at) VALUES ('farmers', 'not json', 1, '2024-01-01T00:00:00Z')",
        )
        .execute(db.pool())
        .await;
        assert!(matches!(result.map_err(DbError::from), Err(DbError::QueryFailed(_))));
    }
}
