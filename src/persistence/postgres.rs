//! PostgreSQL implementation of the persistence layer.
//!
//! The durable copy of the store is a plain `kv_store` table keyed by the
//! raw store key. A block's change set and its `commits` row are written in
//! one database transaction, so a crash never leaves half a block behind.

use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::models::CommitRecord;
use crate::config::GatewayConfig;
use crate::store::{ChangeSet, MemStore, StoreError};

fn backend(e: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// PostgreSQL-backed persistence layer using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    /// Creates a new persistence layer with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool sized from the gateway configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the database is unreachable.
    pub async fn connect(config: &GatewayConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .map_err(backend)?;
        Ok(Self::new(pool))
    }

    /// Applies the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(backend)
    }

    /// Loads the full key-value table into memory.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] on database failure.
    pub async fn load_store(&self) -> Result<MemStore, StoreError> {
        let rows = sqlx::query_as::<_, (Vec<u8>, Vec<u8>)>(
            "SELECT key, value FROM kv_store ORDER BY key",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        Ok(rows.into_iter().collect())
    }

    /// Returns the most recent commit, if any block was ever committed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] on database failure or if a stored
    /// height or write count is negative.
    pub async fn latest_commit(&self) -> Result<Option<CommitRecord>, StoreError> {
        let row = sqlx::query_as::<_, (i64, DateTime<Utc>, i32)>(
            "SELECT height, committed_at, write_count FROM commits ORDER BY height DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.map(|(height, committed_at, write_count)| {
            Ok(CommitRecord {
                height: u64::try_from(height).map_err(backend)?,
                committed_at,
                write_count: u32::try_from(write_count).map_err(backend)?,
            })
        })
        .transpose()
    }

    /// Writes a block's change set and commit row atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] on database failure; nothing is
    /// written in that case.
    pub async fn commit(&self, height: u64, changes: &ChangeSet) -> Result<(), StoreError> {
        let height = i64::try_from(height).map_err(backend)?;
        let write_count = i32::try_from(changes.len()).map_err(backend)?;

        let mut tx = self.pool.begin().await.map_err(backend)?;
        for (key, value) in changes.iter() {
            sqlx::query(
                "INSERT INTO kv_store (key, value) VALUES ($1, $2) \
                 ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value",
            )
            .bind(key)
            .bind(value)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;
        }
        sqlx::query("INSERT INTO commits (height, write_count) VALUES ($1, $2)")
            .bind(height)
            .bind(write_count)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;
        tx.commit().await.map_err(backend)?;

        tracing::debug!(height, write_count, "change set persisted");
        Ok(())
    }
}
