//! Provides PostgreSQL database interaction functionalities using `sqlx`.
//!
//! Includes capabilities for establishing connection pools, initializing the database schema,
//! and reading and writing key/value entries.
//! Also contains integration tests for database operations (requires the `integration-tests` feature).

use crate::db::EntryStore;
use crate::error::{AppError, Result};
use crate::models::Entry;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres, Row};
use tracing::{debug, error, info};

/// Represents the database connection pool and provides methods for database operations.
///
/// Holds a `sqlx::Pool` for efficient connection management.
pub struct Database {
    pool: Pool<Postgres>,
}

impl Database {
    /// Creates a new `Database` backed by a lazily connecting pool.
    ///
    /// No connection is opened until the first query, so options such as
    /// `--help` work without a reachable database.
    ///
    /// # Arguments
    ///
    /// * `database_url` - The connection string for the PostgreSQL database.
    /// * `max_connections` - Upper bound for the pool size.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if `database_url` cannot be parsed.
    pub fn new_lazy(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_lazy(database_url)
            .map_err(|e| {
                error!("Invalid database URL: {}", e);
                AppError::Db(e.into())
            })?;
        debug!("Created lazy connection pool");
        Ok(Self { pool })
    }

    /// Wraps an existing pool.
    pub fn from_pool(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Checks if the `entries` table exists in the database schema.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query to `information_schema.tables` fails.
    pub async fn is_schema_initialized(&self) -> Result<bool> {
        debug!("Checking if database schema is initialized...");
        let query = "SELECT EXISTS (SELECT FROM information_schema.tables WHERE table_schema = 'public' AND table_name = 'entries')";
        let row = sqlx::query(query)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to check schema existence: {}", e);
                AppError::Db(e.into())
            })?;
        let initialized = row.try_get::<bool, _>(0)?;
        debug!("Schema initialized status: {}", initialized);
        Ok(initialized)
    }
}

#[async_trait]
impl EntryStore for Database {
    /// Creates the `entries` table.
    ///
    /// Uses `CREATE TABLE IF NOT EXISTS` so it can be run any number of times.
    async fn init_schema(&self) -> Result<()> {
        info!("Initializing database schema (if necessary)...");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS entries (
                id SERIAL PRIMARY KEY,
                key TEXT NOT NULL UNIQUE,
                value TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to create entries table: {}", e);
            AppError::Db(e.into())
        })?;

        info!("Database schema initialized successfully");
        Ok(())
    }

    /// Upserts on the unique `key`; `created_at` survives an update.
    async fn put_entry(&self, key: &str, value: &str) -> Result<Entry> {
        debug!("Storing entry '{}'", key);

        let entry = sqlx::query_as::<_, Entry>(
            r#"
            INSERT INTO entries (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE
                SET value = EXCLUDED.value, updated_at = NOW()
            RETURNING id, key, value, created_at, updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to store entry '{}': {}", key, e);
            AppError::Db(e.into())
        })?;

        info!("Stored entry '{}' (id {})", entry.key, entry.id);
        Ok(entry)
    }

    async fn get_entry(&self, key: &str) -> Result<Option<Entry>> {
        debug!("Fetching entry '{}'", key);

        sqlx::query_as::<_, Entry>(
            "SELECT id, key, value, created_at, updated_at FROM entries WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to fetch entry '{}': {}", key, e);
            AppError::Db(e.into())
        })
    }

    async fn list_entries(&self) -> Result<Vec<Entry>> {
        let entries = sqlx::query_as::<_, Entry>(
            "SELECT id, key, value, created_at, updated_at FROM entries ORDER BY key",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to list entries: {}", e);
            AppError::Db(e.into())
        })?;

        info!("Retrieved {} entries", entries.len());
        Ok(entries)
    }

    async fn delete_entry(&self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM entries WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to delete entry '{}': {}", key, e);
                AppError::Db(e.into())
            })?;

        let removed = result.rows_affected() > 0;
        info!("Delete '{}': removed = {}", key, removed);
        Ok(removed)
    }
}

#[cfg(test)]
mod pool_tests {
    use super::*;

    #[tokio::test]
    async fn test_new_lazy_does_not_connect() {
        // Nothing listens on port 1; a lazy pool must still be created.
        let db = Database::new_lazy("postgres://bo:bo@127.0.0.1:1/bo", 1);
        assert!(db.is_ok());
    }

    #[tokio::test]
    async fn test_new_lazy_rejects_malformed_url() {
        let result = Database::new_lazy("not a database url", 1);
        assert!(matches!(result, Err(AppError::Db(_))));
    }
}
