use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::{LedgerStorage, MIGRATION_001_INITIAL};

/// SQLite-backed key/value storage.
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Create a new storage with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let storage = Self::connect(database_url).await?;
        storage.migrate().await?;
        Ok(storage)
    }

    /// Open the database file at `path`, creating it and its schema if needed.
    pub async fn open(path: &str) -> Result<Self> {
        debug!(path, "opening sqlite storage");
        Self::init(&format!("sqlite:{}?mode=rwc", path)).await
    }

    /// When the value under `key` was last written, as RFC 3339 text.
    pub async fn updated_at(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT updated_at FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch updated_at")?;

        Ok(row.map(|row| row.get("updated_at")))
    }
}

#[async_trait]
impl LedgerStorage for SqliteStorage {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to load key '{}'", key))?;

        Ok(row.map(|row| row.get("value")))
    }

    async fn save(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to save key '{}'", key))?;

        debug!(key, bytes = value.len(), "persisted");
        Ok(())
    }
}
