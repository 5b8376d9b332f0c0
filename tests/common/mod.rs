// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::NaiveDate;
use coinbook::LedgerStore;
use coinbook::domain::ExchangeRate;
use coinbook::storage::{LedgerStorage, MemoryStorage, SqliteStorage};
use rust_decimal_macros::dec;
use tempfile::TempDir;

/// Rate used when a test does not care about conversion
pub fn fallback_rate() -> ExchangeRate {
    ExchangeRate::new(dec!(1)).unwrap()
}

/// Helper to create a store over in-memory storage
pub async fn memory_store() -> Result<LedgerStore<MemoryStorage>> {
    Ok(LedgerStore::open(MemoryStorage::new(), fallback_rate()).await?)
}

/// Helper to create a store with a temporary SQLite database
pub async fn sqlite_store() -> Result<(LedgerStore<SqliteStorage>, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let storage = SqliteStorage::open(db_path.to_str().unwrap()).await?;
    let store = LedgerStore::open(storage, fallback_rate()).await?;
    Ok((store, temp_dir))
}

/// Reopen the database left behind by `sqlite_store`
pub async fn reopen(temp_dir: &TempDir) -> Result<LedgerStore<SqliteStorage>> {
    let db_path = temp_dir.path().join("test.db");
    let storage = SqliteStorage::open(db_path.to_str().unwrap()).await?;
    Ok(LedgerStore::open(storage, fallback_rate()).await?)
}

/// Helper to parse a date string into NaiveDate
pub fn parse_date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

/// Memory storage whose writes can be switched to fail
#[derive(Debug, Default)]
pub struct FlakyStorage {
    inner: MemoryStorage,
    failing: AtomicBool,
}

impl FlakyStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }
}

#[async_trait]
impl LedgerStorage for FlakyStorage {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        self.inner.load(key).await
    }

    async fn save(&self, key: &str, value: &str) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            bail!("disk full");
        }
        self.inner.save(key, value).await
    }
}
