mod memory;
mod sqlite;

use anyhow::Result;
use async_trait::async_trait;

pub use memory::*;
pub use sqlite::*;

/// SQL migration for the key/value table
pub const MIGRATION_001_INITIAL: &str = include_str!("migrations/001_initial.sql");

/// Key holding the serialized transaction sequence (JSON array).
pub const TRANSACTIONS_KEY: &str = "transactions";

/// Key holding the exchange rate as decimal text.
pub const EXCHANGE_RATE_KEY: &str = "exchange_rate";

/// Durable text storage the ledger store persists into.
///
/// Values are opaque strings; serialization is the caller's concern. Every
/// `save` replaces the whole value under its key.
#[async_trait]
pub trait LedgerStorage: Send + Sync {
    /// Read the value stored under `key`, if any.
    async fn load(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`.
    async fn save(&self, key: &str, value: &str) -> Result<()>;
}
