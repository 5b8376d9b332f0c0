use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::LedgerStore;
use crate::domain::{ExchangeRate, FinancialSummary, Transaction, format_amount};
use crate::storage::LedgerStorage;

/// Ledger snapshot for JSON export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub exchange_rate: ExchangeRate,
    pub summary: FinancialSummary,
    pub transactions: Vec<Transaction>,
}

/// Exporter for converting ledger data to CSV or JSON
pub struct Exporter<'a, S> {
    store: &'a LedgerStore<S>,
}

impl<'a, S: LedgerStorage> Exporter<'a, S> {
    pub fn new(store: &'a LedgerStore<S>) -> Self {
        Self { store }
    }

    /// Export the transaction history to CSV, newest first, with the local
    /// currency value of each row at the current rate.
    pub fn export_transactions_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "id",
            "date",
            "type",
            "description",
            "category",
            "amount",
            "local_amount",
        ])?;

        let mut count = 0;
        for tx in self.store.transactions() {
            csv_writer.write_record(&[
                tx.id.to_string(),
                tx.date.format("%Y-%m-%d").to_string(),
                tx.kind.as_str().to_string(),
                tx.description.clone(),
                tx.category.clone(),
                format_amount(tx.amount),
                self.store.format_local(tx.amount).unwrap_or_default(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export the whole ledger as a pretty-printed JSON snapshot
    pub fn export_snapshot_json<W: Write>(&self, mut writer: W) -> Result<LedgerSnapshot> {
        let snapshot = LedgerSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            exchange_rate: self.store.rate(),
            summary: self.store.summary(),
            transactions: self.store.transactions().to_vec(),
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}
