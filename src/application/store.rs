use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::domain::{
    ActivityPoint, Amount, ExchangeRate, FinancialSummary, RECENT_ACTIVITY_POINTS, RateQuote,
    RateSource, Transaction, TransactionId, TransactionType, format_amount, recent_activity,
};
use crate::rates::{RateError, RateProvider};
use crate::storage::{EXCHANGE_RATE_KEY, LedgerStorage, TRANSACTIONS_KEY};

use super::{AppError, RateUpdater};

/// Result of asking the store to refresh its exchange rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new rate was applied and persisted.
    Updated {
        rate: ExchangeRate,
        sources: Vec<RateSource>,
    },
    /// The lookup failed or produced no usable rate; the previous rate is kept.
    Unchanged { reason: String },
    /// Another refresh was still running.
    AlreadyUpdating,
}

/// The ledger: newest-first transactions plus the current exchange rate.
///
/// This is the primary interface for any client (CLI, tests). Every mutation
/// re-serializes the affected value in full and writes it to storage before
/// returning.
pub struct LedgerStore<S> {
    storage: S,
    transactions: Vec<Transaction>,
    rate: ExchangeRate,
    fallback_rate: ExchangeRate,
    sources: Vec<RateSource>,
}

impl<S: LedgerStorage> LedgerStore<S> {
    /// Open a store over `storage`, loading whatever state it holds.
    /// `fallback_rate` is used when no usable rate has been persisted.
    pub async fn open(storage: S, fallback_rate: ExchangeRate) -> Result<Self, AppError> {
        let mut store = Self {
            storage,
            transactions: Vec::new(),
            rate: fallback_rate,
            fallback_rate,
            sources: Vec::new(),
        };
        store.load().await?;
        Ok(store)
    }

    /// Reload transactions and rate from storage.
    ///
    /// Missing or undecodable values fall back to an empty ledger and the
    /// fallback rate. Only a failing storage backend is reported as an error.
    pub async fn load(&mut self) -> Result<&[Transaction], AppError> {
        self.transactions = match self.storage.load(TRANSACTIONS_KEY).await? {
            Some(raw) => match serde_json::from_str::<Vec<Transaction>>(&raw) {
                Ok(transactions)
                    if FinancialSummary::checked_from_transactions(&transactions).is_some() =>
                {
                    transactions
                }
                Ok(_) => {
                    warn!("stored transaction totals are out of range; starting empty");
                    Vec::new()
                }
                Err(e) => {
                    warn!(error = %e, "stored transactions are unreadable; starting empty");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        self.rate = match self.storage.load(EXCHANGE_RATE_KEY).await? {
            Some(raw) => match raw.parse::<ExchangeRate>() {
                Ok(rate) => rate,
                Err(e) => {
                    warn!(error = %e, "stored exchange rate is unusable; using fallback");
                    self.fallback_rate
                }
            },
            None => self.fallback_rate,
        };

        debug!(
            transactions = self.transactions.len(),
            rate = %self.rate,
            "ledger loaded"
        );
        Ok(&self.transactions)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// All transactions, newest first.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn find(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| tx.id == id)
    }

    pub fn rate(&self) -> ExchangeRate {
        self.rate
    }

    /// Citations for the last fetched rate. Empty until a refresh succeeds
    /// in this session.
    pub fn sources(&self) -> &[RateSource] {
        &self.sources
    }

    /// Totals over the current ledger. Computed on every call.
    pub fn summary(&self) -> FinancialSummary {
        FinancialSummary::from_transactions(&self.transactions)
    }

    /// The seven most recent transactions, oldest first.
    pub fn recent_activity(&self) -> Vec<ActivityPoint> {
        recent_activity(&self.transactions, RECENT_ACTIVITY_POINTS)
    }

    /// Value of `amount` in local currency at the current rate, if it is
    /// representable.
    pub fn to_local(&self, amount: Amount) -> Option<Decimal> {
        self.rate.convert(amount)
    }

    /// Local currency value formatted with two decimals.
    pub fn format_local(&self, amount: Amount) -> Option<String> {
        self.rate.format_local(amount)
    }

    // ========================
    // Transaction operations
    // ========================

    /// Record a new transaction at the head of the ledger.
    pub async fn add(
        &mut self,
        description: impl Into<String>,
        amount: Amount,
        kind: TransactionType,
        category: impl Into<String>,
        date: NaiveDate,
    ) -> Result<Transaction, AppError> {
        if amount <= Decimal::ZERO {
            return Err(AppError::InvalidAmount(format!(
                "amount must be positive, got {}",
                format_amount(amount)
            )));
        }

        let transaction = Transaction::new(description, amount, kind, category, date);
        self.transactions.insert(0, transaction.clone());

        if FinancialSummary::checked_from_transactions(&self.transactions).is_none() {
            self.transactions.remove(0);
            return Err(AppError::InvalidAmount(format!(
                "adding {} would overflow the ledger totals",
                format_amount(amount)
            )));
        }

        if let Err(e) = self.persist_transactions().await {
            self.transactions.remove(0);
            return Err(e);
        }

        info!(
            id = %transaction.id,
            kind = %transaction.kind,
            amount = %format_amount(transaction.amount),
            "transaction added"
        );
        Ok(transaction)
    }

    /// Remove the transaction with `id`. Absent ids are a no-op.
    /// The resulting sequence is persisted either way.
    pub async fn delete(&mut self, id: TransactionId) -> Result<Option<Transaction>, AppError> {
        let position = self.transactions.iter().position(|tx| tx.id == id);
        let removed = position.map(|index| (index, self.transactions.remove(index)));

        if let Err(e) = self.persist_transactions().await {
            if let Some((index, transaction)) = removed {
                self.transactions.insert(index, transaction);
            }
            return Err(e);
        }

        match &removed {
            Some(_) => info!(%id, "transaction deleted"),
            None => debug!(%id, "delete of unknown transaction ignored"),
        }
        Ok(removed.map(|(_, transaction)| transaction))
    }

    // ========================
    // Rate operations
    // ========================

    /// Manually override the exchange rate. Sources are left as they are.
    pub async fn set_rate(&mut self, rate: ExchangeRate) -> Result<(), AppError> {
        self.persist_rate(rate).await?;
        self.rate = rate;
        info!(%rate, "exchange rate set");
        Ok(())
    }

    /// Apply a lookup result. A defined, positive rate replaces the current
    /// rate and source list and is persisted; anything else leaves the store
    /// untouched. Returns whether the quote was applied.
    pub async fn apply_quote(&mut self, quote: RateQuote) -> Result<bool, AppError> {
        let Some(rate) = quote.exchange_rate() else {
            return Ok(false);
        };

        self.persist_rate(rate).await?;
        self.rate = rate;
        self.sources = quote.sources;
        info!(%rate, sources = self.sources.len(), "exchange rate updated");
        Ok(true)
    }

    /// Fetch a fresh rate through `updater` and apply it.
    ///
    /// Lookup failures and missing rates never surface as errors: they are
    /// logged and reported as [`RefreshOutcome::Unchanged`]. Only a failure to
    /// persist the new rate is returned as `Err`.
    pub async fn refresh_rate<P: RateProvider>(
        &mut self,
        updater: &RateUpdater<P>,
    ) -> Result<RefreshOutcome, AppError> {
        let quote = match updater.refresh().await {
            Ok(quote) => quote,
            Err(RateError::AlreadyUpdating) => return Ok(RefreshOutcome::AlreadyUpdating),
            Err(e) => {
                warn!(error = %e, "rate refresh failed; keeping current rate");
                return Ok(RefreshOutcome::Unchanged {
                    reason: e.to_string(),
                });
            }
        };

        if self.apply_quote(quote).await? {
            Ok(RefreshOutcome::Updated {
                rate: self.rate,
                sources: self.sources.clone(),
            })
        } else {
            warn!("rate service returned no usable rate; keeping current rate");
            Ok(RefreshOutcome::Unchanged {
                reason: "no rate in response".to_string(),
            })
        }
    }

    async fn persist_transactions(&self) -> Result<(), AppError> {
        let raw = serde_json::to_string(&self.transactions)?;
        self.storage.save(TRANSACTIONS_KEY, &raw).await?;
        Ok(())
    }

    async fn persist_rate(&self, rate: ExchangeRate) -> Result<(), AppError> {
        self.storage
            .save(EXCHANGE_RATE_KEY, &rate.to_storage_string())
            .await?;
        Ok(())
    }
}
