use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::Amount;

pub type TransactionId = Uuid;

/// Direction of a transaction. The amount itself is always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "INCOME",
            TransactionType::Expense => "EXPENSE",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" | "in" => Ok(TransactionType::Income),
            "expense" | "out" => Ok(TransactionType::Expense),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

/// A single recorded income or expense, denominated in the crypto unit.
/// Transactions are immutable once recorded; the only change allowed is deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub description: String,
    /// Amount in the crypto unit (always positive)
    #[serde(deserialize_with = "positive_amount")]
    pub amount: Amount,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: String,
    /// Calendar date the transaction happened, stored as YYYY-MM-DD
    pub date: NaiveDate,
}

impl Transaction {
    /// Create a new transaction with a fresh random id.
    /// Amount positivity is checked by the ledger store before this is called.
    pub fn new(
        description: impl Into<String>,
        amount: Amount,
        kind: TransactionType,
        category: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            amount,
            kind,
            category: category.into(),
            date,
        }
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }
}

/// Rejects zero and negative amounts on decode, so stored data cannot
/// bypass the check done in the ledger store.
fn positive_amount<'de, D>(deserializer: D) -> Result<Amount, D::Error>
where
    D: Deserializer<'de>,
{
    let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
    if amount <= Decimal::ZERO {
        return Err(serde::de::Error::custom(format!(
            "amount must be positive, got {}",
            amount
        )));
    }
    Ok(amount)
}
