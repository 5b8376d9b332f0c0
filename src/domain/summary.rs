use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Amount, Transaction, TransactionType};

/// Totals derived from the ledger. Never stored; always recomputed from the
/// current transaction sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub total_balance: Amount,
    pub total_income: Amount,
    pub total_expense: Amount,
}

impl FinancialSummary {
    /// Fold a transaction sequence into income, expense and net balance.
    /// Income adds to income and balance; expense adds to expense and
    /// subtracts from balance.
    ///
    /// Totals saturate at the decimal range. The ledger store never holds a
    /// sequence whose totals overflow, see [`Self::checked_from_transactions`].
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        Self::checked_from_transactions(transactions).unwrap_or_else(|| {
            transactions
                .iter()
                .fold(FinancialSummary::default(), |mut summary, tx| {
                    match tx.kind {
                        TransactionType::Income => {
                            summary.total_income = summary.total_income.saturating_add(tx.amount);
                            summary.total_balance = summary.total_balance.saturating_add(tx.amount);
                        }
                        TransactionType::Expense => {
                            summary.total_expense =
                                summary.total_expense.saturating_add(tx.amount);
                            summary.total_balance = summary.total_balance.saturating_sub(tx.amount);
                        }
                    }
                    summary
                })
        })
    }

    /// Same fold as [`Self::from_transactions`], or `None` if any total
    /// leaves the decimal range.
    pub fn checked_from_transactions(transactions: &[Transaction]) -> Option<Self> {
        transactions
            .iter()
            .try_fold(FinancialSummary::default(), |summary, tx| match tx.kind {
                TransactionType::Income => Some(FinancialSummary {
                    total_income: summary.total_income.checked_add(tx.amount)?,
                    total_balance: summary.total_balance.checked_add(tx.amount)?,
                    ..summary
                }),
                TransactionType::Expense => Some(FinancialSummary {
                    total_expense: summary.total_expense.checked_add(tx.amount)?,
                    total_balance: summary.total_balance.checked_sub(tx.amount)?,
                    ..summary
                }),
            })
    }

    pub fn is_empty(&self) -> bool {
        self.total_income == Decimal::ZERO && self.total_expense == Decimal::ZERO
    }
}
