use serde::{Deserialize, Serialize};

use super::{Amount, Transaction, TransactionType};

/// Number of points in the recent-activity series.
pub const RECENT_ACTIVITY_POINTS: usize = 7;

/// Descriptions longer than this are truncated in chart labels.
const LABEL_MAX_CHARS: usize = 8;

/// One bar of the recent-activity chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityPoint {
    pub label: String,
    pub amount: Amount,
    pub kind: TransactionType,
}

/// Build the recent-activity series from a newest-first ledger.
/// Takes the `count` most recent transactions and returns them oldest first,
/// so the series reads chronologically left to right.
pub fn recent_activity(transactions: &[Transaction], count: usize) -> Vec<ActivityPoint> {
    transactions
        .iter()
        .take(count)
        .rev()
        .map(|tx| ActivityPoint {
            label: chart_label(&tx.description),
            amount: tx.amount,
            kind: tx.kind,
        })
        .collect()
}

/// Shorten a description for use as a chart label: first 8 characters plus "...".
pub fn chart_label(description: &str) -> String {
    if description.chars().count() > LABEL_MAX_CHARS {
        let head: String = description.chars().take(LABEL_MAX_CHARS).collect();
        format!("{}...", head)
    } else {
        description.to_string()
    }
}
