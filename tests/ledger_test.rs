mod common;

use anyhow::Result;
use coinbook::LedgerStore;
use coinbook::application::AppError;
use coinbook::domain::{ExchangeRate, FinancialSummary, RateQuote, RateSource, TransactionType};
use coinbook::storage::{EXCHANGE_RATE_KEY, TRANSACTIONS_KEY};
use common::{FlakyStorage, fallback_rate, memory_store, parse_date};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

fn assert_balanced(summary: &FinancialSummary) {
    assert_eq!(
        summary.total_balance,
        summary.total_income - summary.total_expense
    );
}

#[tokio::test]
async fn test_income_then_expense_scenario() -> Result<()> {
    let mut store = memory_store().await?;

    store
        .add(
            "Salary",
            dec!(100),
            TransactionType::Income,
            "Work",
            parse_date("2024-01-01"),
        )
        .await?;
    let expense = store
        .add(
            "Groceries",
            dec!(30),
            TransactionType::Expense,
            "Food",
            parse_date("2024-01-02"),
        )
        .await?;

    let summary = store.summary();
    assert_eq!(summary.total_income, dec!(100));
    assert_eq!(summary.total_expense, dec!(30));
    assert_eq!(summary.total_balance, dec!(70));

    store.delete(expense.id).await?;

    let summary = store.summary();
    assert_eq!(summary.total_income, dec!(100));
    assert_eq!(summary.total_expense, dec!(0));
    assert_eq!(summary.total_balance, dec!(100));

    Ok(())
}

#[tokio::test]
async fn test_balance_identity_after_every_operation() -> Result<()> {
    let mut store = memory_store().await?;
    let date = parse_date("2024-06-01");

    let operations = [
        (dec!(12.5), TransactionType::Income),
        (dec!(3.25), TransactionType::Expense),
        (dec!(40), TransactionType::Expense),
        (dec!(0.001), TransactionType::Income),
        (dec!(7), TransactionType::Income),
    ];

    let mut ids = Vec::new();
    for (amount, kind) in operations {
        let tx = store.add("op", amount, kind, "Misc", date).await?;
        ids.push(tx.id);
        assert_balanced(&store.summary());
    }

    for id in ids.iter().step_by(2) {
        store.delete(*id).await?;
        assert_balanced(&store.summary());
    }

    let summary = store.summary();
    assert_eq!(summary.total_income, dec!(0.001));
    assert_eq!(summary.total_expense, dec!(3.25));

    Ok(())
}

#[tokio::test]
async fn test_add_places_transaction_at_head() -> Result<()> {
    let mut store = memory_store().await?;
    let date = parse_date("2024-02-10");

    for i in 0..5 {
        let before = store.len();
        let tx = store
            .add(
                format!("tx{}", i),
                dec!(1),
                TransactionType::Income,
                "Misc",
                date,
            )
            .await?;

        assert_eq!(store.len(), before + 1);
        assert_eq!(store.transactions()[0], tx);
    }

    let order: Vec<&str> = store
        .transactions()
        .iter()
        .map(|tx| tx.description.as_str())
        .collect();
    assert_eq!(order, vec!["tx4", "tx3", "tx2", "tx1", "tx0"]);

    Ok(())
}

#[tokio::test]
async fn test_delete_removes_exactly_one_record() -> Result<()> {
    let mut store = memory_store().await?;
    let date = parse_date("2024-02-10");

    let a = store
        .add("a", dec!(1), TransactionType::Income, "Misc", date)
        .await?;
    let b = store
        .add("b", dec!(2), TransactionType::Expense, "Misc", date)
        .await?;
    let c = store
        .add("c", dec!(3), TransactionType::Income, "Misc", date)
        .await?;

    let removed = store.delete(b.id).await?;
    assert_eq!(removed, Some(b.clone()));
    assert_eq!(store.len(), 2);
    assert_eq!(store.transactions(), &[c.clone(), a.clone()]);
    assert!(store.find(b.id).is_none());

    let before = store.transactions().to_vec();
    let removed = store.delete(Uuid::new_v4()).await?;
    assert!(removed.is_none());
    assert_eq!(store.transactions(), before.as_slice());

    // deleting the same id twice is also a no-op
    assert!(store.delete(b.id).await?.is_none());
    assert_eq!(store.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_every_mutation_is_persisted() -> Result<()> {
    let mut store = memory_store().await?;
    let date = parse_date("2024-02-10");

    let tx = store
        .add("a", dec!(1), TransactionType::Income, "Misc", date)
        .await?;
    assert_eq!(store.storage().write_count(), 1);

    store.delete(Uuid::new_v4()).await?;
    assert_eq!(store.storage().write_count(), 2);

    store.delete(tx.id).await?;
    assert_eq!(store.storage().write_count(), 3);
    assert_eq!(
        store
            .storage()
            .get(coinbook::storage::TRANSACTIONS_KEY)
            .as_deref(),
        Some("[]")
    );

    Ok(())
}

#[tokio::test]
async fn test_non_positive_amount_is_rejected() -> Result<()> {
    let mut store = memory_store().await?;
    let date = parse_date("2024-02-10");

    let result = store
        .add("zero", dec!(0), TransactionType::Income, "Misc", date)
        .await;
    assert!(matches!(result, Err(AppError::InvalidAmount(_))));

    let result = store
        .add("negative", dec!(-10), TransactionType::Expense, "Misc", date)
        .await;
    assert!(matches!(result, Err(AppError::InvalidAmount(_))));

    assert!(store.is_empty());
    assert_eq!(store.storage().write_count(), 0);

    Ok(())
}

#[tokio::test]
async fn test_recent_activity_uses_last_seven() -> Result<()> {
    let mut store = memory_store().await?;

    for day in 1..=9 {
        store
            .add(
                format!("Day {} purchase", day),
                dec!(1) * rust_decimal::Decimal::from(day),
                TransactionType::Expense,
                "Misc",
                parse_date(&format!("2024-03-{:02}", day)),
            )
            .await?;
    }

    let points = store.recent_activity();
    assert_eq!(points.len(), 7);
    assert_eq!(points[0].label, "Day 3 pu...");
    assert_eq!(points[0].amount, dec!(3));
    assert_eq!(points[6].amount, dec!(9));

    Ok(())
}

#[tokio::test]
async fn test_failed_write_rolls_back_every_mutation() -> Result<()> {
    let mut store = LedgerStore::open(FlakyStorage::new(), fallback_rate()).await?;
    let date = parse_date("2024-06-01");
    let first = store
        .add("Salary", dec!(100), TransactionType::Income, "Work", date)
        .await?;
    let second = store
        .add("Rent", dec!(40), TransactionType::Expense, "Home", date)
        .await?;
    store.set_rate(ExchangeRate::new(dec!(50)).unwrap()).await?;

    let before = store.transactions().to_vec();
    let stored_transactions = store.storage().get(TRANSACTIONS_KEY);
    let stored_rate = store.storage().get(EXCHANGE_RATE_KEY);
    store.storage().fail_writes(true);

    let result = store
        .add("Bonus", dec!(5), TransactionType::Income, "Work", date)
        .await;
    assert!(matches!(result, Err(AppError::Storage(_))));
    assert_eq!(store.transactions(), before.as_slice());

    // the older record sits at index 1 and must return there
    assert!(store.delete(first.id).await.is_err());
    assert_eq!(store.transactions(), before.as_slice());
    assert_eq!(store.transactions()[1], first);
    assert!(store.delete(second.id).await.is_err());
    assert_eq!(store.transactions()[0], second);

    assert!(store.set_rate(ExchangeRate::new(dec!(99)).unwrap()).await.is_err());
    assert_eq!(store.rate().value(), dec!(50));

    let quote = RateQuote::new(Some(dec!(75)), vec![RateSource::new("x", "https://x")]);
    assert!(store.apply_quote(quote).await.is_err());
    assert_eq!(store.rate().value(), dec!(50));
    assert!(store.sources().is_empty());

    assert_eq!(store.storage().get(TRANSACTIONS_KEY), stored_transactions);
    assert_eq!(store.storage().get(EXCHANGE_RATE_KEY), stored_rate);
    assert_balanced(&store.summary());

    // the store keeps working once writes succeed again
    store.storage().fail_writes(false);
    assert!(store.delete(first.id).await?.is_some());
    assert_eq!(store.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_overflowing_amount_is_rejected() -> Result<()> {
    let mut store = memory_store().await?;
    let date = parse_date("2024-06-01");

    store
        .add("Windfall", Decimal::MAX, TransactionType::Income, "Misc", date)
        .await?;
    let result = store
        .add("Windfall", Decimal::MAX, TransactionType::Income, "Misc", date)
        .await;

    assert!(matches!(result, Err(AppError::InvalidAmount(_))));
    assert_eq!(store.len(), 1);
    let summary = store.summary();
    assert_eq!(summary.total_income, Decimal::MAX);
    assert_balanced(&summary);

    Ok(())
}
