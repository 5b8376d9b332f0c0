use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use uuid::Uuid;

use crate::application::{AppError, LedgerStore, RefreshOutcome};
use crate::config::{
    DEFAULT_CURRENCY, DEFAULT_DATABASE, DEFAULT_FALLBACK_RATE, DEFAULT_RATE_TIMEOUT_SECS,
    DEFAULT_UNIT, Settings, init_tracing,
};
use crate::domain::{Amount, ExchangeRate, TransactionType, format_amount, parse_amount};
use crate::storage::SqliteStorage;

/// Width of the widest bar in `activity` output.
const BAR_WIDTH: usize = 30;

/// Coinbook - crypto income/expense tracker
#[derive(Parser)]
#[command(name = "coinbook")]
#[command(about = "Track crypto-denominated income and expenses in your local currency")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "COINBOOK_DATABASE", default_value = DEFAULT_DATABASE)]
    pub database: String,

    /// Rate service endpoint used by `rate refresh`
    #[arg(long, env = "COINBOOK_RATE_URL")]
    pub rate_url: Option<String>,

    /// Bearer token for the rate service
    #[arg(long, env = "COINBOOK_RATE_API_KEY", hide_env_values = true)]
    pub rate_api_key: Option<String>,

    /// Give up on a rate lookup after this many seconds
    #[arg(long, env = "COINBOOK_RATE_TIMEOUT", default_value_t = DEFAULT_RATE_TIMEOUT_SECS)]
    pub rate_timeout: u64,

    /// Label of the tracked crypto unit
    #[arg(long, env = "COINBOOK_UNIT", default_value = DEFAULT_UNIT)]
    pub unit: String,

    /// Label of the local currency
    #[arg(long, env = "COINBOOK_CURRENCY", default_value = DEFAULT_CURRENCY)]
    pub currency: String,

    /// Rate used when none has been stored yet
    #[arg(long, env = "COINBOOK_FALLBACK_RATE", default_value = DEFAULT_FALLBACK_RATE)]
    pub fallback_rate: ExchangeRate,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Record an income or expense
    Add {
        /// Amount in the crypto unit (e.g., "12.5")
        amount: String,

        /// What the transaction was for
        #[arg(short, long)]
        description: String,

        /// Transaction type: income, expense
        #[arg(short = 't', long = "type", default_value = "expense")]
        kind: String,

        /// Category (e.g., "Food", "Salary")
        #[arg(short, long, default_value = "General")]
        category: String,

        /// Date of the transaction (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Delete a transaction by id
    Delete {
        /// Transaction ID
        id: String,
    },

    /// Show the transaction history, newest first
    List {
        /// Maximum number of transactions to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show total balance, income and expense
    Summary,

    /// Show the most recent transactions as a bar chart
    Activity,

    /// Exchange rate commands
    #[command(subcommand)]
    Rate(RateCommands),

    /// Export the ledger
    Export {
        /// Format: csv, json
        format: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum RateCommands {
    /// Show the current rate
    Show,

    /// Set the rate manually
    Set {
        /// Local currency per crypto unit (e.g., "120.5")
        value: String,
    },

    /// Fetch a fresh rate from the rate service
    Refresh,
}

impl Cli {
    pub fn settings(&self) -> Settings {
        Settings {
            database: self.database.clone(),
            rate_url: self.rate_url.clone(),
            rate_api_key: self.rate_api_key.clone(),
            rate_timeout: Duration::from_secs(self.rate_timeout),
            unit: self.unit.clone(),
            currency: self.currency.clone(),
            fallback_rate: self.fallback_rate,
        }
    }

    pub async fn run(self) -> Result<()> {
        init_tracing(self.verbose);
        let settings = self.settings();

        let storage = SqliteStorage::open(&settings.database).await?;
        let mut store = LedgerStore::open(storage, settings.fallback_rate).await?;

        match self.command {
            Commands::Init => {
                println!("Database initialized: {}", settings.database);
            }

            Commands::Add {
                amount,
                description,
                kind,
                category,
                date,
            } => {
                let amount =
                    parse_amount(&amount).context("Invalid amount format. Use '12.5' or '12'")?;
                let kind: TransactionType = kind.parse().map_err(|e| {
                    anyhow::anyhow!("Invalid type '{}'. Valid types: income, expense. {}", kind, e)
                })?;
                let date = match date {
                    Some(date_str) => parse_date(&date_str).with_context(|| {
                        format!("Invalid date format '{}'. Use YYYY-MM-DD", date_str)
                    })?,
                    None => Local::now().date_naive(),
                };

                let tx = store.add(description, amount, kind, category, date).await?;
                println!(
                    "Recorded {}: {} {} ({} {}) ({})",
                    tx.kind.as_str().to_lowercase(),
                    format_amount(tx.amount),
                    settings.unit,
                    local_value(&store, tx.amount),
                    settings.currency,
                    tx.id
                );
            }

            Commands::Delete { id } => {
                let id =
                    Uuid::parse_str(&id).context("Invalid transaction ID format (expected UUID)")?;
                match store.delete(id).await? {
                    Some(tx) => println!("Deleted: {} ({})", tx.description, tx.id),
                    None => println!("No transaction with id {}", id),
                }
            }

            Commands::List { limit } => run_list_command(&store, &settings, limit),

            Commands::Summary => run_summary_command(&store, &settings),

            Commands::Activity => run_activity_command(&store, &settings),

            Commands::Rate(rate_cmd) => run_rate_command(&mut store, &settings, rate_cmd).await?,

            Commands::Export { format, output } => {
                run_export_command(&store, &format, output.as_deref())?
            }
        }

        Ok(())
    }
}

fn run_list_command(
    store: &LedgerStore<SqliteStorage>,
    settings: &Settings,
    limit: Option<usize>,
) {
    if store.is_empty() {
        println!("No transactions found.");
        return;
    }

    println!(
        "{:<12} {:<8} {:>12} {:>14} {:<15} {:<24} ID",
        "DATE",
        "TYPE",
        settings.unit,
        settings.currency,
        "CATEGORY",
        "DESCRIPTION"
    );
    println!("{}", "-".repeat(125));

    let shown = limit.unwrap_or(usize::MAX);
    for tx in store.transactions().iter().take(shown) {
        let sign = if tx.is_income() { "+" } else { "-" };
        println!(
            "{:<12} {:<8} {:>12} {:>14} {:<15} {:<24} {}",
            tx.date.format("%Y-%m-%d"),
            tx.kind,
            format!("{}{}", sign, format_amount(tx.amount)),
            local_value(store, tx.amount),
            truncate(&tx.category, 15),
            truncate(&tx.description, 24),
            tx.id
        );
    }

    if store.len() > shown {
        println!("... and {} more", store.len() - shown);
    }
}

fn run_summary_command(store: &LedgerStore<SqliteStorage>, settings: &Settings) {
    let summary = store.summary();

    for (label, value) in [
        ("Total balance", summary.total_balance),
        ("Total income", summary.total_income),
        ("Total expense", summary.total_expense),
    ] {
        println!(
            "{:<15} {:>14} {:<6} {:>16} {}",
            format!("{}:", label),
            format_amount(value),
            settings.unit,
            local_value(store, value),
            settings.currency
        );
    }
    println!();
    println!(
        "Rate: 1 {} = {} {}",
        settings.unit,
        store.rate(),
        settings.currency
    );
}

fn run_activity_command(store: &LedgerStore<SqliteStorage>, settings: &Settings) {
    let points = store.recent_activity();
    if points.is_empty() {
        println!("No recent activity.");
        return;
    }

    let max = points
        .iter()
        .map(|p| p.amount)
        .max()
        .unwrap_or(Decimal::ZERO);

    println!("Recent activity (oldest first), in {}", settings.unit);
    for point in &points {
        let width = bar_width(point.amount, max);
        let (sign, glyph) = match point.kind {
            TransactionType::Income => ('+', "#"),
            TransactionType::Expense => ('-', "="),
        };
        println!(
            "{:<12} {:<width$} {}{}",
            point.label,
            glyph.repeat(width),
            sign,
            format_amount(point.amount),
            width = BAR_WIDTH
        );
    }
}

async fn run_rate_command(
    store: &mut LedgerStore<SqliteStorage>,
    settings: &Settings,
    cmd: RateCommands,
) -> Result<()> {
    match cmd {
        RateCommands::Show => {
            println!(
                "1 {} = {} {}",
                settings.unit,
                store.rate(),
                settings.currency
            );
        }

        RateCommands::Set { value } => {
            let rate = parse_rate(&value)?;
            store.set_rate(rate).await?;
            println!("Rate set: 1 {} = {} {}", settings.unit, rate, settings.currency);
        }

        RateCommands::Refresh => {
            let updater = settings.rate_updater()?;
            match store.refresh_rate(&updater).await? {
                RefreshOutcome::Updated { rate, sources } => {
                    println!("Rate updated: 1 {} = {} {}", settings.unit, rate, settings.currency);
                    if !sources.is_empty() {
                        println!();
                        println!("Sources:");
                        for source in &sources {
                            println!("  - {} <{}>", source.title, source.uri);
                        }
                    }
                }
                RefreshOutcome::Unchanged { reason } => {
                    println!(
                        "Rate unchanged ({}): 1 {} = {} {}",
                        reason,
                        settings.unit,
                        store.rate(),
                        settings.currency
                    );
                }
                RefreshOutcome::AlreadyUpdating => {
                    println!("A rate refresh is already in progress.");
                }
            }
        }
    }
    Ok(())
}

fn run_export_command(
    store: &LedgerStore<SqliteStorage>,
    format: &str,
    output: Option<&str>,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{Write, stdout};

    let exporter = Exporter::new(store);

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match format {
        "csv" => {
            let count = exporter.export_transactions_csv(writer)?;
            if output.is_some() {
                eprintln!("Exported {} transactions", count);
            }
        }
        "json" => {
            let snapshot = exporter.export_snapshot_json(writer)?;
            if output.is_some() {
                eprintln!("Exported {} transactions", snapshot.transactions.len());
            }
        }
        _ => {
            anyhow::bail!("Invalid export format '{}'. Valid formats: csv, json", format);
        }
    }

    Ok(())
}

/// Number of bar glyphs for `amount`, scaled so `max` fills the full width.
fn bar_width(amount: Decimal, max: Decimal) -> usize {
    if max <= Decimal::ZERO {
        return 0;
    }
    let scaled = (amount / max * Decimal::from(BAR_WIDTH as u64)).round();
    scaled.to_usize().unwrap_or(0).clamp(1, BAR_WIDTH)
}

/// Local currency text for display; `n/a` when out of range.
fn local_value(store: &LedgerStore<SqliteStorage>, amount: Amount) -> String {
    store
        .format_local(amount)
        .unwrap_or_else(|| "n/a".to_string())
}

fn parse_rate(value: &str) -> Result<ExchangeRate, AppError> {
    value.parse().map_err(AppError::InvalidRate)
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

fn parse_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
        .context("Date must be in YYYY-MM-DD format")
}
