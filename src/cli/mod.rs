use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::application::{AppError, TransactionFilter, TreasuryService};
use crate::domain::{format_cents, parse_cents, BalanceSheet, Transaction, TransactionKind};
use crate::io::{ImportOptions, Importer};

/// Treasury - Alumni Chapter Ledger
#[derive(Parser)]
#[command(name = "treasury")]
#[command(about = "A local-first treasury ledger for alumni chapter finances")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "treasury.db")]
    pub database: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Record a deposit
    Deposit {
        /// Amount (e.g., "50.00" or "50")
        amount: String,

        /// Description of the deposit
        #[arg(short, long)]
        description: Option<String>,

        /// Category (e.g., "dues", "scholarship fund")
        #[arg(short, long)]
        category: Option<String>,

        /// Who the money came from
        #[arg(short, long)]
        payee: Option<String>,

        /// Date of the deposit (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Record an expense
    Expense {
        /// Amount (e.g., "50.00" or "50")
        amount: String,

        /// Description of the expense
        #[arg(short, long)]
        description: Option<String>,

        /// Category (e.g., "events", "postage")
        #[arg(short, long)]
        category: Option<String>,

        /// Who the money went to
        #[arg(short, long)]
        payee: Option<String>,

        /// Date of the expense (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// List recorded transactions
    Transactions {
        /// Filter by kind: deposit, expense
        #[arg(long)]
        kind: Option<String>,

        /// Filter by category
        #[arg(long)]
        category: Option<String>,

        /// Filter from date (YYYY-MM-DD)
        #[arg(long)]
        from_date: Option<String>,

        /// Filter to date (YYYY-MM-DD)
        #[arg(long)]
        to_date: Option<String>,

        /// Maximum number of transactions to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show the balance sheet with running balances and totals
    BalanceSheet {
        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Show a single transaction
    Show {
        /// Transaction ID
        id: String,
    },

    /// Delete a transaction
    Delete {
        /// Transaction ID
        id: String,
    },

    /// Import transactions from CSV (date,type,amount,description,category,payee)
    Import {
        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,

        /// Preview without importing
        #[arg(long)]
        dry_run: bool,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                TreasuryService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Deposit {
                amount,
                description,
                category,
                payee,
                date,
            } => {
                let service = TreasuryService::connect(&self.database).await?;
                run_record_command(
                    &service,
                    TransactionKind::Deposit,
                    &amount,
                    description,
                    category,
                    payee,
                    date,
                )
                .await?;
            }

            Commands::Expense {
                amount,
                description,
                category,
                payee,
                date,
            } => {
                let service = TreasuryService::connect(&self.database).await?;
                run_record_command(
                    &service,
                    TransactionKind::Expense,
                    &amount,
                    description,
                    category,
                    payee,
                    date,
                )
                .await?;
            }

            Commands::Transactions {
                kind,
                category,
                from_date,
                to_date,
                limit,
            } => {
                let service = TreasuryService::connect(&self.database).await?;
                run_transactions_command(&service, kind, category, from_date, to_date, limit)
                    .await?;
            }

            Commands::BalanceSheet { format } => {
                let service = TreasuryService::connect(&self.database).await?;
                run_balance_sheet_command(&service, &format).await?;
            }

            Commands::Show { id } => {
                let service = TreasuryService::connect(&self.database).await?;
                let id = Uuid::parse_str(&id)
                    .context("Invalid transaction ID format (expected UUID)")?;
                let txn = service.get_transaction(id).await?;
                print_transaction_detail(&txn);
            }

            Commands::Delete { id } => {
                let service = TreasuryService::connect(&self.database).await?;
                let id = Uuid::parse_str(&id)
                    .context("Invalid transaction ID format (expected UUID)")?;
                let txn = service.delete_transaction(id).await?;
                println!(
                    "Deleted {}: {} ({})",
                    txn.kind,
                    txn.amount.as_deref().unwrap_or("-"),
                    txn.id
                );
            }

            Commands::Import { input, dry_run } => {
                let service = TreasuryService::connect(&self.database).await?;
                run_import_command(&service, input.as_deref(), dry_run).await?;
            }
        }

        Ok(())
    }
}

async fn run_record_command(
    service: &TreasuryService,
    kind: TransactionKind,
    amount: &str,
    description: Option<String>,
    category: Option<String>,
    payee: Option<String>,
    date: Option<String>,
) -> Result<()> {
    let amount_cents =
        parse_cents(amount).context("Invalid amount format. Use '50.00' or '50'")?;

    let date = match date {
        Some(date_str) => parse_date(&date_str)
            .with_context(|| format!("Invalid date format '{}'. Use YYYY-MM-DD", date_str))?,
        None => Utc::now(),
    };

    let txn = service
        .record_transaction(kind, amount_cents, date, description, category, payee)
        .await?;

    println!(
        "Recorded {}: {} ({})",
        txn.kind,
        format_cents(amount_cents),
        txn.id
    );
    Ok(())
}

async fn run_transactions_command(
    service: &TreasuryService,
    kind: Option<String>,
    category: Option<String>,
    from_date: Option<String>,
    to_date: Option<String>,
    limit: Option<usize>,
) -> Result<()> {
    let kind = kind.as_deref().map(parse_kind).transpose()?;

    let from_date = from_date.map(|d| parse_date(&d)).transpose()?;
    let to_date = to_date.map(|d| parse_date(&d)).transpose()?;

    let transactions = service
        .list_transactions_filtered(TransactionFilter {
            kind,
            category,
            from_date,
            to_date,
            limit,
        })
        .await?;

    if transactions.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    println!(
        "{:<12} {:<9} {:>12} {:<18} {:<30}",
        "DATE", "KIND", "AMOUNT", "CATEGORY", "DESCRIPTION"
    );
    println!("{}", "-".repeat(84));
    for txn in &transactions {
        println!(
            "{:<12} {:<9} {:>12} {:<18} {:<30}",
            format_date(txn.date),
            txn.kind,
            txn.amount.as_deref().unwrap_or("-"),
            txn.category.as_deref().unwrap_or("-"),
            txn.description.as_deref().unwrap_or("-"),
        );
    }
    println!("\n{} transaction(s)", transactions.len());
    Ok(())
}

async fn run_balance_sheet_command(service: &TreasuryService, format: &str) -> Result<()> {
    let sheet = service.balance_sheet().await?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&sheet)?);
        }
        "table" => print_balance_sheet_table(&sheet),
        other => anyhow::bail!("Invalid format '{}'. Valid formats: table, json", other),
    }
    Ok(())
}

fn print_balance_sheet_table(sheet: &BalanceSheet) {
    if sheet.rows.is_empty() {
        println!("No transactions recorded.");
    } else {
        println!(
            "{:<12} {:<9} {:<30} {:>12} {:>12}",
            "DATE", "KIND", "DESCRIPTION", "AMOUNT", "BALANCE"
        );
        println!("{}", "-".repeat(79));
        for row in &sheet.rows {
            let txn = &row.transaction;
            println!(
                "{:<12} {:<9} {:<30} {:>12} {:>12}",
                format_date(txn.date),
                txn.kind,
                txn.description.as_deref().unwrap_or("-"),
                txn.amount.as_deref().unwrap_or("-"),
                format_cents(row.running_balance),
            );
        }
        println!();
    }

    println!("Current balance:  {:>12}", format_cents(sheet.current_balance));
    println!("Total income:     {:>12}", format_cents(sheet.total_income));
    println!("Total expenses:   {:>12}", format_cents(sheet.total_expenses));
    println!("Scholarship fund: {:>12}", format_cents(sheet.scholarship_total));
}

fn print_transaction_detail(txn: &Transaction) {
    println!("Transaction: {}", txn.id);
    println!("  Date:        {}", format_date(txn.date));
    println!("  Kind:        {}", txn.kind);
    println!("  Amount:      {}", txn.amount.as_deref().unwrap_or("-"));
    println!(
        "  Description: {}",
        txn.description.as_deref().unwrap_or("-")
    );
    println!("  Category:    {}", txn.category.as_deref().unwrap_or("-"));
    println!("  Payee:       {}", txn.payee.as_deref().unwrap_or("-"));
    println!("  Recorded at: {}", txn.recorded_at.to_rfc3339());
}

async fn run_import_command(
    service: &TreasuryService,
    input: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    let options = ImportOptions { dry_run };
    let importer = Importer::new(service);

    let result = match input {
        Some(path) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("Failed to open input file: {}", path))?;
            importer.import_transactions_csv(file, options).await?
        }
        None => {
            importer
                .import_transactions_csv(std::io::stdin(), options)
                .await?
        }
    };

    if dry_run {
        println!("Dry run: {} transaction(s) would be imported", result.imported);
    } else {
        println!("Imported {} transaction(s)", result.imported);
    }
    if result.skipped > 0 {
        println!("Skipped {} row(s)", result.skipped);
    }

    if !result.errors.is_empty() {
        println!("{} error(s):", result.errors.len());
        for err in &result.errors {
            match &err.field {
                Some(field) => println!("  line {} [{}]: {}", err.line, field, err.error),
                None => println!("  line {}: {}", err.line, err.error),
            }
        }
    }
    Ok(())
}

fn parse_kind(s: &str) -> Result<TransactionKind, AppError> {
    TransactionKind::from_str(s)
        .ok_or_else(|| AppError::InvalidKind(format!("'{}'. Valid kinds: deposit, expense", s)))
}

fn parse_date(date_str: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")?;
    let dt = date
        .and_hms_opt(0, 0, 0)
        .context("Invalid time components")?;
    Ok(dt.and_utc())
}

fn format_date(date: Option<DateTime<Utc>>) -> String {
    match date {
        Some(dt) => dt.format("%Y-%m-%d").to_string(),
        None => "-".to_string(),
    }
}
