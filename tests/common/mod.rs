// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use tempfile::TempDir;
use treasury::application::TreasuryService;
use treasury::domain::{Transaction, TransactionKind};
use treasury::storage::Repository;
use uuid::Uuid;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(TreasuryService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = TreasuryService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to create a test service plus a second repository handle on the
/// same database, for writing raw rows the service would refuse
pub async fn test_service_with_repo() -> Result<(TreasuryService, Repository, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let url = format!("sqlite:{}?mode=rwc", db_path.to_str().unwrap());
    let repo = Repository::init(&url).await?;
    let service = TreasuryService::connect(db_path.to_str().unwrap()).await?;
    Ok((service, repo, temp_dir))
}

/// Helper to parse a date string into DateTime<Utc>
pub fn parse_date(date_str: &str) -> DateTime<Utc> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
}

/// Build a raw transaction record, bypassing the typed constructor.
/// Mirrors what a loosely-typed upstream writer could store.
pub fn raw_transaction(date: &str, kind: &str, amount: Option<&str>) -> Transaction {
    Transaction {
        id: Uuid::new_v4(),
        date: Some(parse_date(date)),
        kind: kind.to_string(),
        amount: amount.map(|s| s.to_string()),
        description: None,
        category: None,
        payee: None,
        recorded_at: Utc::now(),
    }
}

/// Test fixture: a small season of chapter activity
pub struct SampleSeason;

impl SampleSeason {
    /// Opening balance, some dues, a scholarship gift, and two expenses.
    /// Net: 1000.00 opening + 250.00 + 75.00 + 500.00 in, 180.00 + 120.00 out.
    pub async fn seed(service: &TreasuryService) -> Result<()> {
        service
            .record_transaction(
                TransactionKind::Deposit,
                100_000,
                parse_date("2024-01-01"),
                Some("Beginning Balance".into()),
                None,
                None,
            )
            .await?;
        service
            .record_transaction(
                TransactionKind::Deposit,
                25000,
                parse_date("2024-01-15"),
                Some("Spring dues".into()),
                Some("dues".into()),
                None,
            )
            .await?;
        service
            .record_transaction(
                TransactionKind::Expense,
                18000,
                parse_date("2024-02-01"),
                Some("Game watch venue".into()),
                Some("events".into()),
                Some("Sports Bar LLC".into()),
            )
            .await?;
        service
            .record_transaction(
                TransactionKind::Deposit,
                7500,
                parse_date("2024-02-10"),
                Some("Raffle proceeds".into()),
                Some("fundraising".into()),
                None,
            )
            .await?;
        service
            .record_transaction(
                TransactionKind::Deposit,
                50000,
                parse_date("2024-03-01"),
                Some("Scholarship Donation - Blake Fought Memorial".into()),
                Some("scholarship fund".into()),
                Some("B. Fought Estate".into()),
            )
            .await?;
        service
            .record_transaction(
                TransactionKind::Expense,
                12000,
                parse_date("2024-03-20"),
                Some("Newsletter printing".into()),
                Some("communications".into()),
                None,
            )
            .await?;
        Ok(())
    }
}
