use chrono::{DateTime, Utc};
use tracing::warn;

use crate::domain::{
    compute_balance_sheet, BalanceSheet, Cents, ClassificationPolicy, Transaction, TransactionId,
    TransactionKind,
};
use crate::storage::Repository;

use super::AppError;

/// Application service providing high-level operations for the treasury.
/// This is the primary interface for any client (CLI, importer, etc.).
pub struct TreasuryService {
    repo: Repository,
    policy: ClassificationPolicy,
}

/// Filter for querying transactions
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub kind: Option<TransactionKind>,
    pub category: Option<String>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

impl TreasuryService {
    /// Create a new treasury service with the given repository and the
    /// default classification policy.
    pub fn new(repo: Repository) -> Self {
        Self {
            repo,
            policy: ClassificationPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ClassificationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    // ========================
    // Transaction operations
    // ========================

    /// Record a new transaction.
    pub async fn record_transaction(
        &self,
        kind: TransactionKind,
        amount_cents: Cents,
        date: DateTime<Utc>,
        description: Option<String>,
        category: Option<String>,
        payee: Option<String>,
    ) -> Result<Transaction, AppError> {
        if amount_cents <= 0 {
            return Err(AppError::InvalidAmount(
                "Amount must be positive".to_string(),
            ));
        }

        let mut txn = Transaction::new(kind, amount_cents, date);
        if let Some(desc) = description {
            txn = txn.with_description(desc);
        }
        if let Some(cat) = category {
            txn = txn.with_category(cat);
        }
        if let Some(payee) = payee {
            txn = txn.with_payee(payee);
        }

        self.repo.save_transaction(&txn).await?;
        Ok(txn)
    }

    /// Get a transaction by ID.
    pub async fn get_transaction(&self, id: TransactionId) -> Result<Transaction, AppError> {
        self.repo
            .get_transaction(id)
            .await?
            .ok_or_else(|| AppError::TransactionNotFound(id.to_string()))
    }

    /// List all transactions in ascending date order.
    pub async fn list_transactions(&self) -> Result<Vec<Transaction>, AppError> {
        Ok(self.repo.list_transactions().await?)
    }

    /// List transactions with filters, in ascending date order.
    pub async fn list_transactions_filtered(
        &self,
        filter: TransactionFilter,
    ) -> Result<Vec<Transaction>, AppError> {
        Ok(self
            .repo
            .list_transactions_filtered(
                filter.kind,
                filter.category.as_deref(),
                filter.from_date,
                filter.to_date,
                filter.limit,
            )
            .await?)
    }

    /// Delete a transaction.
    pub async fn delete_transaction(&self, id: TransactionId) -> Result<Transaction, AppError> {
        let txn = self.get_transaction(id).await?;
        self.repo.delete_transaction(id).await?;
        Ok(txn)
    }

    // ========================
    // Balance sheet
    // ========================

    /// Compute the balance sheet over all recorded transactions.
    ///
    /// The repository returns transactions sorted ascending by date, which
    /// the fold requires. Unrecognized kinds are logged here and excluded
    /// from totals by the computation.
    pub async fn balance_sheet(&self) -> Result<BalanceSheet, AppError> {
        let transactions = self.repo.list_transactions().await?;

        for txn in &transactions {
            if txn.parsed_kind().is_none() {
                warn!(
                    id = %txn.id,
                    kind = %txn.kind,
                    "skipping transaction with unrecognized kind in totals"
                );
            }
        }

        Ok(compute_balance_sheet(&transactions, &self.policy))
    }
}
