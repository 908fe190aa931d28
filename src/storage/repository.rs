use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::{Transaction, TransactionId, TransactionKind};

use super::MIGRATION_001_INITIAL;

/// Repository for persisting and querying treasury transactions.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Save a new transaction to the database.
    pub async fn save_transaction(&self, txn: &Transaction) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO transactions (id, date, kind, amount, description, category, payee, recorded_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(txn.id.to_string())
        .bind(txn.date.map(|dt| dt.to_rfc3339()))
        .bind(&txn.kind)
        .bind(&txn.amount)
        .bind(&txn.description)
        .bind(&txn.category)
        .bind(&txn.payee)
        .bind(txn.recorded_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save transaction")?;
        Ok(())
    }

    /// Get a transaction by ID.
    pub async fn get_transaction(&self, id: TransactionId) -> Result<Option<Transaction>> {
        let row = sqlx::query(
            r#"
            SELECT id, date, kind, amount, description, category, payee, recorded_at
            FROM transactions
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch transaction")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_transaction(&row)?)),
            None => Ok(None),
        }
    }

    /// List all transactions sorted ascending by date, with the recording
    /// timestamp as tie-break. The balance-sheet fold requires this order.
    pub async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(
            r#"
            SELECT id, date, kind, amount, description, category, payee, recorded_at
            FROM transactions
            ORDER BY date ASC, recorded_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list transactions")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    /// List transactions matching the given filters, in ascending date order.
    pub async fn list_transactions_filtered(
        &self,
        kind: Option<TransactionKind>,
        category: Option<&str>,
        from_date: Option<DateTime<Utc>>,
        to_date: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> Result<Vec<Transaction>> {
        let mut sql = String::from(
            "SELECT id, date, kind, amount, description, category, payee, recorded_at \
             FROM transactions WHERE 1=1",
        );
        if kind.is_some() {
            sql.push_str(" AND kind = ?");
        }
        if category.is_some() {
            sql.push_str(" AND category = ?");
        }
        if from_date.is_some() {
            sql.push_str(" AND date >= ?");
        }
        if to_date.is_some() {
            sql.push_str(" AND date <= ?");
        }
        sql.push_str(" ORDER BY date ASC, recorded_at ASC");
        if limit.is_some() {
            sql.push_str(" LIMIT ?");
        }

        let mut query = sqlx::query(&sql);
        if let Some(kind) = kind {
            query = query.bind(kind.as_str());
        }
        if let Some(category) = category {
            query = query.bind(category.to_string());
        }
        if let Some(from_date) = from_date {
            query = query.bind(from_date.to_rfc3339());
        }
        if let Some(to_date) = to_date {
            query = query.bind(to_date.to_rfc3339());
        }
        if let Some(limit) = limit {
            query = query.bind(limit as i64);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .context("Failed to list filtered transactions")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    /// Delete a transaction by ID.
    pub async fn delete_transaction(&self, id: TransactionId) -> Result<()> {
        sqlx::query("DELETE FROM transactions WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete transaction")?;
        Ok(())
    }

    /// Count all transactions.
    pub async fn count_transactions(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM transactions")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count transactions")?;
        Ok(row.get("count"))
    }

    fn row_to_transaction(row: &sqlx::sqlite::SqliteRow) -> Result<Transaction> {
        let id_str: String = row.get("id");
        let date_str: Option<String> = row.get("date");
        let recorded_at_str: String = row.get("recorded_at");

        Ok(Transaction {
            id: Uuid::parse_str(&id_str).context("Invalid transaction ID")?,
            date: date_str
                .map(|s| DateTime::parse_from_rfc3339(&s))
                .transpose()
                .context("Invalid date timestamp")?
                .map(|dt| dt.with_timezone(&Utc)),
            kind: row.get("kind"),
            amount: row.get("amount"),
            description: row.get("description"),
            category: row.get("category"),
            payee: row.get("payee"),
            recorded_at: DateTime::parse_from_rfc3339(&recorded_at_str)
                .context("Invalid recorded_at timestamp")?
                .with_timezone(&Utc),
        })
    }
}
