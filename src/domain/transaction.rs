use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{format_cents, parse_cents, Cents};

pub type TransactionId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money entering the treasury (dues, donations, fundraisers)
    Deposit,
    /// Money leaving the treasury (scholarships, events, fees)
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Expense => "expense",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "deposit" => Some(TransactionKind::Deposit),
            "expense" => Some(TransactionKind::Expense),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single dated financial movement in the chapter treasury.
///
/// The stored record mirrors the upstream data store, which is populated by
/// admin forms and therefore loosely typed: `kind` and `amount` are kept as
/// raw text and interpreted leniently at computation time. Well-formed
/// writers (CLI, importer) go through [`Transaction::new`], which stores
/// canonical values; the read path never assumes that happened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    /// When the movement occurred; used for ordering and display only
    pub date: Option<DateTime<Utc>>,
    /// Raw kind; recognized values are "deposit" and "expense"
    pub kind: String,
    /// Raw decimal amount; missing or unparsable text counts as zero
    pub amount: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub payee: Option<String>,
    /// When we recorded this transaction in the system
    pub recorded_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a well-formed transaction with a canonical amount string.
    pub fn new(kind: TransactionKind, amount_cents: Cents, date: DateTime<Utc>) -> Self {
        assert!(amount_cents > 0, "Transaction amount must be positive");
        Self {
            id: Uuid::new_v4(),
            date: Some(date),
            kind: kind.as_str().to_string(),
            amount: Some(format_cents(amount_cents)),
            description: None,
            category: None,
            payee: None,
            recorded_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_payee(mut self, payee: impl Into<String>) -> Self {
        self.payee = Some(payee.into());
        self
    }

    /// The recognized kind, if any. Unrecognized kinds are excluded from
    /// balance and totals but still appear in listings and ledger rows.
    pub fn parsed_kind(&self) -> Option<TransactionKind> {
        TransactionKind::from_str(&self.kind)
    }

    /// Lenient amount: missing or unparsable text counts as zero.
    pub fn amount_cents(&self) -> Cents {
        self.amount
            .as_deref()
            .and_then(|s| parse_cents(s).ok())
            .unwrap_or(0)
    }

    /// Amount signed by kind: positive for deposits, negative for expenses,
    /// zero for unrecognized kinds.
    pub fn signed_amount(&self) -> Cents {
        match self.parsed_kind() {
            Some(TransactionKind::Deposit) => self.amount_cents(),
            Some(TransactionKind::Expense) => -self.amount_cents(),
            None => 0,
        }
    }
}
