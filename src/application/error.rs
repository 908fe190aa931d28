use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid transaction kind: {0}")]
    InvalidKind(String),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}
