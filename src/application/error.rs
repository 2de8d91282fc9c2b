use thiserror::Error;

use crate::domain::{Cents, CpfError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(#[from] CpfError),

    #[error("Account already exists: {0}")]
    DuplicateIdentifier(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Amount must be positive")]
    NonPositiveAmount,

    #[error("Withdrawal limit exceeded: requested {requested} cents, the cap is R$ 500,00")]
    LimitExceeded { requested: Cents },

    #[error("Daily withdrawal limit reached: 3 withdrawals already made today")]
    DailyCountExceeded,

    #[error("Insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: Cents, requested: Cents },

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}
