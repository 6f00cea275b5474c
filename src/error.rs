// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Error type shared by the ledger core.
//!
//! Every ledger mutation validates before it writes, so any of the business
//! variants below means nothing was changed.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Account not found with id: {0}")]
    AccountNotFound(i64),

    #[error("Transaction not found with id: {0}")]
    TransactionNotFound(i64),

    /// Business-rule violation; the message tells fiat and Bitcoin shortfalls apart.
    #[error("{0}")]
    InsufficientBalance(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Malformed backup section [{section}]: {reason}")]
    MalformedBackupSection { section: String, reason: String },

    #[error("Price fetch failed: {0}")]
    PriceFetchFailure(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Stored value is corrupt: {0}")]
    Corrupt(String),
}

impl LedgerError {
    pub(crate) fn malformed(section: &str, reason: impl Into<String>) -> Self {
        LedgerError::MalformedBackupSection {
            section: section.to_string(),
            reason: reason.into(),
        }
    }

    pub fn is_insufficient_balance(&self) -> bool {
        matches!(self, LedgerError::InsufficientBalance(_))
    }
}

impl From<reqwest::Error> for LedgerError {
    fn from(err: reqwest::Error) -> Self {
        LedgerError::PriceFetchFailure(err.to_string())
    }
}
