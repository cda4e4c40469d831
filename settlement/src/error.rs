//! Error types for the settlement crate

use thiserror::Error;

/// Result type for settlement operations
pub type Result<T> = std::result::Result<T, Error>;

/// Settlement errors
#[derive(Error, Debug)]
pub enum Error {
    /// Ledger error (validation, snapshot parsing)
    #[error("Ledger error: {0}")]
    Ledger(#[from] tripledger_core::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No suggested transfer between the two members
    #[error("No suggested transfer from {from} to {to}")]
    NoSuchTransfer {
        /// Debtor
        from: String,
        /// Creditor
        to: String,
    },
}

impl Error {
    /// Error caused by rejected input rather than the environment
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Ledger(e) if e.is_validation())
    }
}
