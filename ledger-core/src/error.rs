//! Error types for the ledger

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
///
/// Every variant except `Serialization` is a write-path validation failure:
/// the record must be rejected before it is persisted. The read/compute path
/// (aggregation, settlement) never returns these.
#[derive(Error, Debug)]
pub enum Error {
    /// Amount is zero or negative
    #[error("Non-positive amount {amount} on record {record_id}")]
    NonPositiveAmount {
        /// Expense or payment ID
        record_id: String,
        /// Offending amount
        amount: Decimal,
    },

    /// Expense has nobody to split between
    #[error("Expense {expense_id} has no participants")]
    EmptyParticipants {
        /// Expense ID
        expense_id: String,
    },

    /// Unequal split without any share entries
    #[error("Expense {expense_id} is split unequally but carries no shares")]
    MissingSplitDetails {
        /// Expense ID
        expense_id: String,
    },

    /// Unequal split omits a participant
    #[error("Expense {expense_id} has no share for participant {member_id}")]
    MissingShare {
        /// Expense ID
        expense_id: String,
        /// Participant without a share
        member_id: String,
    },

    /// Unequal split assigns a negative share
    #[error("Expense {expense_id} assigns negative share {share} to {member_id}")]
    NegativeShare {
        /// Expense ID
        expense_id: String,
        /// Participant
        member_id: String,
        /// Offending share
        share: Decimal,
    },

    /// Unequal shares do not add up to the expense amount
    #[error("Expense {expense_id} shares sum to {actual}, expected {expected}")]
    ShareSumMismatch {
        /// Expense ID
        expense_id: String,
        /// Expense amount
        expected: Decimal,
        /// Sum of participant shares
        actual: Decimal,
    },

    /// Member ID not part of the trip
    #[error("Unknown member {member_id} referenced by {record_id}")]
    UnknownMember {
        /// Expense or payment ID
        record_id: String,
        /// Unknown member
        member_id: String,
    },

    /// Payment from a member to themselves
    #[error("Payment {payment_id} has the same payer and payee")]
    SelfPayment {
        /// Payment ID
        payment_id: String,
    },

    /// Currency code is not a three-letter ISO 4217 code
    #[error("Invalid currency code: {0:?}")]
    InvalidCurrency(String),

    /// Currency differs from the trip's base currency
    #[error("Currency {actual} on {record_id} does not match base currency {expected}")]
    CurrencyMismatch {
        /// Expense or payment ID
        record_id: String,
        /// Base currency
        expected: String,
        /// Record currency
        actual: String,
    },

    /// Snapshot (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error is a write-path validation failure
    pub fn is_validation(&self) -> bool {
        !matches!(self, Error::Serialization(_))
    }
}
