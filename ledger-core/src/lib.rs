//! TripLedger Core
//!
//! Group-expense ledger: turns a trip snapshot (members, expenses, recorded
//! payments) into one net position per member.
//!
//! # Architecture
//!
//! - **Snapshot in, positions out**: aggregation is a pure function of a
//!   consistent read; no ledger state is cached between calls
//! - **Exact money**: `Decimal` amounts; only equal-split division rounds
//! - **One tolerance**: [`SETTLEMENT_TOLERANCE`] is shared with validation and
//!   settlement
//!
//! # Invariants
//!
//! - Money conservation: Σ(net balances) == 0 within tolerance
//! - Deterministic output: same snapshot → same rows, same order
//! - Append-only payments: recorded payments are never modified
//! - Defensive reads: unknown member IDs are skipped, never an error

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod error;
pub mod expenses;
pub mod ledger;
pub mod payments;
pub mod summary;
pub mod tolerance;
pub mod types;
pub mod validation;

// Re-exports
pub use error::{Error, Result};
pub use expenses::{ExpenseOrder, ExpenseQuery};
pub use ledger::aggregate;
pub use payments::{PaymentOrder, PaymentQuery};
pub use summary::ExpenseSummary;
pub use tolerance::SETTLEMENT_TOLERANCE;
pub use types::{
    Expense, ExpenseRecord, Member, MemberFinancials, MemberId, RecordedPayment,
    SettlementTransaction, Split, SplitKind, TripSnapshot,
};
pub use validation::Validator;
