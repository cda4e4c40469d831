//! TripLedger Settlement
//!
//! Suggests who should pay whom to close out a trip.
//!
//! # Architecture
//!
//! Settlement runs on a fresh snapshot every time:
//!
//! 1. **Aggregation**: `tripledger_core::aggregate` folds expenses and
//!    recorded payments into net balances
//! 2. **Netting**: [`settle`] greedily matches the largest debtor with the
//!    largest creditor until every balance is within tolerance
//! 3. **Recording**: [`record_settlement`] turns a suggested transfer into a
//!    payment for the caller to append to the log, after which the plan is
//!    recomputed
//!
//! # Example
//!
//! ```
//! use rust_decimal::Decimal;
//! use tripledger_core::{aggregate, Expense, Member};
//! use tripledger_settlement::settle;
//!
//! let members = vec![
//!     Member::new("a", "Asha"),
//!     Member::new("b", "Bilal"),
//!     Member::new("c", "Chen"),
//! ];
//! let expenses = vec![Expense::equal("e1", Decimal::from(90), "a", ["a", "b", "c"])];
//!
//! let transactions = settle(&aggregate(&members, &expenses, &[]));
//! assert_eq!(transactions.len(), 2);
//! assert_eq!(transactions[0].to_name, "Asha");
//! assert_eq!(transactions[0].amount, Decimal::from(30));
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod config;
pub mod error;
pub mod netting;
pub mod record;
pub mod report;
pub mod types;

// Re-exports
pub use config::{Config, OutputFormat};
pub use error::{Error, Result};
pub use netting::settle;
pub use record::{record_settlement, record_settlement_with, RecordRequest};
pub use report::SettlementReport;
pub use types::SettlementPlan;
