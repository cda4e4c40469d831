//! Core types for the ledger
//!
//! Wire names are camelCase to match the document store that supplies trip
//! snapshots. Money is `Decimal` throughout.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Member identifier (opaque string key from the auth provider)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    /// Create new member ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shortened form used when no display name is available
    pub fn short(&self) -> String {
        let prefix: String = self.0.chars().take(6).collect();
        format!("{prefix}...")
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MemberId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Trip member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Identity key for all balance bookkeeping
    pub id: MemberId,

    /// Name shown in summaries
    #[serde(default)]
    pub display_name: String,

    /// Contact email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Member {
    /// Create member without email
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: MemberId::new(id),
            display_name: display_name.into(),
            email: None,
        }
    }

    /// Display name, or a shortened ID when the name is empty
    pub fn label(&self) -> String {
        if self.display_name.is_empty() {
            self.id.short()
        } else {
            self.display_name.clone()
        }
    }
}

/// Look up a member's label, falling back to the shortened ID
pub fn member_label(members: &[Member], id: &MemberId) -> String {
    members
        .iter()
        .find(|m| &m.id == id)
        .map(Member::label)
        .unwrap_or_else(|| id.short())
}

/// Split tag as stored on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitKind {
    /// Uniform shares
    #[default]
    #[serde(alias = "equally")]
    Equal,
    /// Explicit per-participant shares
    #[serde(alias = "unequally")]
    Unequal,
}

/// Resolved split rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Split {
    /// `amount / |participants|` each
    Equal,
    /// Explicit shares keyed by member
    Unequal(BTreeMap<MemberId, Decimal>),
}

impl Split {
    /// Wire tag for this split
    pub fn kind(&self) -> SplitKind {
        match self {
            Split::Equal => SplitKind::Equal,
            Split::Unequal(_) => SplitKind::Unequal,
        }
    }
}

/// Expense as stored in the document store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRecord {
    /// Expense ID
    pub id: String,

    /// Free-text description
    #[serde(default)]
    pub description: String,

    /// Total amount
    pub amount: Decimal,

    /// Currency code
    pub currency: String,

    /// Member who paid
    pub paid_by: MemberId,

    /// Category (Food, Transport, ...)
    #[serde(default)]
    pub category: String,

    /// Members sharing the cost
    #[serde(default)]
    pub participants: BTreeSet<MemberId>,

    /// Split tag
    #[serde(default)]
    pub split_type: SplitKind,

    /// Shares for unequal splits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_details: Option<BTreeMap<MemberId, Decimal>>,

    /// Date the expense was incurred
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,

    /// Notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Expense with its split resolved
///
/// Conversion from [`ExpenseRecord`] never fails: an unequal split without
/// a `splitDetails` field falls back to an equal split. An empty
/// `splitDetails` map stays unequal and charges nobody. Use
/// [`Validator`](crate::validation::Validator) on the write path to reject
/// inconsistent records instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ExpenseRecord", into = "ExpenseRecord")]
pub struct Expense {
    /// Expense ID
    pub id: String,

    /// Free-text description
    pub description: String,

    /// Total amount
    pub amount: Decimal,

    /// Currency code
    pub currency: String,

    /// Member who paid (need not be a participant)
    pub paid_by: MemberId,

    /// Category
    pub category: String,

    /// Members sharing the cost
    pub participants: BTreeSet<MemberId>,

    /// Split rule
    pub split: Split,

    /// Date the expense was incurred
    pub date: Option<DateTime<Utc>>,

    /// Notes
    pub notes: Option<String>,
}

impl Expense {
    /// Equal-split expense
    pub fn equal<I, M>(
        id: impl Into<String>,
        amount: Decimal,
        paid_by: impl Into<MemberId>,
        participants: I,
    ) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<MemberId>,
    {
        Self {
            id: id.into(),
            description: String::new(),
            amount,
            currency: String::new(),
            paid_by: paid_by.into(),
            category: String::new(),
            participants: participants.into_iter().map(Into::into).collect(),
            split: Split::Equal,
            date: None,
            notes: None,
        }
    }

    /// Unequal-split expense; participants are the share keys
    pub fn unequal<I, M>(
        id: impl Into<String>,
        amount: Decimal,
        paid_by: impl Into<MemberId>,
        shares: I,
    ) -> Self
    where
        I: IntoIterator<Item = (M, Decimal)>,
        M: Into<MemberId>,
    {
        let shares: BTreeMap<MemberId, Decimal> =
            shares.into_iter().map(|(m, s)| (m.into(), s)).collect();
        Self {
            id: id.into(),
            description: String::new(),
            amount,
            currency: String::new(),
            paid_by: paid_by.into(),
            category: String::new(),
            participants: shares.keys().cloned().collect(),
            split: Split::Unequal(shares),
            date: None,
            notes: None,
        }
    }

    /// Set currency
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Set category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Each participant's share of this expense
    ///
    /// Equal splits divide the amount by the participant count. Unequal
    /// splits yield the recorded share for every participant that has one;
    /// entries for non-participants are ignored and participants without an
    /// entry are omitted (they owe nothing for this expense).
    pub fn shares(&self) -> Vec<(&MemberId, Decimal)> {
        match &self.split {
            Split::Equal => {
                if self.participants.is_empty() {
                    return Vec::new();
                }
                let share = self.amount / Decimal::from(self.participants.len());
                self.participants.iter().map(|p| (p, share)).collect()
            }
            Split::Unequal(details) => self
                .participants
                .iter()
                .filter_map(|p| details.get(p).map(|share| (p, *share)))
                .collect(),
        }
    }

    /// Sum of [`shares`](Self::shares)
    pub fn allocated(&self) -> Decimal {
        self.shares().iter().map(|(_, share)| *share).sum()
    }
}

impl From<ExpenseRecord> for Expense {
    fn from(record: ExpenseRecord) -> Self {
        let split = match (record.split_type, record.split_details) {
            (SplitKind::Unequal, Some(details)) => Split::Unequal(details),
            _ => Split::Equal,
        };

        Self {
            id: record.id,
            description: record.description,
            amount: record.amount,
            currency: record.currency,
            paid_by: record.paid_by,
            category: record.category,
            participants: record.participants,
            split,
            date: record.date,
            notes: record.notes,
        }
    }
}

impl From<Expense> for ExpenseRecord {
    fn from(expense: Expense) -> Self {
        let split_type = expense.split.kind();
        let split_details = match expense.split {
            Split::Equal => None,
            Split::Unequal(details) => Some(details),
        };

        Self {
            id: expense.id,
            description: expense.description,
            amount: expense.amount,
            currency: expense.currency,
            paid_by: expense.paid_by,
            category: expense.category,
            participants: expense.participants,
            split_type,
            split_details,
            date: expense.date,
            notes: expense.notes,
        }
    }
}

/// Peer-to-peer transfer that already happened (append-only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedPayment {
    /// Payment ID
    pub id: String,

    /// Member who paid
    pub from_user_id: MemberId,

    /// Member who received
    pub to_user_id: MemberId,

    /// Amount transferred
    pub amount: Decimal,

    /// Currency code
    pub currency: String,

    /// When the payment was logged
    pub date_recorded: DateTime<Utc>,

    /// Member who logged it
    pub recorded_by: MemberId,

    /// Notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Per-member position derived from a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberFinancials {
    /// Member ID
    pub member_id: MemberId,

    /// Member label
    pub member_name: String,

    /// Sum of expenses paid
    pub total_paid: Decimal,

    /// Sum of shares owed
    pub total_share: Decimal,

    /// `total_paid - total_share`
    pub initial_net_balance: Decimal,

    /// Initial balance adjusted by recorded payments
    /// (positive = owed money, negative = owes money)
    pub net_balance: Decimal,
}

/// Suggested transfer that reduces outstanding debt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementTransaction {
    /// Debtor (pays)
    pub from_user_id: MemberId,

    /// Debtor label
    pub from_name: String,

    /// Creditor (receives)
    pub to_user_id: MemberId,

    /// Creditor label
    pub to_name: String,

    /// Amount to transfer
    pub amount: Decimal,
}

impl fmt::Display for SettlementTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}: {}", self.from_name, self.to_name, self.amount)
    }
}

/// Consistent read of one trip's members, expenses and payments
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSnapshot {
    /// Trip members
    #[serde(default)]
    pub members: Vec<Member>,

    /// Expenses as stored
    #[serde(default)]
    pub expenses: Vec<ExpenseRecord>,

    /// Recorded payment log
    #[serde(default, alias = "recordedPayments")]
    pub payments: Vec<RecordedPayment>,
}

impl TripSnapshot {
    /// Parse a snapshot from JSON
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Expenses with splits resolved
    pub fn resolved_expenses(&self) -> Vec<Expense> {
        self.expenses.iter().cloned().map(Expense::from).collect()
    }

    /// Net position of every member
    pub fn financials(&self) -> Vec<MemberFinancials> {
        crate::ledger::aggregate(&self.members, &self.resolved_expenses(), &self.payments)
    }
}
