//! Ledger aggregation
//!
//! Folds a snapshot's expenses and recorded payments into one net position
//! per member. Nothing is cached: callers re-run [`aggregate`] on every
//! fresh snapshot.
//!
//! # Example
//!
//! ```
//! use rust_decimal::Decimal;
//! use tripledger_core::{aggregate, Expense, Member};
//!
//! let members = vec![
//!     Member::new("a", "Asha"),
//!     Member::new("b", "Bilal"),
//!     Member::new("c", "Chen"),
//! ];
//! let expenses = vec![Expense::equal("e1", Decimal::from(90), "a", ["a", "b", "c"])];
//!
//! let financials = aggregate(&members, &expenses, &[]);
//! assert_eq!(financials[0].member_id.as_str(), "a");
//! assert_eq!(financials[0].net_balance, Decimal::from(60));
//! ```

use crate::{
    tolerance::{approx_eq, SETTLEMENT_TOLERANCE},
    types::{Expense, Member, MemberFinancials, MemberId, RecordedPayment, Split},
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Running totals for one member
#[derive(Debug, Clone, Default)]
struct Position {
    paid: Decimal,
    share: Decimal,
    sent: Decimal,
    received: Decimal,
}

impl Position {
    fn initial_net(&self) -> Decimal {
        self.paid - self.share
    }

    fn net(&self) -> Decimal {
        self.initial_net() + self.sent - self.received
    }
}

/// Compute every member's financial position
///
/// - Payers and participants that are not members are skipped.
/// - Unequal splits contribute only the shares recorded for participants;
///   a participant without an entry owes nothing for that expense.
/// - Payments are applied in input order (the result does not depend on it);
///   payments naming an unknown member only affect the known side.
///
/// Rows are sorted by net balance descending, then member ID ascending.
pub fn aggregate(
    members: &[Member],
    expenses: &[Expense],
    payments: &[RecordedPayment],
) -> Vec<MemberFinancials> {
    let mut index: HashMap<&MemberId, usize> = HashMap::with_capacity(members.len());
    let mut roster: Vec<&Member> = Vec::with_capacity(members.len());
    for member in members {
        if index.contains_key(&member.id) {
            warn!(member_id = %member.id, "Duplicate member in snapshot, keeping first");
            continue;
        }
        index.insert(&member.id, roster.len());
        roster.push(member);
    }

    let mut positions = vec![Position::default(); roster.len()];
    // Cleared whenever a record had to be handled defensively; the
    // conservation check below only holds for fully consistent input.
    let mut consistent = true;

    for expense in expenses {
        match index.get(&expense.paid_by) {
            Some(&i) => positions[i].paid += expense.amount,
            None => {
                warn!(
                    expense_id = %expense.id,
                    member_id = %expense.paid_by,
                    "Expense payer is not a member, skipping paid amount"
                );
                consistent = false;
            }
        }

        for (participant, share) in expense.shares() {
            match index.get(participant) {
                Some(&i) => positions[i].share += share,
                None => {
                    warn!(
                        expense_id = %expense.id,
                        member_id = %participant,
                        "Expense participant is not a member, skipping share"
                    );
                    consistent = false;
                }
            }
        }

        if let Split::Unequal(_) = expense.split {
            let allocated = expense.allocated();
            if !approx_eq(allocated, expense.amount) {
                warn!(
                    expense_id = %expense.id,
                    amount = %expense.amount,
                    allocated = %allocated,
                    "Unequal split does not cover the expense amount"
                );
                consistent = false;
            }
        } else if expense.participants.is_empty() {
            warn!(expense_id = %expense.id, "Expense has no participants");
            consistent = false;
        }
    }

    for payment in payments {
        match index.get(&payment.from_user_id) {
            Some(&i) => positions[i].sent += payment.amount,
            None => consistent = false,
        }
        match index.get(&payment.to_user_id) {
            Some(&i) => positions[i].received += payment.amount,
            None => consistent = false,
        }
        if !index.contains_key(&payment.from_user_id) || !index.contains_key(&payment.to_user_id) {
            warn!(
                payment_id = %payment.id,
                from = %payment.from_user_id,
                to = %payment.to_user_id,
                "Recorded payment references an unknown member"
            );
        }
    }

    let mut financials: Vec<MemberFinancials> = roster
        .iter()
        .zip(positions.iter())
        .map(|(member, position)| MemberFinancials {
            member_id: member.id.clone(),
            member_name: member.label(),
            total_paid: position.paid,
            total_share: position.share,
            initial_net_balance: position.initial_net(),
            net_balance: position.net(),
        })
        .collect();

    financials.sort_by(|a, b| {
        b.net_balance
            .cmp(&a.net_balance)
            .then_with(|| a.member_id.cmp(&b.member_id))
    });

    let imbalance = total_net(&financials);
    debug_assert!(
        !consistent || imbalance.abs() <= conservation_bound(expenses.len()),
        "net balances sum to {imbalance} on consistent input"
    );

    debug!(
        members = financials.len(),
        expenses = expenses.len(),
        payments = payments.len(),
        consistent,
        imbalance = %imbalance,
        "Ledger aggregated"
    );

    financials
}

/// Sum of all net balances (zero for consistent input)
pub fn total_net(financials: &[MemberFinancials]) -> Decimal {
    financials.iter().map(|f| f.net_balance).sum()
}

/// Largest imbalance consistent input may carry
///
/// Each validated unequal split may miss its amount by up to the tolerance.
pub fn conservation_bound(expense_count: usize) -> Decimal {
    SETTLEMENT_TOLERANCE * Decimal::from(expense_count.max(1))
}
