//! Greedy debt netting
//!
//! Turns net balances into a short list of peer-to-peer transfers by
//! repeatedly matching the largest remaining debtor with the largest
//! remaining creditor.
//!
//! # Algorithm
//!
//! 1. Split members into debtors (`balance < -ε`) and creditors (`balance > ε`)
//! 2. Sort debtors by balance ascending, creditors by balance descending
//!    (ties by member ID ascending)
//! 3. Transfer `min(debt, credit)` between the two cursors
//! 4. Advance whichever cursor is within ε of zero
//!
//! # Example
//!
//! ```text
//! Net positions:
//!   A: +60 (creditor)
//!   B: -30 (debtor)
//!   C: -30 (debtor)
//!
//! Transfers:
//!   B pays A: 30
//!   C pays A: 30
//! ```
//!
//! At most `debtors + creditors - 1` transfers are emitted. The result is
//! not guaranteed to be the minimum possible transfer count.

use rust_decimal::Decimal;
use tracing::{debug, warn};
use tripledger_core::{
    ledger::total_net,
    tolerance::{is_credit, is_debit, is_settled, SETTLEMENT_TOLERANCE},
    MemberFinancials, MemberId, SettlementTransaction,
};

/// Working entry for one side of the matching
#[derive(Debug, Clone)]
struct Party<'a> {
    id: &'a MemberId,
    name: &'a str,
    balance: Decimal,
}

impl<'a> Party<'a> {
    fn from_financials(f: &'a MemberFinancials) -> Self {
        Self {
            id: &f.member_id,
            name: &f.member_name,
            balance: f.net_balance,
        }
    }
}

/// Compute suggested transfers that drive every balance to zero
///
/// Deterministic: identical input yields identical transactions in identical
/// order. Input balances are expected to sum to zero; otherwise the residue
/// stays with whichever side runs out last.
pub fn settle(financials: &[MemberFinancials]) -> Vec<SettlementTransaction> {
    let imbalance = total_net(financials);
    if !is_settled(imbalance) {
        warn!(
            imbalance = %imbalance,
            "Net balances do not sum to zero, settlement will leave a residue"
        );
    }

    let mut debtors: Vec<Party<'_>> = financials
        .iter()
        .filter(|f| is_debit(f.net_balance))
        .map(Party::from_financials)
        .collect();
    let mut creditors: Vec<Party<'_>> = financials
        .iter()
        .filter(|f| is_credit(f.net_balance))
        .map(Party::from_financials)
        .collect();

    // Most negative first / largest credit first
    debtors.sort_by(|a, b| a.balance.cmp(&b.balance).then_with(|| a.id.cmp(b.id)));
    creditors.sort_by(|a, b| b.balance.cmp(&a.balance).then_with(|| a.id.cmp(b.id)));

    let mut transactions = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < debtors.len() && j < creditors.len() {
        let debtor = &mut debtors[i];
        let creditor = &mut creditors[j];

        let transfer = (-debtor.balance).min(creditor.balance);
        if transfer > SETTLEMENT_TOLERANCE {
            transactions.push(SettlementTransaction {
                from_user_id: debtor.id.clone(),
                from_name: debtor.name.to_string(),
                to_user_id: creditor.id.clone(),
                to_name: creditor.name.to_string(),
                amount: transfer,
            });
        }

        debtor.balance += transfer;
        creditor.balance -= transfer;

        if is_settled(debtor.balance) {
            i += 1;
        }
        if is_settled(creditor.balance) {
            j += 1;
        }
    }

    debug!(
        debtors = debtors.len(),
        creditors = creditors.len(),
        transactions = transactions.len(),
        "Settlement computed"
    );

    transactions
}
