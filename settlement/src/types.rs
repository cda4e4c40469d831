//! Settlement plan and its statistics

use crate::netting::settle;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tripledger_core::{
    tolerance::{is_credit, is_debit, is_settled},
    MemberFinancials, MemberId, SettlementTransaction,
};

/// Suggested transfers for one snapshot, with the balances they came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementPlan {
    /// Suggested transfers in emission order
    pub transactions: Vec<SettlementTransaction>,

    /// Members owing more than the tolerance
    pub debtor_count: usize,

    /// Members owed more than the tolerance
    pub creditor_count: usize,

    /// Sum of positive balances
    pub total_outstanding: Decimal,

    /// Sum of suggested transfer amounts
    pub total_transferred: Decimal,

    /// Balances the plan was computed from
    #[serde(skip)]
    balances: BTreeMap<MemberId, Decimal>,
}

impl SettlementPlan {
    /// Run the solver and collect statistics
    pub fn compute(financials: &[MemberFinancials]) -> Self {
        let transactions = settle(financials);

        let debtor_count = financials.iter().filter(|f| is_debit(f.net_balance)).count();
        let creditor_count = financials.iter().filter(|f| is_credit(f.net_balance)).count();
        let total_outstanding = financials
            .iter()
            .filter(|f| is_credit(f.net_balance))
            .map(|f| f.net_balance)
            .sum();
        let total_transferred = transactions.iter().map(|t| t.amount).sum();

        let balances = financials
            .iter()
            .map(|f| (f.member_id.clone(), f.net_balance))
            .collect();

        Self {
            transactions,
            debtor_count,
            creditor_count,
            total_outstanding,
            total_transferred,
            balances,
        }
    }

    /// Nothing left to settle
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Upper bound on the transfer count: `debtors + creditors - 1`
    pub fn transaction_bound(&self) -> usize {
        (self.debtor_count + self.creditor_count).saturating_sub(1)
    }

    /// Transfer count respects [`transaction_bound`](Self::transaction_bound)
    pub fn within_bound(&self) -> bool {
        self.transactions.len() <= self.transaction_bound()
    }

    /// Each member's balance after every suggested transfer is made
    pub fn residual_balances(&self) -> BTreeMap<MemberId, Decimal> {
        let mut residual = self.balances.clone();
        for tx in &self.transactions {
            *residual.entry(tx.from_user_id.clone()).or_insert(Decimal::ZERO) += tx.amount;
            *residual.entry(tx.to_user_id.clone()).or_insert(Decimal::ZERO) -= tx.amount;
        }
        residual
    }

    /// Every residual balance is within the tolerance
    pub fn is_sound(&self) -> bool {
        self.residual_balances().values().all(|b| is_settled(*b))
    }

    /// Suggested transfer from `from` to `to`, if any
    pub fn find(&self, from: &MemberId, to: &MemberId) -> Option<&SettlementTransaction> {
        self.transactions
            .iter()
            .find(|t| &t.from_user_id == from && &t.to_user_id == to)
    }

    /// Transfers `member` is asked to make
    pub fn owed_by<'a>(
        &'a self,
        member: &'a MemberId,
    ) -> impl Iterator<Item = &'a SettlementTransaction> + 'a {
        self.transactions.iter().filter(move |t| &t.from_user_id == member)
    }

    /// Transfers `member` should receive
    pub fn owed_to<'a>(
        &'a self,
        member: &'a MemberId,
    ) -> impl Iterator<Item = &'a SettlementTransaction> + 'a {
        self.transactions.iter().filter(move |t| &t.to_user_id == member)
    }
}
