//! Expense totals for reports

use crate::types::{Expense, MemberId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Aggregate view of a trip's expenses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSummary {
    /// Number of expenses
    pub expense_count: usize,

    /// Sum of all expense amounts
    pub total_spent: Decimal,

    /// Spend per category (uncategorized expenses under "Uncategorized")
    pub by_category: BTreeMap<String, Decimal>,

    /// Amount paid per payer, including payers who left the trip
    pub by_payer: BTreeMap<MemberId, Decimal>,

    /// Currency codes seen
    pub currencies: BTreeSet<String>,
}

impl ExpenseSummary {
    /// Summarize a list of expenses
    pub fn from_expenses(expenses: &[Expense]) -> Self {
        let mut summary = Self::default();

        for expense in expenses {
            summary.expense_count += 1;
            summary.total_spent += expense.amount;

            let category = if expense.category.trim().is_empty() {
                "Uncategorized".to_string()
            } else {
                expense.category.clone()
            };
            *summary.by_category.entry(category).or_insert(Decimal::ZERO) += expense.amount;
            *summary
                .by_payer
                .entry(expense.paid_by.clone())
                .or_insert(Decimal::ZERO) += expense.amount;

            if !expense.currency.is_empty() {
                summary.currencies.insert(expense.currency.clone());
            }
        }

        summary
    }

    /// Expenses span more than one currency (amounts are not converted)
    pub fn is_mixed_currency(&self) -> bool {
        self.currencies.len() > 1
    }

    /// Categories by spend, largest first (ties by name)
    pub fn categories_by_amount(&self) -> Vec<(&str, Decimal)> {
        let mut categories: Vec<(&str, Decimal)> = self
            .by_category
            .iter()
            .map(|(name, amount)| (name.as_str(), *amount))
            .collect();
        categories.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        categories
    }

    /// Category with the highest spend
    pub fn top_category(&self) -> Option<(&str, Decimal)> {
        self.categories_by_amount().into_iter().next()
    }
}
