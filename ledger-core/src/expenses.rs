//! Expense list queries
//!
//! Filtered, ordered views of a trip's expenses for display. Undated
//! expenses sort after dated ones in both date orders.

use crate::types::{Expense, MemberId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Ordering for the expense list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExpenseOrder {
    /// Newest first
    #[default]
    DateDesc,
    /// Oldest first
    DateAsc,
    /// Largest first
    AmountDesc,
    /// Smallest first
    AmountAsc,
    /// Description A to Z
    DescriptionAsc,
    /// Description Z to A
    DescriptionDesc,
}

impl ExpenseOrder {
    /// Wire/CLI name
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseOrder::DateDesc => "date-desc",
            ExpenseOrder::DateAsc => "date-asc",
            ExpenseOrder::AmountDesc => "amount-desc",
            ExpenseOrder::AmountAsc => "amount-asc",
            ExpenseOrder::DescriptionAsc => "description-asc",
            ExpenseOrder::DescriptionDesc => "description-desc",
        }
    }
}

impl fmt::Display for ExpenseOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpenseOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date-desc" => Ok(ExpenseOrder::DateDesc),
            "date-asc" => Ok(ExpenseOrder::DateAsc),
            "amount-desc" => Ok(ExpenseOrder::AmountDesc),
            "amount-asc" => Ok(ExpenseOrder::AmountAsc),
            "description-asc" => Ok(ExpenseOrder::DescriptionAsc),
            "description-desc" => Ok(ExpenseOrder::DescriptionDesc),
            other => Err(format!("unknown expense order: {other}")),
        }
    }
}

/// Filtered, ordered view over the expense list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseQuery {
    /// Sort order
    pub order: ExpenseOrder,
    /// Only expenses in this category (exact match)
    pub category: Option<String>,
    /// Only expenses paid by this member
    pub paid_by: Option<MemberId>,
}

impl ExpenseQuery {
    /// Query with the given order and no filters
    pub fn new(order: ExpenseOrder) -> Self {
        Self {
            order,
            ..Self::default()
        }
    }

    /// Restrict to one category
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Restrict to expenses paid by `member`
    pub fn paid_by(mut self, member: impl Into<MemberId>) -> Self {
        self.paid_by = Some(member.into());
        self
    }

    /// Apply the query; ties keep list order
    pub fn apply<'a>(&self, expenses: &'a [Expense]) -> Vec<&'a Expense> {
        let mut view: Vec<&Expense> = expenses
            .iter()
            .filter(|e| self.category.as_ref().map_or(true, |c| &e.category == c))
            .filter(|e| self.paid_by.as_ref().map_or(true, |p| &e.paid_by == p))
            .collect();

        match self.order {
            ExpenseOrder::DateDesc => view.sort_by(|a, b| by_date(a, b, true)),
            ExpenseOrder::DateAsc => view.sort_by(|a, b| by_date(a, b, false)),
            ExpenseOrder::AmountDesc => view.sort_by(|a, b| b.amount.cmp(&a.amount)),
            ExpenseOrder::AmountAsc => view.sort_by(|a, b| a.amount.cmp(&b.amount)),
            ExpenseOrder::DescriptionAsc => view.sort_by(|a, b| by_description(a, b)),
            ExpenseOrder::DescriptionDesc => view.sort_by(|a, b| by_description(b, a)),
        }

        view
    }
}

fn by_date(a: &Expense, b: &Expense, newest_first: bool) -> Ordering {
    match (a.date, b.date) {
        (Some(x), Some(y)) if newest_first => y.cmp(&x),
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// Case-insensitive first, so "apple" sorts next to "Apple"
fn by_description(a: &Expense, b: &Expense) -> Ordering {
    a.description
        .to_lowercase()
        .cmp(&b.description.to_lowercase())
        .then_with(|| a.description.cmp(&b.description))
}
