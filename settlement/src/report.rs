//! Settlement report
//!
//! Runs the whole pipeline for one snapshot (aggregate, settle, summarize)
//! and renders it for people. Amounts stay exact in the report value;
//! only [`SettlementReport::render_text`] rounds.

use crate::{types::SettlementPlan, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use tripledger_core::{ExpenseSummary, MemberFinancials, TripSnapshot};

/// Financials, suggested transfers and expense totals for one snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementReport {
    /// One row per member, largest balance first
    pub financials: Vec<MemberFinancials>,

    /// Suggested transfers
    pub plan: SettlementPlan,

    /// Expense totals
    pub summary: ExpenseSummary,
}

impl SettlementReport {
    /// Build the report from a snapshot
    pub fn build(snapshot: &TripSnapshot) -> Self {
        let expenses = snapshot.resolved_expenses();
        let financials =
            tripledger_core::aggregate(&snapshot.members, &expenses, &snapshot.payments);
        let plan = SettlementPlan::compute(&financials);
        let summary = ExpenseSummary::from_expenses(&expenses);

        debug!(
            members = financials.len(),
            transactions = plan.transactions.len(),
            total_spent = %summary.total_spent,
            "Settlement report built"
        );

        Self {
            financials,
            plan,
            summary,
        }
    }

    /// Human-readable report
    ///
    /// Amounts are rounded half away from zero to `decimal_places`.
    /// `currency` is appended to amounts when given.
    pub fn render_text(&self, decimal_places: u32, currency: Option<&str>) -> String {
        self.text(decimal_places, currency).to_string()
    }

    /// [`Display`](fmt::Display) adapter behind [`render_text`](Self::render_text)
    pub fn text<'a>(&'a self, decimal_places: u32, currency: Option<&'a str>) -> TextReport<'a> {
        TextReport {
            report: self,
            decimal_places,
            currency,
        }
    }
}

/// Text rendering of a [`SettlementReport`]
#[derive(Debug, Clone, Copy)]
pub struct TextReport<'a> {
    report: &'a SettlementReport,
    decimal_places: u32,
    currency: Option<&'a str>,
}

impl TextReport<'_> {
    fn amount(&self, amount: Decimal) -> String {
        format_amount(amount, self.decimal_places, self.currency)
    }
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        let categories = report.summary.categories_by_amount();
        let width = report
            .financials
            .iter()
            .map(|row| row.member_name.chars().count())
            .chain(categories.iter().map(|(name, _)| name.chars().count()))
            .max()
            .unwrap_or(0)
            .max(6);

        writeln!(f, "Balances")?;
        if report.financials.is_empty() {
            writeln!(f, "  (no members)")?;
        }
        for row in &report.financials {
            writeln!(
                f,
                "  {:<width$}  paid {}  share {}  net {}",
                row.member_name,
                self.amount(row.total_paid),
                self.amount(row.total_share),
                format_signed(row.net_balance, self.decimal_places, self.currency),
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Suggested transfers")?;
        if report.plan.is_empty() {
            writeln!(f, "  Everyone is settled up")?;
        }
        for tx in &report.plan.transactions {
            writeln!(f, "  {} -> {}: {}", tx.from_name, tx.to_name, self.amount(tx.amount))?;
        }

        writeln!(f)?;
        writeln!(
            f,
            "Expenses: {} totalling {}",
            report.summary.expense_count,
            self.amount(report.summary.total_spent)
        )?;
        for (category, amount) in categories {
            writeln!(f, "  {:<width$}  {}", category, self.amount(amount))?;
        }
        if report.summary.is_mixed_currency() {
            let currencies: Vec<&str> = report.summary.currencies.iter().map(String::as_str).collect();
            writeln!(
                f,
                "  Note: expenses use several currencies ({}); amounts are not converted",
                currencies.join(", ")
            )?;
        }

        Ok(())
    }
}

/// Serialize any report value to JSON
pub fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

/// Round for display, dropping the sign of a rounded zero
fn round_display(amount: Decimal, decimal_places: u32) -> Decimal {
    let rounded = amount.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        Decimal::ZERO
    } else {
        rounded
    }
}

/// Amount with a fixed number of decimals and optional currency suffix
pub fn format_amount(amount: Decimal, decimal_places: u32, currency: Option<&str>) -> String {
    let dp = decimal_places as usize;
    let rounded = round_display(amount, decimal_places);
    match currency {
        Some(code) => format!("{rounded:.dp$} {code}"),
        None => format!("{rounded:.dp$}"),
    }
}

fn format_signed(amount: Decimal, decimal_places: u32, currency: Option<&str>) -> String {
    let text = format_amount(amount, decimal_places, currency);
    if round_display(amount, decimal_places) > Decimal::ZERO {
        format!("+{text}")
    } else {
        text
    }
}
