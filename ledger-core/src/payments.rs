//! Recorded-payment log queries
//!
//! The log is append-only; these helpers only produce ordered, filtered
//! views of it for display.

use crate::types::{member_label, Member, MemberId, RecordedPayment};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Ordering for the payment log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentOrder {
    /// Newest first
    #[default]
    DateDesc,
    /// Oldest first
    DateAsc,
    /// Largest first
    AmountDesc,
    /// Smallest first
    AmountAsc,
}

impl PaymentOrder {
    /// Wire/CLI name
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentOrder::DateDesc => "date-desc",
            PaymentOrder::DateAsc => "date-asc",
            PaymentOrder::AmountDesc => "amount-desc",
            PaymentOrder::AmountAsc => "amount-asc",
        }
    }
}

impl fmt::Display for PaymentOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date-desc" => Ok(PaymentOrder::DateDesc),
            "date-asc" => Ok(PaymentOrder::DateAsc),
            "amount-desc" => Ok(PaymentOrder::AmountDesc),
            "amount-asc" => Ok(PaymentOrder::AmountAsc),
            other => Err(format!("unknown payment order: {other}")),
        }
    }
}

/// Filtered, ordered view over the payment log
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentQuery {
    /// Sort order
    pub order: PaymentOrder,
    /// Only payments logged by this member
    pub recorded_by: Option<MemberId>,
}

impl PaymentQuery {
    /// Query with the given order and no filter
    pub fn new(order: PaymentOrder) -> Self {
        Self {
            order,
            recorded_by: None,
        }
    }

    /// Restrict to payments logged by `member`
    pub fn recorded_by(mut self, member: impl Into<MemberId>) -> Self {
        self.recorded_by = Some(member.into());
        self
    }

    /// Apply the query; ties keep log order
    pub fn apply<'a>(&self, payments: &'a [RecordedPayment]) -> Vec<&'a RecordedPayment> {
        let mut view: Vec<&RecordedPayment> = payments
            .iter()
            .filter(|p| match &self.recorded_by {
                Some(recorder) => &p.recorded_by == recorder,
                None => true,
            })
            .collect();

        match self.order {
            PaymentOrder::DateDesc => view.sort_by(|a, b| b.date_recorded.cmp(&a.date_recorded)),
            PaymentOrder::DateAsc => view.sort_by(|a, b| a.date_recorded.cmp(&b.date_recorded)),
            PaymentOrder::AmountDesc => view.sort_by(|a, b| b.amount.cmp(&a.amount)),
            PaymentOrder::AmountAsc => view.sort_by(|a, b| a.amount.cmp(&b.amount)),
        }

        view
    }
}

/// Distinct members who logged payments, in first-seen order, with labels
pub fn recorders(payments: &[RecordedPayment], members: &[Member]) -> Vec<(MemberId, String)> {
    let mut seen = HashSet::new();
    payments
        .iter()
        .filter(|p| seen.insert(&p.recorded_by))
        .map(|p| (p.recorded_by.clone(), member_label(members, &p.recorded_by)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn payment(id: &str, amount: Decimal, day: u32, recorder: &str) -> RecordedPayment {
        RecordedPayment {
            id: id.to_string(),
            from_user_id: MemberId::new("b"),
            to_user_id: MemberId::new("a"),
            amount,
            currency: "INR".to_string(),
            date_recorded: Utc.with_ymd_and_hms(2024, 6, day, 9, 0, 0).unwrap(),
            recorded_by: MemberId::new(recorder),
            notes: None,
        }
    }

    fn log() -> Vec<RecordedPayment> {
        vec![
            payment("p1", dec!(20), 2, "b"),
            payment("p2", dec!(50), 1, "a"),
            payment("p3", dec!(20), 3, "b"),
        ]
    }

    fn ids(view: &[&RecordedPayment]) -> Vec<String> {
        view.iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn test_default_order_is_newest_first() {
        let log = log();
        let view = PaymentQuery::default().apply(&log);
        assert_eq!(ids(&view), vec!["p3", "p1", "p2"]);
    }

    #[test]
    fn test_orders() {
        let log = log();
        assert_eq!(ids(&PaymentQuery::new(PaymentOrder::DateAsc).apply(&log)), vec!["p2", "p1", "p3"]);
        assert_eq!(ids(&PaymentQuery::new(PaymentOrder::AmountDesc).apply(&log)), vec!["p2", "p1", "p3"]);
        assert_eq!(ids(&PaymentQuery::new(PaymentOrder::AmountAsc).apply(&log)), vec!["p1", "p3", "p2"]);
    }

    #[test]
    fn test_filter_by_recorder() {
        let log = log();
        let view = PaymentQuery::new(PaymentOrder::DateAsc).recorded_by("b").apply(&log);
        assert_eq!(ids(&view), vec!["p1", "p3"]);
    }

    #[test]
    fn test_parse_order() {
        assert_eq!("amount-asc".parse::<PaymentOrder>(), Ok(PaymentOrder::AmountAsc));
        assert!("newest".parse::<PaymentOrder>().is_err());
        assert_eq!(PaymentOrder::DateDesc.to_string(), "date-desc");
    }

    #[test]
    fn test_recorders_first_seen() {
        let members = vec![Member::new("a", "Asha"), Member::new("b", "Bilal")];
        let found = recorders(&log(), &members);
        assert_eq!(
            found,
            vec![
                (MemberId::new("b"), "Bilal".to_string()),
                (MemberId::new("a"), "Asha".to_string()),
            ]
        );
    }
}
