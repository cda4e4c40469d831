//! Write-path validation for expenses and recorded payments
//!
//! Runs before a record is persisted. The aggregator never calls into this
//! module; it tolerates whatever the store returns.
//!
//! - Amount positivity
//! - Participant presence and membership
//! - Unequal split completeness and sum (within tolerance)
//! - Currency code format and base-currency match

use crate::{
    tolerance::approx_eq,
    types::{Expense, ExpenseRecord, Member, MemberId, RecordedPayment, Split, SplitKind},
    Error, Result,
};
use rust_decimal::Decimal;
use std::collections::BTreeSet;

/// Validator for records about to be written
#[derive(Debug, Clone, Default)]
pub struct Validator {
    /// Required currency for every record
    base_currency: Option<String>,
    /// Known trip members (membership is not checked when `None`)
    members: Option<BTreeSet<MemberId>>,
}

impl Validator {
    /// Validator with no currency or membership constraints
    pub fn new() -> Self {
        Self::default()
    }

    /// Require every record to use this currency
    pub fn with_base_currency(mut self, currency: impl Into<String>) -> Self {
        self.base_currency = Some(currency.into());
        self
    }

    /// Require referenced members to belong to the trip
    pub fn with_members(mut self, members: &[Member]) -> Self {
        self.members = Some(members.iter().map(|m| m.id.clone()).collect());
        self
    }

    /// Validate an expense record and resolve its split
    pub fn validate_expense(&self, record: ExpenseRecord) -> Result<Expense> {
        if record.amount <= Decimal::ZERO {
            return Err(Error::NonPositiveAmount {
                record_id: record.id,
                amount: record.amount,
            });
        }

        if record.participants.is_empty() {
            return Err(Error::EmptyParticipants {
                expense_id: record.id,
            });
        }

        self.check_currency(&record.id, &record.currency)?;
        self.check_member(&record.id, &record.paid_by)?;
        for participant in &record.participants {
            self.check_member(&record.id, participant)?;
        }

        if record.split_type == SplitKind::Unequal {
            let details = match &record.split_details {
                Some(details) if !details.is_empty() => details,
                _ => {
                    return Err(Error::MissingSplitDetails {
                        expense_id: record.id,
                    })
                }
            };

            let mut total = Decimal::ZERO;
            for participant in &record.participants {
                let share = match details.get(participant) {
                    Some(share) => *share,
                    None => {
                        return Err(Error::MissingShare {
                            expense_id: record.id.clone(),
                            member_id: participant.to_string(),
                        })
                    }
                };
                if share < Decimal::ZERO {
                    return Err(Error::NegativeShare {
                        expense_id: record.id.clone(),
                        member_id: participant.to_string(),
                        share,
                    });
                }
                total += share;
            }

            if !approx_eq(total, record.amount) {
                return Err(Error::ShareSumMismatch {
                    expense_id: record.id,
                    expected: record.amount,
                    actual: total,
                });
            }
        }

        let mut expense = Expense::from(record);
        // Shares for non-participants carry no meaning once validated.
        if let Split::Unequal(details) = &mut expense.split {
            let participants = &expense.participants;
            details.retain(|member, _| participants.contains(member));
        }
        Ok(expense)
    }

    /// Validate a recorded payment
    pub fn validate_payment(&self, payment: &RecordedPayment) -> Result<()> {
        if payment.amount <= Decimal::ZERO {
            return Err(Error::NonPositiveAmount {
                record_id: payment.id.clone(),
                amount: payment.amount,
            });
        }

        if payment.from_user_id == payment.to_user_id {
            return Err(Error::SelfPayment {
                payment_id: payment.id.clone(),
            });
        }

        self.check_currency(&payment.id, &payment.currency)?;
        self.check_member(&payment.id, &payment.from_user_id)?;
        self.check_member(&payment.id, &payment.to_user_id)?;
        self.check_member(&payment.id, &payment.recorded_by)?;

        Ok(())
    }

    fn check_currency(&self, record_id: &str, currency: &str) -> Result<()> {
        validate_currency(currency)?;

        if let Some(base) = &self.base_currency {
            if base != currency {
                return Err(Error::CurrencyMismatch {
                    record_id: record_id.to_string(),
                    expected: base.clone(),
                    actual: currency.to_string(),
                });
            }
        }

        Ok(())
    }

    fn check_member(&self, record_id: &str, member: &MemberId) -> Result<()> {
        match &self.members {
            Some(members) if !members.contains(member) => Err(Error::UnknownMember {
                record_id: record_id.to_string(),
                member_id: member.to_string(),
            }),
            _ => Ok(()),
        }
    }
}

/// Currency must be a three-letter uppercase ISO 4217 code
pub fn validate_currency(currency: &str) -> Result<()> {
    if currency.len() == 3 && currency.bytes().all(|b| b.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(Error::InvalidCurrency(currency.to_string()))
    }
}

/// Validate an expense with the unconstrained validator
pub fn validate_expense(record: ExpenseRecord) -> Result<Expense> {
    Validator::new().validate_expense(record)
}

/// Validate a payment with the unconstrained validator
pub fn validate_payment(payment: &RecordedPayment) -> Result<()> {
    Validator::new().validate_payment(payment)
}
