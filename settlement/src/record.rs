//! "Record this payment" action
//!
//! Turns a suggested transfer into the [`RecordedPayment`] that gets appended
//! to the trip's payment log. The caller persists it and recomputes.

use crate::Result;
use chrono::{DateTime, Utc};
use tracing::info;
use tripledger_core::{MemberId, RecordedPayment, SettlementTransaction, Validator};
use uuid::Uuid;

/// Details supplied by the member logging the payment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRequest {
    /// Member logging the payment
    pub recorded_by: MemberId,

    /// Currency code (trimmed and uppercased before validation)
    pub currency: String,

    /// Free-text notes; blank notes are dropped
    pub notes: Option<String>,

    /// Timestamp to stamp; defaults to now
    pub recorded_at: Option<DateTime<Utc>>,
}

impl RecordRequest {
    /// Request stamped with the current time and no notes
    pub fn new(recorded_by: impl Into<MemberId>, currency: impl Into<String>) -> Self {
        Self {
            recorded_by: recorded_by.into(),
            currency: currency.into(),
            notes: None,
            recorded_at: None,
        }
    }

    /// Attach notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Stamp with a fixed timestamp
    pub fn at(mut self, recorded_at: DateTime<Utc>) -> Self {
        self.recorded_at = Some(recorded_at);
        self
    }
}

/// Build the payment for a suggested transfer, validated without membership checks
pub fn record_settlement(
    transaction: &SettlementTransaction,
    request: RecordRequest,
) -> Result<RecordedPayment> {
    record_settlement_with(&Validator::new(), transaction, request)
}

/// Build the payment for a suggested transfer and validate it with `validator`
///
/// The amount is copied exactly; rounding is a display concern.
pub fn record_settlement_with(
    validator: &Validator,
    transaction: &SettlementTransaction,
    request: RecordRequest,
) -> Result<RecordedPayment> {
    let notes = request
        .notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    let payment = RecordedPayment {
        id: Uuid::new_v4().to_string(),
        from_user_id: transaction.from_user_id.clone(),
        to_user_id: transaction.to_user_id.clone(),
        amount: transaction.amount,
        currency: request.currency.trim().to_uppercase(),
        date_recorded: request.recorded_at.unwrap_or_else(Utc::now),
        recorded_by: request.recorded_by,
        notes,
    };

    validator.validate_payment(&payment)?;

    info!(
        payment_id = %payment.id,
        from = %payment.from_user_id,
        to = %payment.to_user_id,
        amount = %payment.amount,
        "Settlement payment recorded"
    );

    Ok(payment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use tripledger_core::{Error as LedgerError, Member};

    fn transaction() -> SettlementTransaction {
        SettlementTransaction {
            from_user_id: MemberId::new("b"),
            from_name: "Bilal".to_string(),
            to_user_id: MemberId::new("a"),
            to_name: "Asha".to_string(),
            amount: dec!(33.333333),
        }
    }

    #[test]
    fn test_record_copies_transfer() {
        let at = Utc.with_ymd_and_hms(2024, 7, 1, 18, 30, 0).unwrap();
        let request = RecordRequest::new("b", " inr ").with_notes("  paid via UPI \n").at(at);
        let payment = record_settlement(&transaction(), request).unwrap();

        assert_eq!(payment.from_user_id, MemberId::new("b"));
        assert_eq!(payment.to_user_id, MemberId::new("a"));
        assert_eq!(payment.amount, dec!(33.333333));
        assert_eq!(payment.currency, "INR");
        assert_eq!(payment.date_recorded, at);
        assert_eq!(payment.notes.as_deref(), Some("paid via UPI"));
        assert!(Uuid::parse_str(&payment.id).is_ok());
    }

    #[test]
    fn test_blank_notes_dropped() {
        let request = RecordRequest::new("a", "EUR").with_notes("   ");
        let payment = record_settlement(&transaction(), request).unwrap();
        assert!(payment.notes.is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        let first = record_settlement(&transaction(), RecordRequest::new("b", "INR")).unwrap();
        let second = record_settlement(&transaction(), RecordRequest::new("b", "INR")).unwrap();
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_invalid_currency_rejected() {
        let err = record_settlement(&transaction(), RecordRequest::new("b", "RUPEES")).unwrap_err();
        assert!(err.is_validation());
        assert!(matches!(
            err,
            crate::Error::Ledger(LedgerError::InvalidCurrency(_))
        ));
    }

    #[test]
    fn test_recorder_must_be_member() {
        let members = vec![Member::new("a", "Asha"), Member::new("b", "Bilal")];
        let validator = Validator::new().with_members(&members);

        let ok = record_settlement_with(&validator, &transaction(), RecordRequest::new("a", "INR"));
        assert!(ok.is_ok());

        let err = record_settlement_with(&validator, &transaction(), RecordRequest::new("z", "INR"))
            .unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Ledger(LedgerError::UnknownMember { .. })
        ));
    }
}
