//! End-to-end: snapshot JSON → report → record → recompute

use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;
use tripledger_core::{MemberId, TripSnapshot, Validator};
use tripledger_settlement::{record_settlement_with, RecordRequest, SettlementReport};

const SNAPSHOT: &str = r#"{
    "members": [
        {"id": "uid-asha", "displayName": "Asha", "email": "asha@example.com"},
        {"id": "uid-bilal", "displayName": "Bilal"},
        {"id": "uid-chen", "displayName": ""}
    ],
    "expenses": [
        {
            "id": "exp-1",
            "description": "Houseboat dinner",
            "amount": "90.00",
            "currency": "INR",
            "paidBy": "uid-asha",
            "category": "Food",
            "participants": ["uid-asha", "uid-bilal", "uid-chen"],
            "splitType": "equal",
            "date": "2024-03-02T19:30:00Z"
        }
    ],
    "recordedPayments": []
}"#;

fn id(s: &str) -> MemberId {
    MemberId::new(s)
}

#[test]
fn test_payment_cancels_suggested_transfer() {
    let mut snapshot = TripSnapshot::from_json(SNAPSHOT).unwrap();

    // Initial balances A:+60, B:-30, C:-30
    let report = SettlementReport::build(&snapshot);
    let balances: Vec<_> = report
        .financials
        .iter()
        .map(|f| (f.member_id.as_str(), f.net_balance))
        .collect();
    assert_eq!(
        balances,
        vec![
            ("uid-asha", dec!(60)),
            ("uid-bilal", dec!(-30)),
            ("uid-chen", dec!(-30)),
        ]
    );

    let suggested: Vec<_> = report
        .plan
        .transactions
        .iter()
        .map(|t| (t.from_user_id.as_str(), t.to_user_id.as_str(), t.amount))
        .collect();
    assert_eq!(
        suggested,
        vec![
            ("uid-bilal", "uid-asha", dec!(30)),
            ("uid-chen", "uid-asha", dec!(30)),
        ]
    );
    // Chen has no display name
    assert_eq!(report.plan.transactions[1].from_name, "uid-ch...");

    // Bilal records paying Asha
    let transaction = report.plan.find(&id("uid-bilal"), &id("uid-asha")).unwrap();
    let validator = Validator::new().with_members(&snapshot.members);
    let request = RecordRequest::new("uid-bilal", "INR")
        .with_notes("cash")
        .at(Utc.with_ymd_and_hms(2024, 3, 3, 8, 0, 0).unwrap());
    let payment = record_settlement_with(&validator, transaction, request).unwrap();
    snapshot.payments.push(payment);

    // Recompute: only Chen → Asha remains
    let report = SettlementReport::build(&snapshot);
    let suggested: Vec<_> = report
        .plan
        .transactions
        .iter()
        .map(|t| (t.from_user_id.as_str(), t.to_user_id.as_str(), t.amount))
        .collect();
    assert_eq!(suggested, vec![("uid-chen", "uid-asha", dec!(30))]);

    let asha = &report.financials[0];
    assert_eq!(asha.member_id, id("uid-asha"));
    assert_eq!(asha.initial_net_balance, dec!(60));
    assert_eq!(asha.net_balance, dec!(30));
}

#[test]
fn test_snapshot_round_trips_through_json() {
    let snapshot = TripSnapshot::from_json(SNAPSHOT).unwrap();
    let json = snapshot.to_json().unwrap();
    let reparsed = TripSnapshot::from_json(&json).unwrap();
    assert_eq!(snapshot, reparsed);
    assert_eq!(
        SettlementReport::build(&snapshot),
        SettlementReport::build(&reparsed)
    );
}

#[test]
fn test_partial_payment_reduces_transfer() {
    let mut snapshot = TripSnapshot::from_json(SNAPSHOT).unwrap();
    let report = SettlementReport::build(&snapshot);
    let mut transaction = report
        .plan
        .find(&id("uid-chen"), &id("uid-asha"))
        .unwrap()
        .clone();
    transaction.amount = dec!(12.50);

    let payment =
        tripledger_settlement::record_settlement(&transaction, RecordRequest::new("uid-asha", "INR"))
            .unwrap();
    snapshot.payments.push(payment);

    let report = SettlementReport::build(&snapshot);
    let remaining = report.plan.find(&id("uid-chen"), &id("uid-asha")).unwrap();
    assert_eq!(remaining.amount, dec!(17.50));
    assert!(report.plan.is_sound());
}

#[test]
fn test_departed_payer_does_not_break_report() {
    let json = r#"{
        "members": [{"id": "a", "displayName": "Asha"}, {"id": "b", "displayName": "Bilal"}],
        "expenses": [
            {"id": "e1", "amount": 40, "currency": "INR", "paidBy": "gone",
             "participants": ["a", "b"], "splitType": "equal"},
            {"id": "e2", "amount": 20, "currency": "INR", "paidBy": "a",
             "participants": ["a", "b"], "splitType": "equal"}
        ]
    }"#;
    let snapshot = TripSnapshot::from_json(json).unwrap();
    let report = SettlementReport::build(&snapshot);

    assert_eq!(report.financials.len(), 2);
    assert_eq!(report.summary.total_spent, dec!(60));
    assert!(report.plan.within_bound());
}
