//! Shared numeric tolerance
//!
//! Validation, aggregation and settlement must agree on what "zero" means,
//! so every comparison against the tolerance goes through this module.

use rust_decimal::Decimal;

/// Half of a minor currency unit (0.005).
///
/// Balances within this distance of zero count as settled; unequal split
/// shares must sum to the expense amount within it. Changing the value
/// changes settlement output, so it is a constant and not a runtime option.
pub const SETTLEMENT_TOLERANCE: Decimal = Decimal::from_parts(5, 0, 0, false, 3);

/// `|amount| <= ε`
pub fn is_settled(amount: Decimal) -> bool {
    amount.abs() <= SETTLEMENT_TOLERANCE
}

/// `amount < -ε` (member owes money)
pub fn is_debit(amount: Decimal) -> bool {
    amount < -SETTLEMENT_TOLERANCE
}

/// `amount > ε` (member is owed money)
pub fn is_credit(amount: Decimal) -> bool {
    amount > SETTLEMENT_TOLERANCE
}

/// `|a - b| <= ε`
pub fn approx_eq(a: Decimal, b: Decimal) -> bool {
    is_settled(a - b)
}
