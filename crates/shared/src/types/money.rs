//! Monetary rounding with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every balance and amount is a `rust_decimal::Decimal` normalized to
//! [`MONEY_SCALE`] fraction digits before it is compared or persisted.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of fraction digits kept for every monetary value.
pub const MONEY_SCALE: u32 = 2;

/// Largest magnitude a `NUMERIC(19, 2)` column holds:
/// `99_999_999_999_999_999.99`.
pub const MAX_MONEY: Decimal =
    Decimal::from_parts(0x89E7_FFFF, 0x8AC7_2304, 0, false, MONEY_SCALE);

/// Rounds an amount to [`MONEY_SCALE`] fraction digits, half away from zero.
///
/// The result always carries exactly two fraction digits, so `100` becomes
/// `100.00` and serializes the same way it is stored.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

/// Returns true if the amount is zero once rounded to [`MONEY_SCALE`].
#[must_use]
pub fn is_zero_money(amount: Decimal) -> bool {
    round_money(amount).is_zero()
}

/// Returns true if the amount fits the storage column once rounded.
#[must_use]
pub fn is_storable_money(amount: Decimal) -> bool {
    amount.abs() <= MAX_MONEY && round_money(amount).abs() <= MAX_MONEY
}
