//! Wallet balance mutation rule.
//!
//! The database layer locks the wallet row, reads its balance, and asks
//! [`BalanceRule::next_balance`] what to write. Keeping the rule here makes
//! the non-negativity check the same for every caller.

use rust_decimal::Decimal;
use uuid::Uuid;

use kasku_shared::types::{MAX_MONEY, is_storable_money, is_zero_money, round_money};

use super::error::LedgerError;

/// Outcome of applying a delta to a wallet balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceChange {
    /// Delta rounds to zero; nothing is written.
    Unchanged,
    /// Persist this balance.
    Updated(Decimal),
}

/// Pure balance arithmetic.
pub struct BalanceRule;

impl BalanceRule {
    /// Computes the balance after applying `delta` to `current`.
    ///
    /// 1. A delta that rounds to zero at two fraction digits is a no-op.
    /// 2. Otherwise `next = round2(current + delta)`.
    /// 3. A debit leaving `next < 0` is rejected with `InsufficientBalance`.
    /// 4. A result outside the storable range is rejected with `InvalidAmount`.
    ///
    /// Credits never fail the balance check, so a wallet seeded with a
    /// negative balance (card debt) can be paid down in steps.
    pub fn next_balance(
        wallet_id: Uuid,
        current: Decimal,
        delta: Decimal,
    ) -> Result<BalanceChange, LedgerError> {
        if is_zero_money(delta) {
            return Ok(BalanceChange::Unchanged);
        }

        let current = round_money(current);
        let delta = round_money(delta);
        let next = current
            .checked_add(delta)
            .map(round_money)
            .filter(|next| next.abs() <= MAX_MONEY)
            .ok_or_else(|| {
                LedgerError::InvalidAmount(format!(
                    "balance of wallet {wallet_id} would exceed {MAX_MONEY}"
                ))
            })?;

        if next < Decimal::ZERO && delta < Decimal::ZERO {
            return Err(LedgerError::InsufficientBalance {
                wallet_id,
                balance: current,
                delta,
            });
        }

        Ok(BalanceChange::Updated(next))
    }

    /// Validates a strictly positive amount and normalizes it to two digits.
    pub fn positive_amount(amount: Decimal) -> Result<Decimal, LedgerError> {
        Self::storable(amount)?;
        let normalized = round_money(amount);
        if normalized <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(format!(
                "amount must be greater than zero, got {amount}"
            )));
        }
        Ok(normalized)
    }

    /// Validates a non-negative amount (opening balances, remaining debt).
    pub fn non_negative_amount(amount: Decimal) -> Result<Decimal, LedgerError> {
        Self::storable(amount)?;
        let normalized = round_money(amount);
        if normalized < Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(format!(
                "amount must not be negative, got {amount}"
            )));
        }
        Ok(normalized)
    }

    fn storable(amount: Decimal) -> Result<(), LedgerError> {
        if is_storable_money(amount) {
            Ok(())
        } else {
            Err(LedgerError::InvalidAmount(format!(
                "amount must not exceed {MAX_MONEY}, got {amount}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn wallet() -> Uuid {
        Uuid::from_u128(7)
    }

    #[test]
    fn test_credit_and_debit() {
        assert_eq!(
            BalanceRule::next_balance(wallet(), dec!(100.00), dec!(-30.00)),
            Ok(BalanceChange::Updated(dec!(70.00)))
        );
        assert_eq!(
            BalanceRule::next_balance(wallet(), dec!(70.00), dec!(30.00)),
            Ok(BalanceChange::Updated(dec!(100.00)))
        );
    }

    #[test]
    fn test_drain_to_exactly_zero_is_allowed() {
        assert_eq!(
            BalanceRule::next_balance(wallet(), dec!(50.00), dec!(-50.00)),
            Ok(BalanceChange::Updated(dec!(0.00)))
        );
    }

    #[test]
    fn test_zero_delta_is_noop() {
        assert_eq!(
            BalanceRule::next_balance(wallet(), dec!(10.00), dec!(0.004)),
            Ok(BalanceChange::Unchanged)
        );
        // Even a negative seed balance is left alone by a zero delta.
        assert_eq!(
            BalanceRule::next_balance(wallet(), dec!(-500.00), Decimal::ZERO),
            Ok(BalanceChange::Unchanged)
        );
    }

    #[test]
    fn test_overdraw_rejected() {
        let err = BalanceRule::next_balance(wallet(), dec!(125.00), dec!(-500.00)).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientBalance {
                wallet_id: wallet(),
                balance: dec!(125.00),
                delta: dec!(-500.00),
            }
        );
    }

    #[test]
    fn test_negative_seed_accepts_partial_credit() {
        assert_eq!(
            BalanceRule::next_balance(wallet(), dec!(-200.00), dec!(50.00)),
            Ok(BalanceChange::Updated(dec!(-150.00)))
        );
        assert_eq!(
            BalanceRule::next_balance(wallet(), dec!(-200.00), dec!(250.00)),
            Ok(BalanceChange::Updated(dec!(50.00)))
        );
    }

    #[test]
    fn test_negative_seed_rejects_further_debit() {
        let err = BalanceRule::next_balance(wallet(), dec!(-200.00), dec!(-0.01)).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
    }

    #[test]
    fn test_out_of_range_balance_rejected() {
        let err = BalanceRule::next_balance(wallet(), MAX_MONEY, dec!(0.01)).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(_)));
        let err = BalanceRule::next_balance(wallet(), dec!(1.00), Decimal::MAX).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(_)));
    }

    #[test]
    fn test_positive_amount() {
        assert_eq!(BalanceRule::positive_amount(dec!(10.005)), Ok(dec!(10.01)));
        assert!(BalanceRule::positive_amount(dec!(0)).is_err());
        assert!(BalanceRule::positive_amount(dec!(0.001)).is_err());
        assert!(BalanceRule::positive_amount(dec!(-5)).is_err());
        assert_eq!(BalanceRule::positive_amount(MAX_MONEY), Ok(MAX_MONEY));
        assert!(matches!(
            BalanceRule::positive_amount(Decimal::MAX),
            Err(LedgerError::InvalidAmount(_))
        ));
        assert!(BalanceRule::positive_amount(dec!(100000000000000000)).is_err());
    }

    #[test]
    fn test_non_negative_amount() {
        assert_eq!(BalanceRule::non_negative_amount(dec!(0)), Ok(dec!(0.00)));
        assert!(BalanceRule::non_negative_amount(dec!(-0.01)).is_err());
        assert!(BalanceRule::non_negative_amount(Decimal::MAX).is_err());
    }

    fn balance_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn delta_strategy() -> impl Strategy<Value = Decimal> {
        (-10_000_000i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #[test]
        fn prop_result_never_negative(current in balance_strategy(), delta in delta_strategy()) {
            match BalanceRule::next_balance(wallet(), current, delta) {
                Ok(BalanceChange::Updated(next)) => {
                    prop_assert!(next >= Decimal::ZERO);
                    prop_assert_eq!(next, current + delta);
                }
                Ok(BalanceChange::Unchanged) => prop_assert!(delta.is_zero()),
                Err(LedgerError::InsufficientBalance { .. }) => {
                    prop_assert!(current + delta < Decimal::ZERO);
                }
                Err(other) => prop_assert!(false, "unexpected error {other:?}"),
            }
        }

        #[test]
        fn prop_credit_never_fails(current in delta_strategy(), credit in 1i64..10_000_000i64) {
            let credit = Decimal::new(credit, 2);
            prop_assert_eq!(
                BalanceRule::next_balance(wallet(), current, credit),
                Ok(BalanceChange::Updated(current + credit))
            );
        }

        #[test]
        fn prop_result_has_two_fraction_digits(current in balance_strategy(), delta in delta_strategy()) {
            if let Ok(BalanceChange::Updated(next)) = BalanceRule::next_balance(wallet(), current, delta) {
                prop_assert_eq!(next.scale(), 2);
            }
        }
    }
}
