//! Property-based tests for transfers.
//!
//! - Transfer atomicity: a successful transfer moves exactly the amount.
//! - Transfer all-or-nothing: a rejected transfer changes nothing.
//! - A target carrying debt is always credited.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use kasku_shared::types::WalletId;

use super::balance::{BalanceChange, BalanceRule};
use super::error::LedgerError;
use super::transfer::TransferPlan;

fn balance_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Runs a transfer the way the repository does: check coverage on the
/// locked source, then push both deltas through the balance rule.
fn run(
    plan: &TransferPlan,
    source: Decimal,
    target: Decimal,
) -> Result<(Decimal, Decimal), LedgerError> {
    plan.ensure_covered(source)?;
    let [debit, credit] = plan.adjustments();
    let next = |current: Decimal, delta: Decimal, id: WalletId| -> Result<Decimal, LedgerError> {
        match BalanceRule::next_balance(id.into_inner(), current, delta)? {
            BalanceChange::Updated(next) => Ok(next),
            BalanceChange::Unchanged => Ok(current),
        }
    };
    Ok((
        next(source, debit.delta, debit.wallet_id)?,
        next(target, credit.delta, credit.wallet_id)?,
    ))
}

proptest! {
    #[test]
    fn prop_transfer_conserves_money(
        source in balance_strategy(),
        target in balance_strategy(),
        amount in amount_strategy(),
    ) {
        let plan = TransferPlan::new(
            WalletId::from_uuid(Uuid::from_u128(1)),
            WalletId::from_uuid(Uuid::from_u128(2)),
            amount,
        ).unwrap();

        match run(&plan, source, target) {
            Ok((next_source, next_target)) => {
                prop_assert!(source >= amount);
                prop_assert_eq!(next_source, source - amount);
                prop_assert_eq!(next_target, target + amount);
                prop_assert_eq!(next_source + next_target, source + target);
            }
            Err(err) => {
                prop_assert!(source < amount);
                let is_insufficient = matches!(err, LedgerError::InsufficientBalance { .. });
                prop_assert!(is_insufficient);
            }
        }
    }

    #[test]
    fn prop_transfer_pays_down_debt(
        amount in amount_strategy(),
        debt in amount_strategy(),
    ) {
        let plan = TransferPlan::new(
            WalletId::from_uuid(Uuid::from_u128(1)),
            WalletId::from_uuid(Uuid::from_u128(2)),
            amount,
        ).unwrap();

        let (next_source, next_target) = run(&plan, amount, -debt).unwrap();
        prop_assert!(next_source.is_zero());
        prop_assert_eq!(next_target, amount - debt);
    }

    #[test]
    fn prop_same_wallet_always_rejected(n in 0u128..1000, amount in amount_strategy()) {
        let id = WalletId::from_uuid(Uuid::from_u128(n));
        prop_assert_eq!(TransferPlan::new(id, id, amount), Err(LedgerError::InvalidTransfer));
    }
}
