//! Property-based tests for wallet reconciliation.
//!
//! Runs random create/update/delete sequences against an in-memory wallet
//! table using the same rules the repositories use, and checks:
//! - Balance conservation: each wallet equals its opening balance plus the
//!   signed effect of every transaction still attached to it.
//! - Non-negativity: no accepted operation leaves a wallet below zero.
//! - Update delta correctness: editing A to B on one wallet moves it by B - A.

use std::collections::HashMap;

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use kasku_shared::types::WalletId;

use super::balance::{BalanceChange, BalanceRule};
use super::error::LedgerError;
use super::reconcile::{WalletAdjustment, WalletTransition};
use super::types::TransactionType;

const WALLETS: u128 = 3;

#[derive(Debug, Clone)]
enum Op {
    Create {
        wallet: Option<u128>,
        kind: TransactionType,
        amount: Decimal,
    },
    Update {
        index: usize,
        wallet: Option<u128>,
        kind: TransactionType,
        amount: Decimal,
    },
    Delete {
        index: usize,
    },
}

#[derive(Debug, Clone)]
struct Row {
    wallet: Option<WalletId>,
    kind: TransactionType,
    amount: Decimal,
}

impl Row {
    fn delta(&self) -> Decimal {
        self.kind.signed_delta(self.amount)
    }
}

fn wallet_id(n: u128) -> WalletId {
    WalletId::from_uuid(Uuid::from_u128(n + 1))
}

/// Strategy to generate positive amounts (0.01 to 500.00).
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..50_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate opening balances (0.00 to 1,000.00).
fn opening_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..100_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn kind_strategy() -> impl Strategy<Value = TransactionType> {
    prop_oneof![Just(TransactionType::Income), Just(TransactionType::Expense)]
}

fn wallet_strategy() -> impl Strategy<Value = Option<u128>> {
    prop_oneof![Just(None), (0..WALLETS).prop_map(Some)]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (wallet_strategy(), kind_strategy(), amount_strategy())
            .prop_map(|(wallet, kind, amount)| Op::Create { wallet, kind, amount }),
        (any::<usize>(), wallet_strategy(), kind_strategy(), amount_strategy()).prop_map(
            |(index, wallet, kind, amount)| Op::Update {
                index,
                wallet,
                kind,
                amount
            }
        ),
        any::<usize>().prop_map(|index| Op::Delete { index }),
    ]
}

/// Applies every adjustment or none of them.
fn apply_all(
    balances: &mut HashMap<WalletId, Decimal>,
    plan: &[WalletAdjustment],
) -> Result<(), LedgerError> {
    let mut staged = balances.clone();
    for step in plan {
        let current = staged[&step.wallet_id];
        if let BalanceChange::Updated(next) =
            BalanceRule::next_balance(step.wallet_id.into_inner(), current, step.delta)?
        {
            staged.insert(step.wallet_id, next);
        }
    }
    *balances = staged;
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_balance_conservation(
        openings in prop::collection::vec(opening_strategy(), WALLETS as usize),
        ops in prop::collection::vec(op_strategy(), 1..40),
    ) {
        let mut balances: HashMap<WalletId, Decimal> = openings
            .iter()
            .enumerate()
            .map(|(i, b)| (wallet_id(i as u128), *b))
            .collect();
        let mut rows: Vec<Row> = Vec::new();

        for op in ops {
            match op {
                Op::Create { wallet, kind, amount } => {
                    let row = Row { wallet: wallet.map(wallet_id), kind, amount };
                    let plan = WalletTransition::between(None, row.wallet)
                        .adjustments(Decimal::ZERO, row.delta())
                        .unwrap();
                    if apply_all(&mut balances, &plan).is_ok() {
                        rows.push(row);
                    }
                }
                Op::Update { index, wallet, kind, amount } => {
                    if rows.is_empty() {
                        continue;
                    }
                    let index = index % rows.len();
                    let next = Row { wallet: wallet.map(wallet_id), kind, amount };
                    let plan = WalletTransition::between(rows[index].wallet, next.wallet)
                        .adjustments(rows[index].delta(), next.delta())
                        .unwrap();
                    if apply_all(&mut balances, &plan).is_ok() {
                        rows[index] = next;
                    }
                }
                Op::Delete { index } => {
                    if rows.is_empty() {
                        continue;
                    }
                    let index = index % rows.len();
                    let plan = WalletTransition::between(rows[index].wallet, None)
                        .adjustments(rows[index].delta(), Decimal::ZERO)
                        .unwrap();
                    if apply_all(&mut balances, &plan).is_ok() {
                        rows.remove(index);
                    }
                }
            }

            for balance in balances.values() {
                prop_assert!(*balance >= Decimal::ZERO);
            }
        }

        for (i, opening) in openings.iter().enumerate() {
            let id = wallet_id(i as u128);
            let effect: Decimal = rows
                .iter()
                .filter(|row| row.wallet == Some(id))
                .map(Row::delta)
                .sum();
            prop_assert_eq!(balances[&id], *opening + effect);
        }
    }

    #[test]
    fn prop_update_moves_balance_by_difference(
        kind in kind_strategy(),
        a in amount_strategy(),
        b in amount_strategy(),
    ) {
        let wallet = wallet_id(0);
        let plan = WalletTransition::Same(wallet)
            .adjustments(kind.signed_delta(a), kind.signed_delta(b))
            .unwrap();
        prop_assert_eq!(plan.len(), 1);
        let expected = match kind {
            TransactionType::Income => b - a,
            TransactionType::Expense => a - b,
        };
        prop_assert_eq!(plan[0].delta, expected);
    }

    #[test]
    fn prop_move_preserves_total(
        from in 0..WALLETS,
        to in 0..WALLETS,
        kind in kind_strategy(),
        a in amount_strategy(),
        b in amount_strategy(),
    ) {
        let transition = WalletTransition::between(Some(wallet_id(from)), Some(wallet_id(to)));
        let plan = transition
            .adjustments(kind.signed_delta(a), kind.signed_delta(b))
            .unwrap();
        let net: Decimal = plan.iter().map(|step| step.delta).sum();
        prop_assert_eq!(net, kind.signed_delta(b) - kind.signed_delta(a));
        prop_assert!(plan.windows(2).all(|w| w[0].wallet_id < w[1].wallet_id));
    }
}
