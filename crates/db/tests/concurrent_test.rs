//! Concurrent access tests for the balance mutator.
//!
//! These tests verify that:
//! - Concurrent expenses on one wallet never overdraw it
//! - Opposite transfers between the same pair of wallets do not deadlock
//! - Total money across wallets is conserved under concurrent transfers
//! - Deleting a wallet while its transactions are edited never fails

#![allow(clippy::cast_possible_wrap)]

mod common;

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::Barrier;

use common::Household;
use kasku_core::ledger::{LedgerError, TransactionType};
use kasku_db::repositories::{
    ActivityRepository, CreateTransactionInput, TransactionFilter, TransactionRepository,
    TransferInput, TransferRepository, UpdateTransactionInput, WalletRepository,
};
use kasku_shared::types::PageRequest;

#[tokio::test]
async fn test_concurrent_expenses_never_overdraw() {
    let Some(home) = Household::setup().await else {
        return;
    };
    let wallet = home.wallet("Shared", dec!(100.00)).await;
    let repo = Arc::new(TransactionRepository::new(home.db.clone()));

    const TASKS: usize = 25;
    let amount = dec!(10.00);
    let barrier = Arc::new(Barrier::new(TASKS));

    let handles = (0..TASKS).map(|i| {
        let repo = Arc::clone(&repo);
        let barrier = Arc::clone(&barrier);
        let account_id = home.account_id;
        tokio::spawn(async move {
            barrier.wait().await;
            repo.create(
                account_id,
                None,
                CreateTransactionInput {
                    transaction_type: TransactionType::Expense,
                    title: format!("Concurrent {i}"),
                    category: "Test".into(),
                    amount,
                    occurred_at: Utc::now(),
                    wallet_id: Some(wallet),
                    member_id: None,
                    description: None,
                },
            )
            .await
        })
    });

    let mut successes = 0i64;
    for result in join_all(handles).await {
        match result.expect("task panicked") {
            Ok(_) => successes += 1,
            Err(err) => assert!(
                matches!(err.as_ledger(), Some(LedgerError::InsufficientBalance { .. })),
                "unexpected error: {err}"
            ),
        }
    }

    assert_eq!(successes, 10);
    assert_eq!(home.balance(wallet).await, dec!(0.00));

    let page = repo
        .list(home.account_id, TransactionFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.meta.total, 10);

    let activity = ActivityRepository::new(home.db.clone());
    for transaction in &page.data {
        assert_eq!(
            activity
                .count_for(home.account_id, transaction.transaction.id)
                .await
                .unwrap(),
            1
        );
    }
}

#[tokio::test]
async fn test_opposite_transfers_conserve_total() {
    let Some(home) = Household::setup().await else {
        return;
    };
    let a = home.wallet("A", dec!(500.00)).await;
    let b = home.wallet("B", dec!(500.00)).await;
    let repo = Arc::new(TransferRepository::new(home.db.clone()));

    const TASKS: usize = 40;
    let barrier = Arc::new(Barrier::new(TASKS));

    let handles = (0..TASKS).map(|i| {
        let repo = Arc::clone(&repo);
        let barrier = Arc::clone(&barrier);
        let account_id = home.account_id;
        let (source, target) = if i % 2 == 0 { (a, b) } else { (b, a) };
        tokio::spawn(async move {
            barrier.wait().await;
            repo.transfer(
                account_id,
                None,
                TransferInput {
                    source_wallet_id: source,
                    target_wallet_id: target,
                    amount: Decimal::new(1000 + i as i64, 2),
                    note: None,
                    occurred_at: None,
                    member_id: None,
                },
            )
            .await
        })
    });

    for result in join_all(handles).await {
        result.expect("task panicked").expect("transfer failed");
    }

    let total = home.balance(a).await + home.balance(b).await;
    assert_eq!(total, dec!(1000.00));
    assert!(home.balance(a).await >= Decimal::ZERO);
    assert!(home.balance(b).await >= Decimal::ZERO);
}

#[tokio::test]
async fn test_wallet_delete_races_transaction_edits() {
    let Some(home) = Household::setup().await else {
        return;
    };
    let wallet = home.wallet("Closing", dec!(1000.00)).await;
    let transactions = Arc::new(TransactionRepository::new(home.db.clone()));
    let wallets = Arc::new(WalletRepository::new(home.db.clone()));

    const EDITS: usize = 12;
    let mut ids = Vec::with_capacity(EDITS);
    for i in 0..EDITS {
        let created = transactions
            .create(
                home.account_id,
                None,
                CreateTransactionInput {
                    transaction_type: TransactionType::Expense,
                    title: format!("Bill {i}"),
                    category: "Utilities".into(),
                    amount: dec!(10.00),
                    occurred_at: Utc::now(),
                    wallet_id: Some(wallet),
                    member_id: None,
                    description: None,
                },
            )
            .await
            .unwrap();
        ids.push(created.transaction.id);
    }

    let barrier = Arc::new(Barrier::new(EDITS + 1));
    let account_id = home.account_id;

    let delete = {
        let wallets = Arc::clone(&wallets);
        let barrier = Arc::clone(&barrier);
        tokio::spawn(async move {
            barrier.wait().await;
            wallets.delete(account_id, wallet).await
        })
    };
    let edits = ids.iter().map(|&id| {
        let transactions = Arc::clone(&transactions);
        let barrier = Arc::clone(&barrier);
        tokio::spawn(async move {
            barrier.wait().await;
            transactions
                .update(
                    account_id,
                    id,
                    None,
                    UpdateTransactionInput {
                        amount: Some(dec!(20.00)),
                        ..UpdateTransactionInput::default()
                    },
                )
                .await
        })
    });

    let edited = join_all(edits).await;
    delete.await.expect("task panicked").expect("wallet delete failed");
    for result in edited {
        result.expect("task panicked").expect("transaction update failed");
    }

    let err = wallets.get(account_id, wallet).await.unwrap_err();
    assert!(matches!(err.as_ledger(), Some(LedgerError::WalletNotFound(_))));
    for id in ids {
        let row = transactions.get(account_id, id).await.unwrap();
        assert_eq!(row.transaction.wallet_id, None);
        assert_eq!(row.transaction.amount, dec!(20.00));
    }
}
