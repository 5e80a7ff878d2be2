//! Integration tests for the transaction ledger service.
//!
//! Every successful mutation leaves exactly one activity row and the
//! matching wallet effect; every rejected one leaves nothing behind.

mod common;

use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;
use uuid::Uuid;

use common::Household;
use kasku_core::ledger::{ActivityAction, LedgerError, TITLE_MAX_CHARS, TransactionType};
use kasku_db::StoreError;
use kasku_db::repositories::{
    ActivityRepository, CreateTransactionInput, TransactionFilter, TransactionRepository,
    TransferInput, TransferRepository, UpdateTransactionInput, WalletRepository,
};
use kasku_shared::types::PageRequest;

fn expense(wallet_id: Option<Uuid>, amount: rust_decimal::Decimal) -> CreateTransactionInput {
    CreateTransactionInput {
        transaction_type: TransactionType::Expense,
        title: "Belanja".into(),
        category: "Groceries".into(),
        amount,
        occurred_at: Utc::now(),
        wallet_id,
        member_id: None,
        description: None,
    }
}

fn income(wallet_id: Option<Uuid>, amount: rust_decimal::Decimal) -> CreateTransactionInput {
    CreateTransactionInput {
        transaction_type: TransactionType::Income,
        title: "Gaji".into(),
        category: "Salary".into(),
        ..expense(wallet_id, amount)
    }
}

fn ledger_error(err: &StoreError) -> &LedgerError {
    err.as_ledger().expect("ledger error")
}

// ============================================================================
// Scenario: create, update, delete
// ============================================================================

#[tokio::test]
async fn test_create_update_delete_scenario() {
    let Some(home) = Household::setup().await else {
        return;
    };
    let repo = TransactionRepository::new(home.db.clone());
    let activity = ActivityRepository::new(home.db.clone());
    let wallet = home.wallet("BCA", dec!(100.00)).await;

    let created = repo
        .create(home.account_id, Some(home.owner_id), expense(Some(wallet), dec!(30.00)))
        .await
        .expect("create");
    let id = created.transaction.id;
    assert_eq!(home.balance(wallet).await, dec!(70.00));
    assert_eq!(activity.count_for(home.account_id, id).await.unwrap(), 1);
    assert_eq!(created.wallet.as_ref().map(|w| w.id), Some(wallet));
    let latest = created.latest_activity.expect("latest activity");
    assert_eq!(latest.action, ActivityAction::Create);
    assert_eq!(latest.actor_name.as_deref(), Some("Budi"));

    let updated = repo
        .update(
            home.account_id,
            id,
            Some(home.partner_id),
            UpdateTransactionInput {
                amount: Some(dec!(50.00)),
                ..Default::default()
            },
        )
        .await
        .expect("update");
    assert_eq!(updated.transaction.amount, dec!(50.00));
    assert_eq!(home.balance(wallet).await, dec!(50.00));
    assert_eq!(activity.count_for(home.account_id, id).await.unwrap(), 2);
    let latest = updated.latest_activity.expect("latest activity");
    assert_eq!(latest.action, ActivityAction::Update);
    assert_eq!(latest.actor_name.as_deref(), Some("Sari"));

    assert!(repo.delete(home.account_id, id, Some(home.owner_id)).await.unwrap());
    assert_eq!(home.balance(wallet).await, dec!(100.00));
    assert_eq!(activity.count_for(home.account_id, id).await.unwrap(), 3);

    let history = activity.history(home.account_id, id).await.unwrap();
    let actions: Vec<_> = history.iter().map(|entry| entry.summary.action).collect();
    assert_eq!(
        actions,
        vec![ActivityAction::Delete, ActivityAction::Update, ActivityAction::Create]
    );
    assert_eq!(history[1].payload["before"]["amount"], "30.00");
    assert_eq!(history[1].payload["after"]["amount"], "50.00");

    let err = repo.get(home.account_id, id).await.unwrap_err();
    assert_eq!(ledger_error(&err), &LedgerError::TransactionNotFound(id));
}

#[tokio::test]
async fn test_create_without_wallet_touches_no_balance() {
    let Some(home) = Household::setup().await else {
        return;
    };
    let repo = TransactionRepository::new(home.db.clone());
    let wallet = home.wallet("Cash", dec!(10.00)).await;

    let created = repo
        .create(home.account_id, None, expense(None, dec!(999.00)))
        .await
        .expect("create");
    assert!(created.wallet.is_none());
    assert_eq!(home.balance(wallet).await, dec!(10.00));
    let latest = created.latest_activity.expect("latest activity");
    assert!(latest.actor_id.is_none());
    assert!(latest.actor_name.is_none());
}

// ============================================================================
// Rejections leave no trace
// ============================================================================

#[tokio::test]
async fn test_overdraft_rejected_without_rows() {
    let Some(home) = Household::setup().await else {
        return;
    };
    let repo = TransactionRepository::new(home.db.clone());
    let wallet = home.wallet("Dana", dec!(20.00)).await;

    let err = repo
        .create(home.account_id, None, expense(Some(wallet), dec!(20.01)))
        .await
        .unwrap_err();
    assert!(matches!(
        ledger_error(&err),
        LedgerError::InsufficientBalance { wallet_id, .. } if *wallet_id == wallet
    ));
    assert_eq!(home.balance(wallet).await, dec!(20.00));

    let page = repo
        .list(home.account_id, TransactionFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.meta.total, 0);
}

#[tokio::test]
async fn test_missing_wallet_and_bad_amounts() {
    let Some(home) = Household::setup().await else {
        return;
    };
    let repo = TransactionRepository::new(home.db.clone());
    let ghost = Uuid::new_v4();

    let err = repo
        .create(home.account_id, None, expense(Some(ghost), dec!(1.00)))
        .await
        .unwrap_err();
    assert_eq!(ledger_error(&err), &LedgerError::WalletNotFound(ghost));

    let err = repo
        .create(home.account_id, None, expense(None, dec!(0)))
        .await
        .unwrap_err();
    assert!(matches!(ledger_error(&err), LedgerError::InvalidAmount(_)));

    let err = repo
        .update(home.account_id, Uuid::new_v4(), None, UpdateTransactionInput::default())
        .await
        .unwrap_err();
    assert!(matches!(ledger_error(&err), LedgerError::TransactionNotFound(_)));
}

#[tokio::test]
async fn test_failed_update_rolls_back() {
    let Some(home) = Household::setup().await else {
        return;
    };
    let repo = TransactionRepository::new(home.db.clone());
    let activity = ActivityRepository::new(home.db.clone());
    let wallet = home.wallet("BRI", dec!(40.00)).await;

    let created = repo
        .create(home.account_id, None, expense(Some(wallet), dec!(30.00)))
        .await
        .unwrap();
    let id = created.transaction.id;

    let err = repo
        .update(
            home.account_id,
            id,
            None,
            UpdateTransactionInput {
                amount: Some(dec!(60.00)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(ledger_error(&err), LedgerError::InsufficientBalance { .. }));
    assert_eq!(home.balance(wallet).await, dec!(10.00));
    assert_eq!(activity.count_for(home.account_id, id).await.unwrap(), 1);
    assert_eq!(repo.get(home.account_id, id).await.unwrap().transaction.amount, dec!(30.00));
}

#[tokio::test]
async fn test_delete_that_would_overdraw_is_rejected() {
    let Some(home) = Household::setup().await else {
        return;
    };
    let repo = TransactionRepository::new(home.db.clone());
    let activity = ActivityRepository::new(home.db.clone());
    let wallet = home.wallet("Mandiri", dec!(100.00)).await;

    let salary = repo
        .create(home.account_id, None, income(Some(wallet), dec!(50.00)))
        .await
        .unwrap()
        .transaction
        .id;
    repo.create(home.account_id, None, expense(Some(wallet), dec!(120.00)))
        .await
        .unwrap();
    assert_eq!(home.balance(wallet).await, dec!(30.00));

    // Reversing the income would take the wallet to -20.00.
    let err = repo
        .delete(home.account_id, salary, Some(home.owner_id))
        .await
        .unwrap_err();
    assert!(matches!(
        ledger_error(&err),
        LedgerError::InsufficientBalance { wallet_id, delta, .. }
            if *wallet_id == wallet && *delta == dec!(-50.00)
    ));

    assert_eq!(home.balance(wallet).await, dec!(30.00));
    assert!(repo.get(home.account_id, salary).await.is_ok());
    assert_eq!(activity.count_for(home.account_id, salary).await.unwrap(), 1);
    let history = activity.history(home.account_id, salary).await.unwrap();
    assert!(history.iter().all(|entry| entry.summary.action != ActivityAction::Delete));
}

#[tokio::test]
async fn test_negative_seed_accepts_credits_only() {
    let Some(home) = Household::setup().await else {
        return;
    };
    let repo = TransactionRepository::new(home.db.clone());
    let card = home.seeded_card("Kartu Kredit", dec!(-500.00)).await;
    let bank = home.wallet("BCA", dec!(1000.00)).await;

    repo.create(home.account_id, None, income(Some(card), dec!(50.00)))
        .await
        .expect("credit into a negative wallet");
    assert_eq!(home.balance(card).await, dec!(-450.00));

    let outcome = TransferRepository::new(home.db.clone())
        .transfer(
            home.account_id,
            None,
            TransferInput {
                source_wallet_id: bank,
                target_wallet_id: card,
                amount: dec!(200.00),
                note: None,
                occurred_at: None,
                member_id: None,
            },
        )
        .await
        .expect("transfer into a negative wallet");
    assert_eq!(outcome.target_balance, dec!(-250.00));
    assert_eq!(home.balance(card).await, dec!(-250.00));
    assert_eq!(home.balance(bank).await, dec!(800.00));

    let err = repo
        .create(home.account_id, None, expense(Some(card), dec!(1.00)))
        .await
        .unwrap_err();
    assert!(matches!(ledger_error(&err), LedgerError::InsufficientBalance { .. }));
    assert_eq!(home.balance(card).await, dec!(-250.00));
}

#[tokio::test]
async fn test_unknown_member_and_long_title_rejected() {
    let Some(home) = Household::setup().await else {
        return;
    };
    let repo = TransactionRepository::new(home.db.clone());
    let wallet = home.wallet("Jago", dec!(100.00)).await;
    let stranger = Uuid::new_v4();

    let err = repo
        .create(
            home.account_id,
            None,
            CreateTransactionInput {
                member_id: Some(stranger),
                ..expense(Some(wallet), dec!(10.00))
            },
        )
        .await
        .unwrap_err();
    assert_eq!(ledger_error(&err), &LedgerError::MemberNotFound(stranger));

    let err = repo
        .create(home.account_id, Some(stranger), expense(Some(wallet), dec!(10.00)))
        .await
        .unwrap_err();
    assert_eq!(ledger_error(&err), &LedgerError::MemberNotFound(stranger));

    let err = repo
        .create(
            home.account_id,
            None,
            CreateTransactionInput {
                title: "x".repeat(TITLE_MAX_CHARS + 1),
                ..expense(Some(wallet), dec!(10.00))
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(ledger_error(&err), LedgerError::FieldTooLong { field: "title", .. }));
    assert_eq!(home.balance(wallet).await, dec!(100.00));

    let created = repo
        .create(
            home.account_id,
            None,
            CreateTransactionInput {
                member_id: Some(home.partner_id),
                ..expense(Some(wallet), dec!(10.00))
            },
        )
        .await
        .unwrap();
    let err = repo
        .update(
            home.account_id,
            created.transaction.id,
            None,
            UpdateTransactionInput {
                member_id: Some(Some(stranger)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(ledger_error(&err), &LedgerError::MemberNotFound(stranger));
    assert_eq!(home.balance(wallet).await, dec!(90.00));

    let page = repo
        .list(home.account_id, TransactionFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.meta.total, 1);
}

// ============================================================================
// Wallet transitions on update
// ============================================================================

#[tokio::test]
async fn test_update_moves_between_wallets() {
    let Some(home) = Household::setup().await else {
        return;
    };
    let repo = TransactionRepository::new(home.db.clone());
    let a = home.wallet("A", dec!(100.00)).await;
    let b = home.wallet("B", dec!(100.00)).await;

    let created = repo
        .create(home.account_id, None, expense(Some(a), dec!(25.00)))
        .await
        .unwrap();
    let id = created.transaction.id;

    repo.update(
        home.account_id,
        id,
        None,
        UpdateTransactionInput {
            wallet_id: Some(Some(b)),
            transaction_type: Some(TransactionType::Income),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(home.balance(a).await, dec!(100.00));
    assert_eq!(home.balance(b).await, dec!(125.00));

    repo.update(
        home.account_id,
        id,
        None,
        UpdateTransactionInput {
            wallet_id: Some(None),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(home.balance(b).await, dec!(100.00));

    let detached = repo
        .update(
            home.account_id,
            id,
            None,
            UpdateTransactionInput {
                wallet_id: Some(Some(a)),
                amount: Some(dec!(5.00)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(detached.wallet.map(|w| w.id), Some(a));
    assert_eq!(home.balance(a).await, dec!(105.00));
}

#[tokio::test]
async fn test_type_flip_on_same_wallet() {
    let Some(home) = Household::setup().await else {
        return;
    };
    let repo = TransactionRepository::new(home.db.clone());
    let wallet = home.wallet("Jenius", dec!(100.00)).await;

    let created = repo
        .create(home.account_id, None, expense(Some(wallet), dec!(40.00)))
        .await
        .unwrap();
    repo.update(
        home.account_id,
        created.transaction.id,
        None,
        UpdateTransactionInput {
            transaction_type: Some(TransactionType::Income),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(home.balance(wallet).await, dec!(140.00));
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_list_filters_and_pages() {
    let Some(home) = Household::setup().await else {
        return;
    };
    let repo = TransactionRepository::new(home.db.clone());
    let wallet = home.wallet("Mandiri", dec!(1000.00)).await;

    for day in 1..=5 {
        let mut input = expense(Some(wallet), dec!(10.00));
        input.occurred_at = Utc.with_ymd_and_hms(2026, 9, day, 8, 0, 0).unwrap();
        if day % 2 == 0 {
            input.transaction_type = TransactionType::Income;
            input.category = "Salary".into();
        }
        repo.create(home.account_id, Some(home.owner_id), input).await.unwrap();
    }

    let page = repo
        .list(
            home.account_id,
            TransactionFilter::default(),
            PageRequest { page: 1, per_page: 2 },
        )
        .await
        .unwrap();
    assert_eq!(page.meta.total, 5);
    assert_eq!(page.meta.total_pages, 3);
    assert_eq!(page.data.len(), 2);
    assert!(page.data[0].transaction.occurred_at > page.data[1].transaction.occurred_at);
    assert!(page.data.iter().all(|t| t.latest_activity.is_some()));

    let incomes = repo
        .list(
            home.account_id,
            TransactionFilter {
                transaction_type: Some(TransactionType::Income),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(incomes.meta.total, 2);

    let ranged = repo
        .list(
            home.account_id,
            TransactionFilter {
                from: Some(Utc.with_ymd_and_hms(2026, 9, 2, 0, 0, 0).unwrap()),
                to: Some(Utc.with_ymd_and_hms(2026, 9, 4, 0, 0, 0).unwrap()),
                category: Some("Groceries".into()),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(ranged.meta.total, 1);

    let wallets = WalletRepository::new(home.db.clone());
    assert_eq!(
        wallets.get(home.account_id, wallet).await.unwrap().balance,
        dec!(1000.00) - dec!(30.00) + dec!(20.00)
    );
}

#[tokio::test]
async fn test_other_account_cannot_see_transaction() {
    let Some(home) = Household::setup().await else {
        return;
    };
    let Some(other) = Household::setup().await else {
        return;
    };
    let repo = TransactionRepository::new(home.db.clone());
    let created = repo
        .create(home.account_id, None, expense(None, dec!(5.00)))
        .await
        .unwrap();

    let err = repo
        .delete(other.account_id, created.transaction.id, None)
        .await
        .unwrap_err();
    assert!(matches!(ledger_error(&err), LedgerError::TransactionNotFound(_)));
}

#[tokio::test]
async fn test_latest_activity_survives_delete() {
    let Some(home) = Household::setup().await else {
        return;
    };
    let repo = TransactionRepository::new(home.db.clone());
    let activity = ActivityRepository::new(home.db.clone());

    let kept = repo
        .create(home.account_id, Some(home.owner_id), expense(None, dec!(5)))
        .await
        .unwrap()
        .transaction
        .id;
    let removed = repo
        .create(home.account_id, Some(home.owner_id), expense(None, dec!(8)))
        .await
        .unwrap()
        .transaction
        .id;
    assert!(
        repo.delete(home.account_id, removed, Some(home.partner_id))
            .await
            .unwrap()
    );

    let latest = activity
        .latest_for(home.account_id, &[kept, removed, Uuid::new_v4()])
        .await
        .unwrap();
    assert_eq!(latest.len(), 2);
    assert_eq!(latest[&kept].action, ActivityAction::Create);

    let deleted = &latest[&removed];
    assert_eq!(deleted.action, ActivityAction::Delete);
    assert_eq!(deleted.actor_name.as_deref(), Some("Sari"));
    assert_eq!(
        deleted.actor_avatar_url.as_deref(),
        Some("https://example.com/sari.png")
    );

    let history = activity.history(home.account_id, removed).await.unwrap();
    assert_eq!(history.len(), 2);
}
