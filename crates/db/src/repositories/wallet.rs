//! Wallet repository and the balance mutator.
//!
//! Every balance change goes through [`apply_wallet_delta`], which locks the
//! wallet row (`SELECT ... FOR UPDATE`) inside the caller's database
//! transaction. Concurrent mutations of the same wallet serialize on that
//! lock; different wallets proceed in parallel.
//!
//! Operations that touch both a transaction row and wallets lock the
//! transaction row first, then the wallets in ascending id order. Wallet
//! deletion follows the same order for the rows that reference it.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait, sea_query::Expr,
};
use tracing::{debug, warn};
use uuid::Uuid;

use kasku_core::ledger::{
    AdjustmentDirection, BalanceChange, BalanceRule, LedgerError, NAME_MAX_CHARS, WalletSummary,
    WalletType, required_text,
};
use kasku_shared::types::WalletId;

use crate::entities::{installments, transactions, wallets};
use crate::error::StoreError;

/// Default display color for new wallets.
pub const DEFAULT_WALLET_COLOR: &str = "#64748b";

/// Input for creating a wallet.
#[derive(Debug, Clone)]
pub struct CreateWalletInput {
    /// Display name.
    pub name: String,
    /// Wallet type.
    pub wallet_type: WalletType,
    /// Provider (bank or e-wallet brand).
    pub provider: Option<String>,
    /// Account number, display only.
    pub account_number: Option<String>,
    /// Display color; defaults to [`DEFAULT_WALLET_COLOR`].
    pub color: Option<String>,
    /// Opening balance, must not be negative.
    pub initial_balance: Decimal,
}

/// Input for updating a wallet's display fields.
///
/// The balance is not editable here; use [`WalletRepository::adjust`].
#[derive(Debug, Clone, Default)]
pub struct UpdateWalletInput {
    /// Display name.
    pub name: Option<String>,
    /// Wallet type.
    pub wallet_type: Option<WalletType>,
    /// Provider.
    pub provider: Option<Option<String>>,
    /// Account number.
    pub account_number: Option<Option<String>>,
    /// Display color.
    pub color: Option<String>,
}

/// Builds the summary attached to transactions and mutator results.
#[must_use]
pub fn wallet_summary(wallet: &wallets::Model) -> WalletSummary {
    WalletSummary {
        id: wallet.id,
        name: wallet.name.clone(),
        wallet_type: wallet.wallet_type.into(),
        color: wallet.color.clone(),
    }
}

// ============================================================================
// Balance mutator
// ============================================================================

/// Locks one wallet row scoped to the account.
///
/// # Errors
///
/// `WalletNotFound` if no such wallet exists under the account.
pub async fn lock_wallet(
    txn: &DatabaseTransaction,
    account_id: Uuid,
    wallet_id: Uuid,
) -> Result<wallets::Model, StoreError> {
    let wallet = wallets::Entity::find_by_id(wallet_id)
        .filter(wallets::Column::AccountId.eq(account_id))
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or(LedgerError::WalletNotFound(wallet_id))?;
    Ok(wallet)
}

/// Locks several wallets in ascending id order.
///
/// Taking row locks in one global order keeps two multi-wallet operations
/// that share a wallet from deadlocking each other.
pub async fn lock_wallets(
    txn: &DatabaseTransaction,
    account_id: Uuid,
    wallet_ids: &[WalletId],
) -> Result<HashMap<Uuid, wallets::Model>, StoreError> {
    let mut locked = HashMap::with_capacity(wallet_ids.len());
    for wallet_id in WalletId::lock_order(wallet_ids) {
        let wallet = lock_wallet(txn, account_id, wallet_id.into_inner()).await?;
        locked.insert(wallet.id, wallet);
    }
    Ok(locked)
}

/// Applies a signed delta to a wallet balance.
///
/// 1. `WalletNotFound` if the wallet does not exist under the account.
/// 2. A delta that rounds to zero returns the wallet without writing.
/// 3. `InsufficientBalance` if a debit would leave the balance negative.
/// 4. Otherwise the new balance is persisted and the wallet returned.
///
/// Must run inside the database transaction of the enclosing operation; a
/// rejection is returned as an error so that the caller's `?` drops the
/// uncommitted transaction and rolls everything back.
pub async fn apply_wallet_delta(
    txn: &DatabaseTransaction,
    account_id: Uuid,
    wallet_id: Uuid,
    delta: Decimal,
) -> Result<wallets::Model, StoreError> {
    let wallet = lock_wallet(txn, account_id, wallet_id).await?;

    match BalanceRule::next_balance(wallet.id, wallet.balance, delta) {
        Ok(BalanceChange::Unchanged) => Ok(wallet),
        Ok(BalanceChange::Updated(next)) => {
            let previous = wallet.balance;
            let mut active: wallets::ActiveModel = wallet.into();
            active.balance = Set(next);
            active.updated_at = Set(Utc::now().into());
            let updated = active.update(txn).await?;

            debug!(
                wallet_id = %wallet_id,
                %previous,
                %delta,
                balance = %updated.balance,
                "wallet balance updated"
            );
            Ok(updated)
        }
        Err(err) => {
            warn!(wallet_id = %wallet_id, %delta, error = %err, "wallet mutation rejected");
            Err(err.into())
        }
    }
}

// ============================================================================
// Repository
// ============================================================================

/// Wallet repository for CRUD operations and direct adjustments.
#[derive(Debug, Clone)]
pub struct WalletRepository {
    db: DatabaseConnection,
}

impl WalletRepository {
    /// Creates a new wallet repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a wallet with a non-negative opening balance.
    pub async fn create(
        &self,
        account_id: Uuid,
        input: CreateWalletInput,
    ) -> Result<wallets::Model, StoreError> {
        let name = required_text("name", &input.name, NAME_MAX_CHARS)?;
        let balance = BalanceRule::non_negative_amount(input.initial_balance)?;

        let now = Utc::now().into();
        let wallet = wallets::ActiveModel {
            id: Set(WalletId::new().into_inner()),
            account_id: Set(account_id),
            name: Set(name),
            wallet_type: Set(input.wallet_type.into()),
            provider: Set(input.provider),
            account_number: Set(input.account_number),
            color: Set(input
                .color
                .unwrap_or_else(|| DEFAULT_WALLET_COLOR.to_string())),
            balance: Set(balance),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        debug!(wallet_id = %wallet.id, %account_id, "wallet created");
        Ok(wallet)
    }

    /// Lists wallets of an account ordered by name.
    pub async fn list(&self, account_id: Uuid) -> Result<Vec<wallets::Model>, StoreError> {
        let wallets = wallets::Entity::find()
            .filter(wallets::Column::AccountId.eq(account_id))
            .order_by_asc(wallets::Column::Name)
            .order_by_asc(wallets::Column::Id)
            .all(&self.db)
            .await?;
        Ok(wallets)
    }

    /// Gets one wallet.
    pub async fn get(&self, account_id: Uuid, wallet_id: Uuid) -> Result<wallets::Model, StoreError> {
        let wallet = wallets::Entity::find_by_id(wallet_id)
            .filter(wallets::Column::AccountId.eq(account_id))
            .one(&self.db)
            .await?
            .ok_or(LedgerError::WalletNotFound(wallet_id))?;
        Ok(wallet)
    }

    /// Updates display fields. The balance is left untouched.
    pub async fn update(
        &self,
        account_id: Uuid,
        wallet_id: Uuid,
        input: UpdateWalletInput,
    ) -> Result<wallets::Model, StoreError> {
        let wallet = self.get(account_id, wallet_id).await?;
        let mut active: wallets::ActiveModel = wallet.into();

        if let Some(name) = input.name {
            active.name = Set(required_text("name", &name, NAME_MAX_CHARS)?);
        }
        if let Some(wallet_type) = input.wallet_type {
            active.wallet_type = Set(wallet_type.into());
        }
        if let Some(provider) = input.provider {
            active.provider = Set(provider);
        }
        if let Some(account_number) = input.account_number {
            active.account_number = Set(account_number);
        }
        if let Some(color) = input.color {
            active.color = Set(color);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    /// Deletes a wallet and clears every reference to it.
    ///
    /// Transactions and installments that pointed at the wallet keep their
    /// rows with `wallet_id = NULL`. Balances of other wallets are not
    /// touched.
    pub async fn delete(&self, account_id: Uuid, wallet_id: Uuid) -> Result<(), StoreError> {
        let txn = self.db.begin().await?;

        // Referencing rows before the wallet, the same order edits and
        // deletes of a transaction take them in.
        let referencing = transactions::Entity::find()
            .filter(transactions::Column::AccountId.eq(account_id))
            .filter(transactions::Column::WalletId.eq(wallet_id))
            .order_by_asc(transactions::Column::Id)
            .lock_exclusive()
            .all(&txn)
            .await?;
        installments::Entity::find()
            .filter(installments::Column::AccountId.eq(account_id))
            .filter(installments::Column::WalletId.eq(wallet_id))
            .order_by_asc(installments::Column::Id)
            .lock_exclusive()
            .all(&txn)
            .await?;

        let wallet = lock_wallet(&txn, account_id, wallet_id).await?;

        let detached = transactions::Entity::update_many()
            .col_expr(
                transactions::Column::WalletId,
                Expr::value(Option::<Uuid>::None),
            )
            .filter(transactions::Column::AccountId.eq(account_id))
            .filter(transactions::Column::WalletId.eq(wallet.id))
            .exec(&txn)
            .await?;

        installments::Entity::update_many()
            .col_expr(
                installments::Column::WalletId,
                Expr::value(Option::<Uuid>::None),
            )
            .filter(installments::Column::AccountId.eq(account_id))
            .filter(installments::Column::WalletId.eq(wallet.id))
            .exec(&txn)
            .await?;

        wallets::Entity::delete_by_id(wallet.id).exec(&txn).await?;

        txn.commit().await?;

        debug!(
            %wallet_id,
            locked_transactions = referencing.len(),
            detached_transactions = detached.rows_affected,
            "wallet deleted"
        );
        Ok(())
    }

    /// Increases or decreases a balance directly.
    ///
    /// No transaction or activity row is written.
    pub async fn adjust(
        &self,
        account_id: Uuid,
        wallet_id: Uuid,
        direction: AdjustmentDirection,
        amount: Decimal,
    ) -> Result<wallets::Model, StoreError> {
        let amount = BalanceRule::positive_amount(amount)?;

        let txn = self.db.begin().await?;
        let wallet =
            apply_wallet_delta(&txn, account_id, wallet_id, direction.signed_delta(amount)).await?;
        txn.commit().await?;

        debug!(%wallet_id, ?direction, %amount, "wallet adjusted");
        Ok(wallet)
    }
}
