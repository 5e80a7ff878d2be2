//! Wallet-to-wallet transfers.
//!
//! A transfer writes an expense leg on the source wallet and an income leg
//! on the target wallet in one database transaction. Both legs get their
//! own `create` activity row.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DatabaseTransaction, Set, TransactionTrait};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use kasku_core::ledger::{
    ActivityPayload, LedgerError, TRANSFER_CATEGORY, TransferLeg, TransferPlan, WalletSummary,
};
use kasku_shared::types::{TransactionId, WalletId};

use super::activity::record_activity;
use super::transaction::{EnrichedTransaction, enrich, ensure_members, snapshot};
use super::wallet::{apply_wallet_delta, lock_wallets, wallet_summary};
use crate::entities::transactions;
use crate::error::StoreError;

/// Input for a transfer.
#[derive(Debug, Clone)]
pub struct TransferInput {
    /// Wallet to debit.
    pub source_wallet_id: Uuid,
    /// Wallet to credit.
    pub target_wallet_id: Uuid,
    /// Positive amount.
    pub amount: Decimal,
    /// Optional note stored as the description of both legs.
    pub note: Option<String>,
    /// When the transfer happened; defaults to now.
    pub occurred_at: Option<DateTime<Utc>>,
    /// Member recorded on both legs.
    pub member_id: Option<Uuid>,
}

/// Result of a committed transfer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferOutcome {
    /// Source wallet after the debit.
    pub source: WalletSummary,
    /// Source balance after the debit.
    #[serde(with = "rust_decimal::serde::str")]
    pub source_balance: Decimal,
    /// Target wallet after the credit.
    pub target: WalletSummary,
    /// Target balance after the credit.
    #[serde(with = "rust_decimal::serde::str")]
    pub target_balance: Decimal,
    /// Expense leg on the source wallet.
    pub expense: EnrichedTransaction,
    /// Income leg on the target wallet.
    pub income: EnrichedTransaction,
}

/// Transfer repository.
#[derive(Debug, Clone)]
pub struct TransferRepository {
    db: DatabaseConnection,
}

impl TransferRepository {
    /// Creates a new transfer repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Moves `amount` from the source wallet to the target wallet.
    ///
    /// Both wallets are locked in ascending id order before the source
    /// balance is checked, so two opposite transfers between the same pair
    /// cannot deadlock. Nothing is written when the source cannot cover the
    /// amount.
    pub async fn transfer(
        &self,
        account_id: Uuid,
        actor_id: Option<Uuid>,
        input: TransferInput,
    ) -> Result<TransferOutcome, StoreError> {
        let plan = TransferPlan::new(
            WalletId::from_uuid(input.source_wallet_id),
            WalletId::from_uuid(input.target_wallet_id),
            input.amount,
        )?;

        let txn = self.db.begin().await?;

        ensure_members(&txn, &[input.member_id, actor_id]).await?;

        let locked = lock_wallets(&txn, account_id, &plan.lock_order()).await?;
        let source = locked
            .get(&plan.source.into_inner())
            .ok_or(LedgerError::WalletNotFound(plan.source.into_inner()))?;
        let target = locked
            .get(&plan.target.into_inner())
            .ok_or(LedgerError::WalletNotFound(plan.target.into_inner()))?;

        if let Err(err) = plan.ensure_covered(source.balance) {
            warn!(
                source_wallet_id = %plan.source,
                balance = %source.balance,
                amount = %plan.amount,
                "transfer rejected"
            );
            return Err(err.into());
        }

        let legs = plan.legs(&source.name, &target.name);

        let mut updated = Vec::with_capacity(2);
        for step in plan.adjustments() {
            updated.push(
                apply_wallet_delta(&txn, account_id, step.wallet_id.into_inner(), step.delta)
                    .await?,
            );
        }

        let occurred_at = input.occurred_at.unwrap_or_else(Utc::now);
        let mut rows = Vec::with_capacity(2);
        for leg in &legs {
            let row = Self::insert_leg(
                &txn,
                account_id,
                actor_id,
                leg,
                &plan,
                occurred_at,
                &input,
            )
            .await?;
            rows.push(row);
        }

        let mut enriched = enrich(&txn, account_id, rows).await?.into_iter();
        let (Some(expense), Some(income)) = (enriched.next(), enriched.next()) else {
            return Err(LedgerError::InvalidTransfer.into());
        };
        let [source_after, target_after] = <[_; 2]>::try_from(updated)
            .map_err(|_| LedgerError::InvalidTransfer)?;

        txn.commit().await?;

        debug!(
            %account_id,
            source_wallet_id = %plan.source,
            target_wallet_id = %plan.target,
            amount = %plan.amount,
            "transfer committed"
        );

        Ok(TransferOutcome {
            source: wallet_summary(&source_after),
            source_balance: source_after.balance,
            target: wallet_summary(&target_after),
            target_balance: target_after.balance,
            expense,
            income,
        })
    }

    async fn insert_leg(
        txn: &DatabaseTransaction,
        account_id: Uuid,
        actor_id: Option<Uuid>,
        leg: &TransferLeg,
        plan: &TransferPlan,
        occurred_at: DateTime<Utc>,
        input: &TransferInput,
    ) -> Result<transactions::Model, StoreError> {
        let now = Utc::now().into();
        let row = transactions::ActiveModel {
            id: Set(TransactionId::new().into_inner()),
            account_id: Set(account_id),
            wallet_id: Set(Some(leg.wallet_id.into_inner())),
            member_id: Set(input.member_id),
            transaction_type: Set(leg.transaction_type.into()),
            title: Set(leg.title.clone()),
            category: Set(TRANSFER_CATEGORY.to_string()),
            amount: Set(plan.amount),
            occurred_at: Set(occurred_at.into()),
            description: Set(input.note.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(txn)
        .await?;

        record_activity(
            txn,
            account_id,
            actor_id,
            &ActivityPayload::Created(snapshot(&row)),
        )
        .await?;

        Ok(row)
    }
}
