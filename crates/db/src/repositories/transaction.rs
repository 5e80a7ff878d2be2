//! Transaction ledger service.
//!
//! Create, update and delete a transaction together with the wallet balance
//! changes it causes and one activity row, all inside one database
//! transaction. Any failure drops the uncommitted transaction, which rolls
//! back every write made so far.
//!
//! Lock order is always: transaction row first, then wallets in ascending
//! id order.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use kasku_core::ledger::{
    ActivityPayload, ActivitySummary, BalanceRule, LedgerError, NAME_MAX_CHARS, TITLE_MAX_CHARS,
    TransactionSnapshot, TransactionType, WalletSummary, WalletTransition, required_text,
};
use kasku_shared::types::{PageRequest, PageResponse, TransactionId, WalletId};

use super::activity::{latest_activities, record_activity};
use super::wallet::{apply_wallet_delta, lock_wallets, wallet_summary};
use crate::entities::{members, sea_orm_active_enums, transactions, wallets};
use crate::error::StoreError;

/// Input for creating a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    /// Income or expense.
    pub transaction_type: TransactionType,
    /// Title.
    pub title: String,
    /// Free-text category.
    pub category: String,
    /// Positive magnitude.
    pub amount: Decimal,
    /// When the money moved.
    pub occurred_at: DateTime<Utc>,
    /// Wallet to credit or debit.
    pub wallet_id: Option<Uuid>,
    /// Owning member.
    pub member_id: Option<Uuid>,
    /// Optional free text.
    pub description: Option<String>,
}

/// Input for updating a transaction. `None` keeps the stored value;
/// `Some(None)` clears a nullable field.
#[derive(Debug, Clone, Default)]
pub struct UpdateTransactionInput {
    /// Income or expense.
    pub transaction_type: Option<TransactionType>,
    /// Title.
    pub title: Option<String>,
    /// Category.
    pub category: Option<String>,
    /// Positive magnitude.
    pub amount: Option<Decimal>,
    /// When the money moved.
    pub occurred_at: Option<DateTime<Utc>>,
    /// Attached wallet.
    pub wallet_id: Option<Option<Uuid>>,
    /// Description.
    pub description: Option<Option<String>>,
    /// Owning member.
    pub member_id: Option<Option<Uuid>>,
}

/// Filter options for listing transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Filter by type.
    pub transaction_type: Option<TransactionType>,
    /// Filter by wallet.
    pub wallet_id: Option<Uuid>,
    /// Filter by exact category.
    pub category: Option<String>,
    /// Inclusive lower bound on `occurred_at`.
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `occurred_at`.
    pub to: Option<DateTime<Utc>>,
}

/// Transaction with its wallet summary and latest activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedTransaction {
    /// Stored fields.
    #[serde(flatten)]
    pub transaction: TransactionSnapshot,
    /// Attached wallet, if it still exists.
    pub wallet: Option<WalletSummary>,
    /// Most recent activity row.
    pub latest_activity: Option<ActivitySummary>,
}

/// Copies a stored row into the core snapshot type.
#[must_use]
pub fn snapshot(row: &transactions::Model) -> TransactionSnapshot {
    TransactionSnapshot {
        id: row.id,
        account_id: row.account_id,
        transaction_type: row.transaction_type.into(),
        title: row.title.clone(),
        category: row.category.clone(),
        amount: row.amount,
        occurred_at: row.occurred_at.with_timezone(&Utc),
        wallet_id: row.wallet_id,
        member_id: row.member_id,
        description: row.description.clone(),
        created_at: row.created_at.with_timezone(&Utc),
        updated_at: row.updated_at.with_timezone(&Utc),
    }
}

/// Fails with `MemberNotFound` for the first id that names no member.
pub(crate) async fn ensure_members<C: ConnectionTrait>(
    conn: &C,
    member_ids: &[Option<Uuid>],
) -> Result<(), StoreError> {
    for &member_id in member_ids.iter().flatten() {
        if members::Entity::find_by_id(member_id).one(conn).await?.is_none() {
            return Err(LedgerError::MemberNotFound(member_id).into());
        }
    }
    Ok(())
}

/// Attaches wallet summaries and latest activities to rows, keeping order.
pub(crate) async fn enrich<C: ConnectionTrait>(
    conn: &C,
    account_id: Uuid,
    rows: Vec<transactions::Model>,
) -> Result<Vec<EnrichedTransaction>, StoreError> {
    let wallet_ids: Vec<Uuid> = rows.iter().filter_map(|row| row.wallet_id).collect();
    let wallets: HashMap<Uuid, WalletSummary> = if wallet_ids.is_empty() {
        HashMap::new()
    } else {
        wallets::Entity::find()
            .filter(wallets::Column::AccountId.eq(account_id))
            .filter(wallets::Column::Id.is_in(wallet_ids))
            .all(conn)
            .await?
            .iter()
            .map(|wallet| (wallet.id, wallet_summary(wallet)))
            .collect()
    };

    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let mut activities = latest_activities(conn, account_id, &ids).await?;

    Ok(rows
        .iter()
        .map(|row| EnrichedTransaction {
            transaction: snapshot(row),
            wallet: row.wallet_id.and_then(|id| wallets.get(&id).cloned()),
            latest_activity: activities.remove(&row.id),
        })
        .collect())
}

/// Transaction repository: the ledger service for income and expenses.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Creates a transaction.
    ///
    /// With a wallet attached, the wallet receives `+amount` for income or
    /// `-amount` for expense before the row is inserted. A rejected balance
    /// change leaves neither a transaction row nor an activity row behind.
    pub async fn create(
        &self,
        account_id: Uuid,
        actor_id: Option<Uuid>,
        input: CreateTransactionInput,
    ) -> Result<EnrichedTransaction, StoreError> {
        let title = required_text("title", &input.title, TITLE_MAX_CHARS)?;
        let category = required_text("category", &input.category, NAME_MAX_CHARS)?;
        let amount = BalanceRule::positive_amount(input.amount)?;

        let txn = self.db.begin().await?;

        ensure_members(&txn, &[input.member_id, actor_id]).await?;

        if let Some(wallet_id) = input.wallet_id {
            apply_wallet_delta(
                &txn,
                account_id,
                wallet_id,
                input.transaction_type.signed_delta(amount),
            )
            .await?;
        }

        let now = Utc::now().into();
        let row = transactions::ActiveModel {
            id: Set(TransactionId::new().into_inner()),
            account_id: Set(account_id),
            wallet_id: Set(input.wallet_id),
            member_id: Set(input.member_id),
            transaction_type: Set(input.transaction_type.into()),
            title: Set(title),
            category: Set(category),
            amount: Set(amount),
            occurred_at: Set(input.occurred_at.into()),
            description: Set(input.description),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        record_activity(
            &txn,
            account_id,
            actor_id,
            &ActivityPayload::Created(snapshot(&row)),
        )
        .await?;

        let enriched = self.enrich_one(&txn, account_id, row).await?;
        txn.commit().await?;

        debug!(
            transaction_id = %enriched.transaction.id,
            %account_id,
            amount = %enriched.transaction.amount,
            "transaction created"
        );
        Ok(enriched)
    }

    /// Updates any subset of a transaction's fields.
    ///
    /// Wallet effects are reconciled through [`WalletTransition`]: an
    /// unchanged wallet receives only the difference between the new and
    /// old signed amounts; a cleared, newly set or replaced wallet gets the
    /// old effect reversed and the new effect applied.
    pub async fn update(
        &self,
        account_id: Uuid,
        transaction_id: Uuid,
        actor_id: Option<Uuid>,
        input: UpdateTransactionInput,
    ) -> Result<EnrichedTransaction, StoreError> {
        let title = input
            .title
            .as_deref()
            .map(|t| required_text("title", t, TITLE_MAX_CHARS))
            .transpose()?;
        let category = input
            .category
            .as_deref()
            .map(|c| required_text("category", c, NAME_MAX_CHARS))
            .transpose()?;
        let amount = input.amount.map(BalanceRule::positive_amount).transpose()?;

        let txn = self.db.begin().await?;

        ensure_members(&txn, &[input.member_id.flatten(), actor_id]).await?;

        let existing = Self::lock_transaction(&txn, account_id, transaction_id).await?;
        let before = snapshot(&existing);

        let next_type = input.transaction_type.unwrap_or(before.transaction_type);
        let next_amount = amount.unwrap_or(before.amount);
        let next_wallet = input.wallet_id.unwrap_or(before.wallet_id);

        let transition = WalletTransition::between(
            before.wallet_id.map(WalletId::from_uuid),
            next_wallet.map(WalletId::from_uuid),
        );
        lock_wallets(&txn, account_id, &transition.wallets()).await?;
        let plan =
            transition.adjustments(before.signed_delta(), next_type.signed_delta(next_amount))?;
        for step in plan {
            apply_wallet_delta(&txn, account_id, step.wallet_id.into_inner(), step.delta).await?;
        }

        let mut active: transactions::ActiveModel = existing.into();
        active.transaction_type = Set(next_type.into());
        active.amount = Set(next_amount);
        active.wallet_id = Set(next_wallet);
        if let Some(title) = title {
            active.title = Set(title);
        }
        if let Some(category) = category {
            active.category = Set(category);
        }
        if let Some(occurred_at) = input.occurred_at {
            active.occurred_at = Set(occurred_at.into());
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(member_id) = input.member_id {
            active.member_id = Set(member_id);
        }
        active.updated_at = Set(Utc::now().into());
        let row = active.update(&txn).await?;

        record_activity(
            &txn,
            account_id,
            actor_id,
            &ActivityPayload::Updated {
                before: Box::new(before),
                after: Box::new(snapshot(&row)),
            },
        )
        .await?;

        let enriched = self.enrich_one(&txn, account_id, row).await?;
        txn.commit().await?;

        debug!(%transaction_id, ?transition, "transaction updated");
        Ok(enriched)
    }

    /// Deletes a transaction and reverses its wallet effect.
    ///
    /// The activity row recording the deletion keeps the full snapshot.
    pub async fn delete(
        &self,
        account_id: Uuid,
        transaction_id: Uuid,
        actor_id: Option<Uuid>,
    ) -> Result<bool, StoreError> {
        let txn = self.db.begin().await?;

        ensure_members(&txn, &[actor_id]).await?;

        let existing = Self::lock_transaction(&txn, account_id, transaction_id).await?;
        let before = snapshot(&existing);

        transactions::Entity::delete_by_id(existing.id)
            .exec(&txn)
            .await?;

        let transition = WalletTransition::between(before.wallet_id.map(WalletId::from_uuid), None);
        for step in transition.adjustments(before.signed_delta(), Decimal::ZERO)? {
            apply_wallet_delta(&txn, account_id, step.wallet_id.into_inner(), step.delta).await?;
        }

        record_activity(&txn, account_id, actor_id, &ActivityPayload::Deleted(before)).await?;

        txn.commit().await?;

        debug!(%transaction_id, %account_id, "transaction deleted");
        Ok(true)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Gets one enriched transaction.
    pub async fn get(
        &self,
        account_id: Uuid,
        transaction_id: Uuid,
    ) -> Result<EnrichedTransaction, StoreError> {
        let row = transactions::Entity::find_by_id(transaction_id)
            .filter(transactions::Column::AccountId.eq(account_id))
            .one(&self.db)
            .await?
            .ok_or(LedgerError::TransactionNotFound(transaction_id))?;
        self.enrich_one(&self.db, account_id, row).await
    }

    /// Lists transactions newest first, enriched.
    pub async fn list(
        &self,
        account_id: Uuid,
        filter: TransactionFilter,
        page: PageRequest,
    ) -> Result<PageResponse<EnrichedTransaction>, StoreError> {
        let page = page.normalized();
        let mut query = transactions::Entity::find()
            .filter(transactions::Column::AccountId.eq(account_id));

        if let Some(transaction_type) = filter.transaction_type {
            query = query.filter(
                transactions::Column::TransactionType
                    .eq(sea_orm_active_enums::TransactionType::from(transaction_type)),
            );
        }
        if let Some(wallet_id) = filter.wallet_id {
            query = query.filter(transactions::Column::WalletId.eq(wallet_id));
        }
        if let Some(category) = filter.category {
            query = query.filter(transactions::Column::Category.eq(category));
        }
        if let Some(from) = filter.from {
            query = query.filter(transactions::Column::OccurredAt.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(transactions::Column::OccurredAt.lt(to));
        }

        let total = query.clone().count(&self.db).await?;
        let rows = query
            .order_by_desc(transactions::Column::OccurredAt)
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        let data = enrich(&self.db, account_id, rows).await?;
        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn lock_transaction(
        txn: &DatabaseTransaction,
        account_id: Uuid,
        transaction_id: Uuid,
    ) -> Result<transactions::Model, StoreError> {
        let row = transactions::Entity::find_by_id(transaction_id)
            .filter(transactions::Column::AccountId.eq(account_id))
            .lock_exclusive()
            .one(txn)
            .await?;

        row.ok_or_else(|| {
            warn!(%transaction_id, %account_id, "transaction not found");
            LedgerError::TransactionNotFound(transaction_id).into()
        })
    }

    async fn enrich_one<C: ConnectionTrait>(
        &self,
        conn: &C,
        account_id: Uuid,
        row: transactions::Model,
    ) -> Result<EnrichedTransaction, StoreError> {
        let id = row.id;
        enrich(conn, account_id, vec![row])
            .await?
            .pop()
            .ok_or_else(|| LedgerError::TransactionNotFound(id).into())
    }
}
