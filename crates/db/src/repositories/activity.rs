//! Transaction activity log: writer and readers.
//!
//! Rows are append-only. They reference transactions by id only, so a
//! lookup for a deleted transaction still returns its history.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use kasku_core::ledger::{ActivityPayload, ActivitySummary, latest_per_key};

use crate::entities::{members, sea_orm_active_enums::ActivityAction, transaction_activities};
use crate::error::StoreError;

/// One row of a transaction's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    /// Action, actor and time.
    #[serde(flatten)]
    pub summary: ActivitySummary,
    /// Transaction the row describes.
    pub transaction_id: Uuid,
    /// Stored snapshot(s).
    pub payload: Value,
}

/// Appends one activity row inside the caller's database transaction.
pub async fn record_activity(
    txn: &DatabaseTransaction,
    account_id: Uuid,
    actor_id: Option<Uuid>,
    payload: &ActivityPayload,
) -> Result<transaction_activities::Model, StoreError> {
    let row = transaction_activities::ActiveModel {
        id: Set(Uuid::now_v7()),
        account_id: Set(account_id),
        transaction_id: Set(payload.transaction_id()),
        actor_id: Set(actor_id),
        action: Set(ActivityAction::from(payload.action())),
        payload: Set(payload.to_json()),
        created_at: Set(Utc::now().into()),
    }
    .insert(txn)
    .await?;
    Ok(row)
}

fn summarize(
    activity: &transaction_activities::Model,
    actor: Option<&members::Model>,
) -> ActivitySummary {
    ActivitySummary {
        id: activity.id,
        action: activity.action.into(),
        actor_id: activity.actor_id,
        actor_name: actor.map(|member| member.display_name.clone()),
        actor_avatar_url: actor.and_then(|member| member.avatar_url.clone()),
        created_at: activity.created_at.with_timezone(&Utc),
    }
}

/// Latest activity per transaction id, joined with the actor.
///
/// Ids without any activity row are absent from the map.
pub async fn latest_activities<C: ConnectionTrait>(
    conn: &C,
    account_id: Uuid,
    transaction_ids: &[Uuid],
) -> Result<HashMap<Uuid, ActivitySummary>, StoreError> {
    if transaction_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = transaction_activities::Entity::find()
        .filter(transaction_activities::Column::AccountId.eq(account_id))
        .filter(transaction_activities::Column::TransactionId.is_in(transaction_ids.to_vec()))
        .order_by_desc(transaction_activities::Column::CreatedAt)
        .order_by_desc(transaction_activities::Column::Id)
        .find_also_related(members::Entity)
        .all(conn)
        .await?;

    let latest = latest_per_key(rows, |(activity, _)| {
        (activity.transaction_id, activity.created_at.with_timezone(&Utc))
    });

    Ok(latest
        .into_iter()
        .map(|(transaction_id, (activity, actor))| {
            (transaction_id, summarize(&activity, actor.as_ref()))
        })
        .collect())
}

/// Read side of the activity log.
#[derive(Debug, Clone)]
pub struct ActivityRepository {
    db: DatabaseConnection,
}

impl ActivityRepository {
    /// Creates a new activity repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Latest activity per transaction id.
    pub async fn latest_for(
        &self,
        account_id: Uuid,
        transaction_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, ActivitySummary>, StoreError> {
        latest_activities(&self.db, account_id, transaction_ids).await
    }

    /// Full history of one transaction, newest first.
    ///
    /// Returns an empty list for ids that never had activity. Deleted
    /// transactions keep their history.
    pub async fn history(
        &self,
        account_id: Uuid,
        transaction_id: Uuid,
    ) -> Result<Vec<ActivityEntry>, StoreError> {
        let rows = transaction_activities::Entity::find()
            .filter(transaction_activities::Column::AccountId.eq(account_id))
            .filter(transaction_activities::Column::TransactionId.eq(transaction_id))
            .order_by_desc(transaction_activities::Column::CreatedAt)
            .order_by_desc(transaction_activities::Column::Id)
            .find_also_related(members::Entity)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(activity, actor)| ActivityEntry {
                summary: summarize(&activity, actor.as_ref()),
                transaction_id: activity.transaction_id,
                payload: activity.payload,
            })
            .collect())
    }

    /// Number of activity rows recorded for a transaction.
    pub async fn count_for(&self, account_id: Uuid, transaction_id: Uuid) -> Result<u64, StoreError> {
        let count = transaction_activities::Entity::find()
            .filter(transaction_activities::Column::AccountId.eq(account_id))
            .filter(transaction_activities::Column::TransactionId.eq(transaction_id))
            .count(&self.db)
            .await?;
        Ok(count)
    }
}
