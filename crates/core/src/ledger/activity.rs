//! Transaction activity payloads and latest-activity selection.
//!
//! Activity rows reference transactions by id only. A row outlives the
//! transaction it describes, so readers must tolerate ids that no longer
//! resolve.

use std::collections::HashMap;
use std::hash::Hash;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use super::types::{ActivityAction, TransactionSnapshot};

/// What a mutation did to a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityPayload {
    /// The new row.
    Created(TransactionSnapshot),
    /// The row before and after the edit.
    Updated {
        /// Stored row before the edit.
        before: Box<TransactionSnapshot>,
        /// Row as persisted by the edit.
        after: Box<TransactionSnapshot>,
    },
    /// The row that was removed.
    Deleted(TransactionSnapshot),
}

impl ActivityPayload {
    /// Action recorded for this payload.
    #[must_use]
    pub fn action(&self) -> ActivityAction {
        match self {
            Self::Created(_) => ActivityAction::Create,
            Self::Updated { .. } => ActivityAction::Update,
            Self::Deleted(_) => ActivityAction::Delete,
        }
    }

    /// Id of the transaction the payload describes.
    #[must_use]
    pub fn transaction_id(&self) -> Uuid {
        match self {
            Self::Created(snapshot) | Self::Deleted(snapshot) => snapshot.id,
            Self::Updated { after, .. } => after.id,
        }
    }

    /// JSON stored in the activity row.
    ///
    /// `create` stores the snapshot itself, `update` stores
    /// `{ before, after }`, `delete` stores `{ before }`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Created(snapshot) => json!(snapshot),
            Self::Updated { before, after } => json!({ "before": before, "after": after }),
            Self::Deleted(before) => json!({ "before": before }),
        }
    }
}

/// Most recent activity shown next to a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    /// Activity row id.
    pub id: Uuid,
    /// What happened.
    pub action: ActivityAction,
    /// Member who made the change, if known.
    pub actor_id: Option<Uuid>,
    /// Actor's display name.
    pub actor_name: Option<String>,
    /// Actor's avatar.
    pub actor_avatar_url: Option<String>,
    /// When the change was recorded.
    pub created_at: DateTime<Utc>,
}

/// Keeps the newest item per key.
///
/// On equal timestamps the first item seen wins, so callers that already
/// order rows newest first get exactly that row back.
pub fn latest_per_key<T, K, F>(items: impl IntoIterator<Item = T>, key: F) -> HashMap<K, T>
where
    K: Eq + Hash,
    F: Fn(&T) -> (K, DateTime<Utc>),
{
    let mut latest: HashMap<K, (DateTime<Utc>, T)> = HashMap::new();
    for item in items {
        let (k, at) = key(&item);
        match latest.get(&k) {
            Some((seen_at, _)) if *seen_at >= at => {}
            _ => {
                latest.insert(k, (at, item));
            }
        }
    }
    latest.into_iter().map(|(k, (_, item))| (k, item)).collect()
}
