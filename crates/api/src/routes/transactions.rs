//! Transaction routes.
//!
//! Create, update and delete go through the ledger service, which applies
//! the wallet effect and writes one activity row in the same database
//! transaction.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use kasku_core::ledger::TransactionType;
use kasku_db::repositories::{
    ActivityEntry, ActivityRepository, CreateTransactionInput, EnrichedTransaction,
    TransactionFilter, TransactionRepository, UpdateTransactionInput,
};
use kasku_shared::types::{PageRequest, PageResponse};

use super::resolve_account;
use crate::{AppState, error::ApiResult, extractors::ActingMember};

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/accounts/{slug}/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route(
            "/accounts/{slug}/transactions/{transaction_id}",
            get(get_transaction)
                .patch(update_transaction)
                .delete(delete_transaction),
        )
        .route(
            "/accounts/{slug}/transactions/{transaction_id}/history",
            get(transaction_history),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing transactions.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTransactionsQuery {
    /// Filter by transaction type.
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
    /// Filter by wallet.
    pub wallet_id: Option<Uuid>,
    /// Filter by exact category.
    pub category: Option<String>,
    /// Inclusive lower bound on `occurredAt`.
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `occurredAt`.
    pub to: Option<DateTime<Utc>>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size (max 100).
    #[serde(alias = "per_page")]
    pub per_page: Option<u32>,
}

impl ListTransactionsQuery {
    fn into_parts(self) -> (TransactionFilter, PageRequest) {
        let defaults = PageRequest::default();
        (
            TransactionFilter {
                transaction_type: self.transaction_type,
                wallet_id: self.wallet_id,
                category: self.category,
                from: self.from,
                to: self.to,
            },
            PageRequest {
                page: self.page.unwrap_or(defaults.page),
                per_page: self.per_page.unwrap_or(defaults.per_page),
            },
        )
    }
}

/// Request body for creating a transaction.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    /// `income` or `expense`.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Title.
    pub title: String,
    /// Category.
    pub category: String,
    /// Positive amount, as a string or a number.
    pub amount: Decimal,
    /// When the money moved; defaults to now.
    pub occurred_at: Option<DateTime<Utc>>,
    /// Wallet to credit or debit.
    pub wallet_id: Option<Uuid>,
    /// Owning member.
    pub member_id: Option<Uuid>,
    /// Free text.
    pub description: Option<String>,
}

/// Request body for updating a transaction.
///
/// Absent fields are kept; `null` clears `walletId`, `memberId` and
/// `description`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransactionRequest {
    /// `income` or `expense`.
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
    /// Title.
    pub title: Option<String>,
    /// Category.
    pub category: Option<String>,
    /// Positive amount.
    pub amount: Option<Decimal>,
    /// When the money moved.
    pub occurred_at: Option<DateTime<Utc>>,
    /// Attached wallet.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub wallet_id: Option<Option<Uuid>>,
    /// Owning member.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub member_id: Option<Option<Uuid>>,
    /// Free text.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub description: Option<Option<String>>,
}

impl From<UpdateTransactionRequest> for UpdateTransactionInput {
    fn from(request: UpdateTransactionRequest) -> Self {
        Self {
            transaction_type: request.transaction_type,
            title: request.title,
            category: request.category,
            amount: request.amount,
            occurred_at: request.occurred_at,
            wallet_id: request.wallet_id,
            description: request.description,
            member_id: request.member_id,
        }
    }
}

/// Response for a deleted transaction.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    /// Always true on success.
    pub success: bool,
    /// Deleted transaction.
    pub id: Uuid,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/accounts/{slug}/transactions` - List transactions, newest first.
async fn list_transactions(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<ListTransactionsQuery>,
) -> ApiResult<Json<PageResponse<EnrichedTransaction>>> {
    let account_id = resolve_account(&state, &slug).await?;
    let (filter, page) = query.into_parts();

    let page = TransactionRepository::new(state.conn())
        .list(account_id, filter, page)
        .await?;
    Ok(Json(page))
}

/// POST `/accounts/{slug}/transactions` - Create a transaction.
async fn create_transaction(
    State(state): State<AppState>,
    actor: ActingMember,
    Path(slug): Path<String>,
    Json(payload): Json<CreateTransactionRequest>,
) -> ApiResult<(StatusCode, Json<EnrichedTransaction>)> {
    let account_id = resolve_account(&state, &slug).await?;

    let created = TransactionRepository::new(state.conn())
        .create(
            account_id,
            actor.id(),
            CreateTransactionInput {
                transaction_type: payload.transaction_type,
                title: payload.title,
                category: payload.category,
                amount: payload.amount,
                occurred_at: payload.occurred_at.unwrap_or_else(Utc::now),
                wallet_id: payload.wallet_id,
                member_id: payload.member_id,
                description: payload.description,
            },
        )
        .await?;

    info!(
        transaction_id = %created.transaction.id,
        %slug,
        "Transaction created"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET `/accounts/{slug}/transactions/{transaction_id}` - One transaction.
async fn get_transaction(
    State(state): State<AppState>,
    Path((slug, transaction_id)): Path<(String, Uuid)>,
) -> ApiResult<Json<EnrichedTransaction>> {
    let account_id = resolve_account(&state, &slug).await?;
    let transaction = TransactionRepository::new(state.conn())
        .get(account_id, transaction_id)
        .await?;
    Ok(Json(transaction))
}

/// PATCH `/accounts/{slug}/transactions/{transaction_id}` - Update fields.
async fn update_transaction(
    State(state): State<AppState>,
    actor: ActingMember,
    Path((slug, transaction_id)): Path<(String, Uuid)>,
    Json(payload): Json<UpdateTransactionRequest>,
) -> ApiResult<Json<EnrichedTransaction>> {
    let account_id = resolve_account(&state, &slug).await?;

    let updated = TransactionRepository::new(state.conn())
        .update(account_id, transaction_id, actor.id(), payload.into())
        .await?;

    info!(%transaction_id, %slug, "Transaction updated");
    Ok(Json(updated))
}

/// DELETE `/accounts/{slug}/transactions/{transaction_id}` - Delete and
/// reverse the wallet effect.
async fn delete_transaction(
    State(state): State<AppState>,
    actor: ActingMember,
    Path((slug, transaction_id)): Path<(String, Uuid)>,
) -> ApiResult<Json<DeleteResponse>> {
    let account_id = resolve_account(&state, &slug).await?;

    let success = TransactionRepository::new(state.conn())
        .delete(account_id, transaction_id, actor.id())
        .await?;

    info!(%transaction_id, %slug, "Transaction deleted");
    Ok(Json(DeleteResponse {
        success,
        id: transaction_id,
    }))
}

/// GET `/accounts/{slug}/transactions/{transaction_id}/history` - Activity
/// rows, newest first. Still answers after the transaction is deleted.
async fn transaction_history(
    State(state): State<AppState>,
    Path((slug, transaction_id)): Path<(String, Uuid)>,
) -> ApiResult<Json<Vec<ActivityEntry>>> {
    let account_id = resolve_account(&state, &slug).await?;
    let history = ActivityRepository::new(state.conn())
        .history(account_id, transaction_id)
        .await?;
    Ok(Json(history))
}
