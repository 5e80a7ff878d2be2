//! Wallet routes: CRUD, direct adjustments and transfers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use kasku_core::ledger::{AdjustmentDirection, WalletType};
use kasku_db::entities::wallets;
use kasku_db::repositories::{
    CreateWalletInput, TransferInput, TransferOutcome, TransferRepository, UpdateWalletInput,
    WalletRepository,
};

use super::resolve_account;
use crate::{AppState, error::ApiResult, extractors::ActingMember};

/// Creates the wallet routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/accounts/{slug}/wallets",
            get(list_wallets).post(create_wallet),
        )
        .route("/accounts/{slug}/wallets/transfer", post(transfer))
        .route(
            "/accounts/{slug}/wallets/{wallet_id}",
            get(get_wallet).patch(update_wallet).delete(delete_wallet),
        )
        .route("/accounts/{slug}/wallets/{wallet_id}/adjust", post(adjust_wallet))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a wallet.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWalletRequest {
    /// Display name.
    pub name: String,
    /// `bank`, `e_wallet`, `credit_card` or `cash`.
    #[serde(rename = "type")]
    pub wallet_type: WalletType,
    /// Provider.
    pub provider: Option<String>,
    /// Account number.
    pub account_number: Option<String>,
    /// Display color.
    pub color: Option<String>,
    /// Opening balance; defaults to zero.
    #[serde(default)]
    pub initial_balance: Decimal,
}

/// Request body for updating a wallet's display fields.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWalletRequest {
    /// Display name.
    pub name: Option<String>,
    /// Wallet type.
    #[serde(rename = "type")]
    pub wallet_type: Option<WalletType>,
    /// Provider; `null` clears it.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub provider: Option<Option<String>>,
    /// Account number; `null` clears it.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub account_number: Option<Option<String>>,
    /// Display color.
    pub color: Option<String>,
}

/// Request body for a direct adjustment.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustWalletRequest {
    /// `increase` or `decrease`, sent as `action` (`type` also accepted).
    #[serde(rename = "action", alias = "type")]
    pub direction: AdjustmentDirection,
    /// Positive amount.
    pub amount: Decimal,
}

/// Request body for a transfer.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    /// Wallet to debit.
    pub source_wallet_id: Uuid,
    /// Wallet to credit.
    pub target_wallet_id: Uuid,
    /// Positive amount.
    pub amount: Decimal,
    /// Optional note.
    pub note: Option<String>,
    /// When the transfer happened; defaults to now.
    pub occurred_at: Option<DateTime<Utc>>,
}

/// Response for a wallet.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletResponse {
    /// Wallet ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Wallet type.
    #[serde(rename = "type")]
    pub wallet_type: WalletType,
    /// Provider.
    pub provider: Option<String>,
    /// Account number.
    pub account_number: Option<String>,
    /// Display color.
    pub color: String,
    /// Current balance.
    pub balance: Decimal,
    /// Created at timestamp.
    pub created_at: DateTime<Utc>,
    /// Updated at timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<wallets::Model> for WalletResponse {
    fn from(wallet: wallets::Model) -> Self {
        Self {
            id: wallet.id,
            name: wallet.name,
            wallet_type: wallet.wallet_type.into(),
            provider: wallet.provider,
            account_number: wallet.account_number,
            color: wallet.color,
            balance: wallet.balance,
            created_at: wallet.created_at.with_timezone(&Utc),
            updated_at: wallet.updated_at.with_timezone(&Utc),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/accounts/{slug}/wallets` - List wallets by name.
async fn list_wallets(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Vec<WalletResponse>>> {
    let account_id = resolve_account(&state, &slug).await?;
    let wallets = WalletRepository::new(state.conn()).list(account_id).await?;
    Ok(Json(wallets.into_iter().map(Into::into).collect()))
}

/// POST `/accounts/{slug}/wallets` - Create a wallet.
async fn create_wallet(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(payload): Json<CreateWalletRequest>,
) -> ApiResult<(StatusCode, Json<WalletResponse>)> {
    let account_id = resolve_account(&state, &slug).await?;

    let wallet = WalletRepository::new(state.conn())
        .create(
            account_id,
            CreateWalletInput {
                name: payload.name,
                wallet_type: payload.wallet_type,
                provider: payload.provider,
                account_number: payload.account_number,
                color: payload.color,
                initial_balance: payload.initial_balance,
            },
        )
        .await?;

    info!(wallet_id = %wallet.id, %slug, "Wallet created");
    Ok((StatusCode::CREATED, Json(wallet.into())))
}

/// GET `/accounts/{slug}/wallets/{wallet_id}` - One wallet.
async fn get_wallet(
    State(state): State<AppState>,
    Path((slug, wallet_id)): Path<(String, Uuid)>,
) -> ApiResult<Json<WalletResponse>> {
    let account_id = resolve_account(&state, &slug).await?;
    let wallet = WalletRepository::new(state.conn())
        .get(account_id, wallet_id)
        .await?;
    Ok(Json(wallet.into()))
}

/// PATCH `/accounts/{slug}/wallets/{wallet_id}` - Update display fields.
async fn update_wallet(
    State(state): State<AppState>,
    Path((slug, wallet_id)): Path<(String, Uuid)>,
    Json(payload): Json<UpdateWalletRequest>,
) -> ApiResult<Json<WalletResponse>> {
    let account_id = resolve_account(&state, &slug).await?;

    let wallet = WalletRepository::new(state.conn())
        .update(
            account_id,
            wallet_id,
            UpdateWalletInput {
                name: payload.name,
                wallet_type: payload.wallet_type,
                provider: payload.provider,
                account_number: payload.account_number,
                color: payload.color,
            },
        )
        .await?;

    info!(%wallet_id, %slug, "Wallet updated");
    Ok(Json(wallet.into()))
}

/// DELETE `/accounts/{slug}/wallets/{wallet_id}` - Delete and detach
/// referencing transactions and installments.
async fn delete_wallet(
    State(state): State<AppState>,
    Path((slug, wallet_id)): Path<(String, Uuid)>,
) -> ApiResult<StatusCode> {
    let account_id = resolve_account(&state, &slug).await?;
    WalletRepository::new(state.conn())
        .delete(account_id, wallet_id)
        .await?;

    info!(%wallet_id, %slug, "Wallet deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST `/accounts/{slug}/wallets/{wallet_id}/adjust` - Increase or
/// decrease a balance directly.
async fn adjust_wallet(
    State(state): State<AppState>,
    Path((slug, wallet_id)): Path<(String, Uuid)>,
    Json(payload): Json<AdjustWalletRequest>,
) -> ApiResult<Json<WalletResponse>> {
    let account_id = resolve_account(&state, &slug).await?;

    let wallet = WalletRepository::new(state.conn())
        .adjust(account_id, wallet_id, payload.direction, payload.amount)
        .await?;

    info!(
        %wallet_id,
        direction = ?payload.direction,
        amount = %payload.amount,
        "Wallet adjusted"
    );
    Ok(Json(wallet.into()))
}

/// POST `/accounts/{slug}/wallets/transfer` - Move money between wallets.
async fn transfer(
    State(state): State<AppState>,
    actor: ActingMember,
    Path(slug): Path<String>,
    Json(payload): Json<TransferRequest>,
) -> ApiResult<(StatusCode, Json<TransferOutcome>)> {
    let account_id = resolve_account(&state, &slug).await?;

    let outcome = TransferRepository::new(state.conn())
        .transfer(
            account_id,
            actor.id(),
            TransferInput {
                source_wallet_id: payload.source_wallet_id,
                target_wallet_id: payload.target_wallet_id,
                amount: payload.amount,
                note: payload.note,
                occurred_at: payload.occurred_at,
                member_id: actor.id(),
            },
        )
        .await?;

    info!(
        source_wallet_id = %payload.source_wallet_id,
        target_wallet_id = %payload.target_wallet_id,
        %slug,
        "Transfer completed"
    );
    Ok((StatusCode::CREATED, Json(outcome)))
}
