//! Installment routes.
//!
//! Payments only move the repayment schedule; wallet balances are left
//! alone.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use kasku_core::installment::{InstallmentDraft, InstallmentStatus};
use kasku_db::entities::installments;
use kasku_db::repositories::{
    CreateInstallmentInput, InstallmentRepository, UpdateInstallmentInput, effective_status,
};

use super::resolve_account;
use crate::{AppState, error::ApiResult};

/// Creates the installment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/accounts/{slug}/installments",
            get(list_installments).post(create_installment),
        )
        .route(
            "/accounts/{slug}/installments/{installment_id}",
            get(get_installment)
                .patch(update_installment)
                .delete(delete_installment),
        )
        .route(
            "/accounts/{slug}/installments/{installment_id}/payments",
            post(record_payment),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating an installment.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInstallmentRequest {
    /// Display name.
    pub name: String,
    /// Amount due every month.
    pub monthly_amount: Decimal,
    /// Amount still owed; defaults to `monthlyAmount * totalMonths`.
    pub remaining_amount: Option<Decimal>,
    /// Length of the plan in months.
    pub total_months: i32,
    /// Months already paid.
    #[serde(default)]
    pub paid_months: i32,
    /// Day of month the payment is due (1-31).
    pub due_day: u32,
    /// Next due date (YYYY-MM-DD).
    pub next_due_date: NaiveDate,
    /// Wallet the payments usually come from.
    pub wallet_id: Option<Uuid>,
    /// Free text.
    pub notes: Option<String>,
}

impl From<CreateInstallmentRequest> for CreateInstallmentInput {
    fn from(request: CreateInstallmentRequest) -> Self {
        // Overflow falls through to validation as an out-of-range amount.
        let remaining = request.remaining_amount.unwrap_or_else(|| {
            let months = request.total_months.saturating_sub(request.paid_months);
            request
                .monthly_amount
                .checked_mul(Decimal::from(months))
                .unwrap_or(Decimal::MAX)
        });
        Self {
            draft: InstallmentDraft {
                name: request.name,
                monthly_amount: request.monthly_amount,
                remaining_amount: remaining,
                total_months: request.total_months,
                paid_months: request.paid_months,
                due_day: request.due_day,
                next_due_date: request.next_due_date,
            },
            wallet_id: request.wallet_id,
            notes: request.notes,
        }
    }
}

/// Request body for updating an installment.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInstallmentRequest {
    /// Display name.
    pub name: Option<String>,
    /// Amount due every month.
    pub monthly_amount: Option<Decimal>,
    /// Amount still owed.
    pub remaining_amount: Option<Decimal>,
    /// Length of the plan.
    pub total_months: Option<i32>,
    /// Months already paid.
    pub paid_months: Option<i32>,
    /// Day of month the payment is due.
    pub due_day: Option<u32>,
    /// Next due date.
    pub next_due_date: Option<NaiveDate>,
    /// Attached wallet; `null` detaches it.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub wallet_id: Option<Option<Uuid>>,
    /// Notes; `null` clears them.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub notes: Option<Option<String>>,
}

impl From<UpdateInstallmentRequest> for UpdateInstallmentInput {
    fn from(request: UpdateInstallmentRequest) -> Self {
        Self {
            name: request.name,
            monthly_amount: request.monthly_amount,
            remaining_amount: request.remaining_amount,
            total_months: request.total_months,
            paid_months: request.paid_months,
            due_day: request.due_day,
            next_due_date: request.next_due_date,
            wallet_id: request.wallet_id,
            notes: request.notes,
        }
    }
}

/// Request body for a payment.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentRequest {
    /// Amount paid; defaults to the monthly amount.
    pub amount: Option<Decimal>,
}

/// Response for an installment.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentResponse {
    /// Installment ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Wallet the payments usually come from.
    pub wallet_id: Option<Uuid>,
    /// Amount due every month.
    pub monthly_amount: Decimal,
    /// Amount still owed.
    pub remaining_amount: Decimal,
    /// Length of the plan.
    pub total_months: i32,
    /// Months already paid.
    pub paid_months: i32,
    /// Day of month the payment is due.
    pub due_day: i16,
    /// Next due date.
    pub next_due_date: NaiveDate,
    /// Status as of today.
    pub status: InstallmentStatus,
    /// Notes.
    pub notes: Option<String>,
    /// Created at timestamp.
    pub created_at: DateTime<Utc>,
    /// Updated at timestamp.
    pub updated_at: DateTime<Utc>,
}

impl InstallmentResponse {
    fn from_model(row: installments::Model, today: NaiveDate) -> Self {
        let status = effective_status(&row, today);
        Self {
            id: row.id,
            name: row.name,
            wallet_id: row.wallet_id,
            monthly_amount: row.monthly_amount,
            remaining_amount: row.remaining_amount,
            total_months: row.total_months,
            paid_months: row.paid_months,
            due_day: row.due_day,
            next_due_date: row.next_due_date,
            status,
            notes: row.notes,
            created_at: row.created_at.with_timezone(&Utc),
            updated_at: row.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<installments::Model> for InstallmentResponse {
    fn from(row: installments::Model) -> Self {
        Self::from_model(row, Utc::now().date_naive())
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/accounts/{slug}/installments` - List by next due date.
async fn list_installments(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Vec<InstallmentResponse>>> {
    let account_id = resolve_account(&state, &slug).await?;
    let rows = InstallmentRepository::new(state.conn())
        .list(account_id)
        .await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// POST `/accounts/{slug}/installments` - Create an installment.
async fn create_installment(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(payload): Json<CreateInstallmentRequest>,
) -> ApiResult<(StatusCode, Json<InstallmentResponse>)> {
    let account_id = resolve_account(&state, &slug).await?;

    let row = InstallmentRepository::new(state.conn())
        .create(account_id, payload.into())
        .await?;

    info!(installment_id = %row.id, %slug, "Installment created");
    Ok((StatusCode::CREATED, Json(row.into())))
}

/// GET `/accounts/{slug}/installments/{installment_id}` - One installment.
async fn get_installment(
    State(state): State<AppState>,
    Path((slug, installment_id)): Path<(String, Uuid)>,
) -> ApiResult<Json<InstallmentResponse>> {
    let account_id = resolve_account(&state, &slug).await?;
    let row = InstallmentRepository::new(state.conn())
        .get(account_id, installment_id)
        .await?;
    Ok(Json(row.into()))
}

/// PATCH `/accounts/{slug}/installments/{installment_id}` - Update fields.
async fn update_installment(
    State(state): State<AppState>,
    Path((slug, installment_id)): Path<(String, Uuid)>,
    Json(payload): Json<UpdateInstallmentRequest>,
) -> ApiResult<Json<InstallmentResponse>> {
    let account_id = resolve_account(&state, &slug).await?;

    let row = InstallmentRepository::new(state.conn())
        .update(account_id, installment_id, payload.into())
        .await?;

    info!(%installment_id, %slug, "Installment updated");
    Ok(Json(row.into()))
}

/// DELETE `/accounts/{slug}/installments/{installment_id}` - Delete.
async fn delete_installment(
    State(state): State<AppState>,
    Path((slug, installment_id)): Path<(String, Uuid)>,
) -> ApiResult<StatusCode> {
    let account_id = resolve_account(&state, &slug).await?;
    InstallmentRepository::new(state.conn())
        .delete(account_id, installment_id)
        .await?;

    info!(%installment_id, %slug, "Installment deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST `/accounts/{slug}/installments/{installment_id}/payments` - Record
/// one monthly payment.
async fn record_payment(
    State(state): State<AppState>,
    Path((slug, installment_id)): Path<(String, Uuid)>,
    Json(payload): Json<RecordPaymentRequest>,
) -> ApiResult<Json<InstallmentResponse>> {
    let account_id = resolve_account(&state, &slug).await?;

    let row = InstallmentRepository::new(state.conn())
        .record_payment(account_id, installment_id, payload.amount)
        .await?;

    info!(
        %installment_id,
        remaining = %row.remaining_amount,
        paid_months = row.paid_months,
        "Installment payment recorded"
    );
    Ok(Json(row.into()))
}
