//! Budget routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use kasku_core::budget::{BudgetDraft, BudgetPeriod};
use kasku_db::entities::budgets;
use kasku_db::repositories::{BudgetRepository, UpdateBudgetInput};

use super::resolve_account;
use crate::{AppState, error::ApiResult};

/// Creates the budget routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/accounts/{slug}/budgets",
            get(list_budgets).post(create_budget),
        )
        .route(
            "/accounts/{slug}/budgets/{budget_id}",
            get(get_budget).patch(update_budget).delete(delete_budget),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a budget.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBudgetRequest {
    /// Display name.
    pub name: String,
    /// Category the ceiling applies to.
    pub category: String,
    /// Ceiling per period.
    pub amount: Decimal,
    /// `weekly`, `monthly` or `yearly`; defaults to monthly.
    #[serde(default)]
    pub period: BudgetPeriod,
    /// First day (YYYY-MM-DD).
    pub start_date: NaiveDate,
    /// Last day (YYYY-MM-DD).
    pub end_date: Option<NaiveDate>,
}

/// Request body for updating a budget.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBudgetRequest {
    /// Display name.
    pub name: Option<String>,
    /// Category.
    pub category: Option<String>,
    /// Ceiling per period.
    pub amount: Option<Decimal>,
    /// Recurrence.
    pub period: Option<BudgetPeriod>,
    /// First day.
    pub start_date: Option<NaiveDate>,
    /// Last day; `null` makes the budget open-ended.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub end_date: Option<Option<NaiveDate>>,
}

/// Response for a budget.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetResponse {
    /// Budget ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Category.
    pub category: String,
    /// Ceiling per period.
    pub amount: Decimal,
    /// Recurrence.
    pub period: BudgetPeriod,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day.
    pub end_date: Option<NaiveDate>,
    /// Created at timestamp.
    pub created_at: DateTime<Utc>,
    /// Updated at timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<budgets::Model> for BudgetResponse {
    fn from(budget: budgets::Model) -> Self {
        Self {
            id: budget.id,
            name: budget.name,
            category: budget.category,
            amount: budget.amount,
            period: budget.period.into(),
            start_date: budget.start_date,
            end_date: budget.end_date,
            created_at: budget.created_at.with_timezone(&Utc),
            updated_at: budget.updated_at.with_timezone(&Utc),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/accounts/{slug}/budgets` - List budgets.
async fn list_budgets(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Vec<BudgetResponse>>> {
    let account_id = resolve_account(&state, &slug).await?;
    let budgets = BudgetRepository::new(state.conn()).list(account_id).await?;
    Ok(Json(budgets.into_iter().map(Into::into).collect()))
}

/// POST `/accounts/{slug}/budgets` - Create a budget.
async fn create_budget(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(payload): Json<CreateBudgetRequest>,
) -> ApiResult<(StatusCode, Json<BudgetResponse>)> {
    let account_id = resolve_account(&state, &slug).await?;

    let budget = BudgetRepository::new(state.conn())
        .create(
            account_id,
            BudgetDraft {
                name: payload.name,
                category: payload.category,
                amount: payload.amount,
                period: payload.period,
                start_date: payload.start_date,
                end_date: payload.end_date,
            },
        )
        .await?;

    info!(budget_id = %budget.id, %slug, "Budget created");
    Ok((StatusCode::CREATED, Json(budget.into())))
}

/// GET `/accounts/{slug}/budgets/{budget_id}` - One budget.
async fn get_budget(
    State(state): State<AppState>,
    Path((slug, budget_id)): Path<(String, Uuid)>,
) -> ApiResult<Json<BudgetResponse>> {
    let account_id = resolve_account(&state, &slug).await?;
    let budget = BudgetRepository::new(state.conn())
        .get(account_id, budget_id)
        .await?;
    Ok(Json(budget.into()))
}

/// PATCH `/accounts/{slug}/budgets/{budget_id}` - Update a budget.
async fn update_budget(
    State(state): State<AppState>,
    Path((slug, budget_id)): Path<(String, Uuid)>,
    Json(payload): Json<UpdateBudgetRequest>,
) -> ApiResult<Json<BudgetResponse>> {
    let account_id = resolve_account(&state, &slug).await?;

    let budget = BudgetRepository::new(state.conn())
        .update(
            account_id,
            budget_id,
            UpdateBudgetInput {
                name: payload.name,
                category: payload.category,
                amount: payload.amount,
                period: payload.period,
                start_date: payload.start_date,
                end_date: payload.end_date,
            },
        )
        .await?;

    info!(%budget_id, %slug, "Budget updated");
    Ok(Json(budget.into()))
}

/// DELETE `/accounts/{slug}/budgets/{budget_id}` - Delete a budget.
async fn delete_budget(
    State(state): State<AppState>,
    Path((slug, budget_id)): Path<(String, Uuid)>,
) -> ApiResult<StatusCode> {
    let account_id = resolve_account(&state, &slug).await?;
    BudgetRepository::new(state.conn())
        .delete(account_id, budget_id)
        .await?;

    info!(%budget_id, %slug, "Budget deleted");
    Ok(StatusCode::NO_CONTENT)
}
