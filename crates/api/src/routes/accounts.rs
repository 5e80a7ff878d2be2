//! Account and member routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use kasku_db::entities::{accounts, members};
use kasku_db::repositories::{AccountRepository, CreateAccountInput, MemberRepository};
use kasku_shared::AppError;

use crate::{AppState, error::ApiResult};

/// Creates the account and member routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", post(create_account))
        .route("/accounts/{slug}", get(get_account).delete(delete_account))
        .route("/members", post(create_member))
        .route("/members/{member_id}", get(get_member))
}

/// Request body for creating an account.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    /// URL slug.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Owning member.
    pub owner_id: Uuid,
}

/// Response for an account.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    /// Account ID.
    pub id: Uuid,
    /// URL slug.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Owning member.
    pub owner_id: Uuid,
    /// Created at timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<accounts::Model> for AccountResponse {
    fn from(account: accounts::Model) -> Self {
        Self {
            id: account.id,
            slug: account.slug,
            name: account.name,
            owner_id: account.owner_id,
            created_at: account.created_at.with_timezone(&Utc),
        }
    }
}

/// Request body for registering a member.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemberRequest {
    /// Name shown on activity rows.
    pub display_name: String,
    /// Unique email.
    pub email: String,
    /// Avatar URL.
    pub avatar_url: Option<String>,
}

/// Response for a member.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
    /// Member ID.
    pub id: Uuid,
    /// Display name.
    pub display_name: String,
    /// Email.
    pub email: String,
    /// Avatar URL.
    pub avatar_url: Option<String>,
}

impl From<members::Model> for MemberResponse {
    fn from(member: members::Model) -> Self {
        Self {
            id: member.id,
            display_name: member.display_name,
            email: member.email,
            avatar_url: member.avatar_url,
        }
    }
}

/// POST `/accounts` - Create an account.
async fn create_account(
    State(state): State<AppState>,
    Json(payload): Json<CreateAccountRequest>,
) -> ApiResult<(StatusCode, Json<AccountResponse>)> {
    let account = AccountRepository::new(state.conn())
        .create(CreateAccountInput {
            slug: payload.slug,
            name: payload.name,
            owner_id: payload.owner_id,
        })
        .await?;

    info!(account_id = %account.id, slug = %account.slug, "Account created");
    Ok((StatusCode::CREATED, Json(account.into())))
}

/// GET `/accounts/{slug}` - Resolve an account.
async fn get_account(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<AccountResponse>> {
    let account = AccountRepository::new(state.conn())
        .resolve_slug(&slug)
        .await?;
    Ok(Json(account.into()))
}

/// DELETE `/accounts/{slug}` - Delete an account and everything it owns.
async fn delete_account(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<StatusCode> {
    AccountRepository::new(state.conn())
        .delete_cascade(&slug)
        .await?;

    info!(%slug, "Account deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST `/members` - Register a member.
async fn create_member(
    State(state): State<AppState>,
    Json(payload): Json<CreateMemberRequest>,
) -> ApiResult<(StatusCode, Json<MemberResponse>)> {
    if payload.display_name.trim().is_empty() {
        return Err(AppError::Validation("displayName must not be blank".into()).into());
    }
    if !payload.email.contains('@') {
        return Err(AppError::Validation("email is not valid".into()).into());
    }

    let repo = MemberRepository::new(state.conn());
    if repo.find_by_email(&payload.email).await?.is_some() {
        let message = format!("email {} is already registered", payload.email);
        return Err(AppError::Conflict(message).into());
    }

    let member = repo
        .create(&payload.display_name, &payload.email, payload.avatar_url)
        .await?;

    info!(member_id = %member.id, "Member created");
    Ok((StatusCode::CREATED, Json(member.into())))
}

/// GET `/members/{member_id}` - One member.
async fn get_member(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
) -> ApiResult<Json<MemberResponse>> {
    let member = MemberRepository::new(state.conn())
        .find_by_id(member_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("member {member_id}")))?;
    Ok(Json(member.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_response_shape() {
        let now = chrono::Utc::now().into();
        let response = AccountResponse::from(accounts::Model {
            id: Uuid::nil(),
            slug: "rumah-kita".into(),
            name: "Rumah Kita".into(),
            owner_id: Uuid::nil(),
            created_at: now,
            updated_at: now,
        });
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["slug"], "rumah-kita");
        assert!(json.get("ownerId").is_some());
    }

    #[test]
    fn test_member_request_avatar_optional() {
        let request: CreateMemberRequest =
            serde_json::from_str(r#"{"displayName":"Sari","email":"sari@kasku.dev"}"#).unwrap();
        assert!(request.avatar_url.is_none());
    }
}
