//! API error type and its JSON rendering.
//!
//! Every failure becomes `{ "error": CODE, "message": text }` with the
//! mapped HTTP status. Database and internal failures are logged and
//! answered with a generic message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use kasku_db::StoreError;
use kasku_db::repositories::{AccountError, BudgetStoreError, InstallmentStoreError};
use kasku_shared::AppError;

/// Error returned by handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Ledger rule or store failure.
    Store(StoreError),
    /// Account lifecycle failure.
    Account(AccountError),
    /// Budget failure.
    Budget(BudgetStoreError),
    /// Installment failure.
    Installment(InstallmentStoreError),
    /// Request-level failure.
    App(AppError),
}

impl ApiError {
    /// Status, code, message and whether the details must stay hidden.
    fn parts(&self) -> (u16, &'static str, String, bool) {
        match self {
            Self::Store(err) => (
                err.http_status_code(),
                err.error_code(),
                err.to_string(),
                matches!(err, StoreError::Database(_)),
            ),
            Self::Account(err) => (
                err.http_status_code(),
                err.error_code(),
                err.to_string(),
                matches!(err, AccountError::Database(_)),
            ),
            Self::Budget(err) => (
                err.http_status_code(),
                err.error_code(),
                err.to_string(),
                matches!(err, BudgetStoreError::Database(_)),
            ),
            Self::Installment(err) => (
                err.http_status_code(),
                err.error_code(),
                err.to_string(),
                matches!(err, InstallmentStoreError::Database(_)),
            ),
            Self::App(err) => (
                err.status_code(),
                err.error_code(),
                err.to_string(),
                err.is_internal(),
            ),
        }
    }

    /// Shorthand for a 400 validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::App(AppError::Validation(message.into()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, internal) = self.parts();
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = if internal {
            error!(error = %message, code, "request failed");
            "An error occurred".to_string()
        } else {
            message
        };

        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        Self::Account(err)
    }
}

impl From<BudgetStoreError> for ApiError {
    fn from(err: BudgetStoreError) -> Self {
        Self::Budget(err)
    }
}

impl From<InstallmentStoreError> for ApiError {
    fn from(err: InstallmentStoreError) -> Self {
        Self::Installment(err)
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Store(StoreError::Database(err))
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
