//! Store-level error for ledger operations.

use sea_orm::DbErr;
use thiserror::Error;

use kasku_core::ledger::LedgerError;

/// Error returned by ledger repositories.
///
/// Either a ledger rule rejected the operation or the database failed.
/// In both cases the surrounding database transaction has been rolled back.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A ledger rule rejected the operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl StoreError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Ledger(err) => err.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Ledger(err) => err.http_status_code(),
            Self::Database(_) => 500,
        }
    }

    /// Returns true if the whole operation may be retried.
    ///
    /// Only lost connections and pool timeouts qualify; the operation is
    /// all-or-nothing, so a retry either succeeds once or fails again.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Ledger(err) => err.is_retryable(),
            Self::Database(err) => matches!(err, DbErr::ConnectionAcquire(_) | DbErr::Conn(_)),
        }
    }

    /// Returns the ledger error, if any.
    #[must_use]
    pub fn as_ledger(&self) -> Option<&LedgerError> {
        match self {
            Self::Ledger(err) => Some(err),
            Self::Database(_) => None,
        }
    }
}
