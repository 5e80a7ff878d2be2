//! Budget error types.

use thiserror::Error;
use uuid::Uuid;

/// Budget-related errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BudgetError {
    /// Budget not found.
    #[error("Budget not found: {0}")]
    NotFound(Uuid),

    /// Ceiling must be greater than zero.
    #[error("Budget amount must be greater than zero")]
    NonPositiveAmount,

    /// Ceiling exceeds what a money column holds.
    #[error("Budget amount must not exceed {}", kasku_shared::types::MAX_MONEY)]
    AmountOutOfRange,

    /// End date precedes start date.
    #[error("Budget end date must not be before its start date")]
    InvalidDateRange,

    /// A required text field is blank.
    #[error("Field '{0}' must not be blank")]
    BlankField(&'static str),

    /// A text field exceeds its column width.
    #[error("Field '{field}' must be at most {max} characters")]
    FieldTooLong {
        /// The offending field.
        field: &'static str,
        /// Maximum length in characters.
        max: usize,
    },
}

impl BudgetError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "BUDGET_NOT_FOUND",
            Self::NonPositiveAmount | Self::AmountOutOfRange => "INVALID_AMOUNT",
            Self::InvalidDateRange => "INVALID_DATE_RANGE",
            Self::BlankField(_) | Self::FieldTooLong { .. } => "VALIDATION_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::NonPositiveAmount
            | Self::AmountOutOfRange
            | Self::InvalidDateRange
            | Self::BlankField(_)
            | Self::FieldTooLong { .. } => 400,
        }
    }
}
