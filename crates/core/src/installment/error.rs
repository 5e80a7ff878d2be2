//! Installment error types.

use thiserror::Error;
use uuid::Uuid;

/// Installment-related errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstallmentError {
    /// Installment not found.
    #[error("Installment not found: {0}")]
    NotFound(Uuid),

    /// Attached wallet does not exist under the account.
    #[error("Wallet not found: {0}")]
    WalletNotFound(Uuid),

    /// Amount is out of range.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Month counts are inconsistent.
    #[error("Paid months ({paid}) must be between 0 and total months ({total})")]
    InvalidMonths {
        /// Months already paid.
        paid: i32,
        /// Total months of the plan.
        total: i32,
    },

    /// Due day outside 1..=31.
    #[error("Due day must be between 1 and 31, got {0}")]
    InvalidDueDay(u32),

    /// Nothing left to pay.
    #[error("Installment is already paid off")]
    AlreadyPaidOff,

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

impl InstallmentError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "INSTALLMENT_NOT_FOUND",
            Self::WalletNotFound(_) => "WALLET_NOT_FOUND",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::InvalidMonths { .. } => "INVALID_MONTHS",
            Self::InvalidDueDay(_) => "INVALID_DUE_DAY",
            Self::AlreadyPaidOff => "ALREADY_PAID_OFF",
            Self::BlankField(_) | Self::FieldTooLong { .. } => "VALIDATION_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) | Self::WalletNotFound(_) => 404,
            Self::InvalidAmount(_)
            | Self::InvalidMonths { .. }
            | Self::InvalidDueDay(_)
            | Self::BlankField(_)
            | Self::FieldTooLong { .. } => 400,
            Self::AlreadyPaidOff => 409,
        }
    }
}
