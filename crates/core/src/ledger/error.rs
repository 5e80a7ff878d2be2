//! Ledger error types.
//!
//! Every variant aborts the enclosing atomic store transaction. None of them
//! is produced for a partially applied operation.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========== Scope Errors ==========
    /// No account matches the given slug.
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// No wallet with that id exists under the account.
    #[error("Wallet not found: {0}")]
    WalletNotFound(Uuid),

    /// No transaction with that id exists under the account.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),

    /// A member id given as owner or actor names no member.
    #[error("Member not found: {0}")]
    MemberNotFound(Uuid),

    // ========== Balance Errors ==========
    /// Applying the delta would drive the wallet below zero.
    #[error("Insufficient balance in wallet {wallet_id}: balance {balance}, delta {delta}")]
    InsufficientBalance {
        /// The wallet that would go negative.
        wallet_id: Uuid,
        /// Balance before the rejected delta.
        balance: Decimal,
        /// The rejected signed delta.
        delta: Decimal,
    },

    // ========== Validation Errors ==========
    /// Amount is zero or negative where a positive value is required.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Source and target wallet of a transfer are the same.
    #[error("Cannot transfer between the same wallet")]
    InvalidTransfer,

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

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::WalletNotFound(_) => "WALLET_NOT_FOUND",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::MemberNotFound(_) => "MEMBER_NOT_FOUND",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::InvalidTransfer => "INVALID_TRANSFER",
            Self::BlankField(_) | Self::FieldTooLong { .. } => "VALIDATION_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - malformed input
            Self::InvalidAmount(_)
            | Self::InvalidTransfer
            | Self::BlankField(_)
            | Self::FieldTooLong { .. } => 400,

            // 404 Not Found
            Self::AccountNotFound(_)
            | Self::WalletNotFound(_)
            | Self::TransactionNotFound(_)
            | Self::MemberNotFound(_) => 404,

            // 422 Unprocessable - well-formed but violates the balance rule
            Self::InsufficientBalance { .. } => 422,
        }
    }

    /// Returns true if this error is retryable.
    ///
    /// Ledger rule violations are user-input errors. Retrying the same input
    /// fails the same way.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        false
    }
}
