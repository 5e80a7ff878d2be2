//! Account repository: slug resolution and tenant lifecycle.
//!
//! Every ledger operation is scoped by the account id resolved here.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set, TransactionTrait,
};
use tracing::{debug, warn};
use uuid::Uuid;

use kasku_core::ledger::LedgerError;
use kasku_shared::types::AccountId;

use crate::entities::{accounts, members};
use crate::error::StoreError;

/// Maximum slug length, matching the column width.
pub const MAX_SLUG_LEN: usize = 64;

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Slug already taken.
    #[error("Account slug '{0}' already exists")]
    DuplicateSlug(String),

    /// Slug is not lowercase alphanumeric words joined by single hyphens.
    #[error("Invalid account slug '{0}'")]
    InvalidSlug(String),

    /// Name is blank.
    #[error("Account name must not be blank")]
    BlankName,

    /// Owner member does not exist.
    #[error("Owner member not found: {0}")]
    OwnerNotFound(Uuid),

    /// No account with this slug.
    #[error("Account not found: {0}")]
    NotFound(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl AccountError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateSlug(_) => "DUPLICATE_SLUG",
            Self::InvalidSlug(_) | Self::BlankName => "VALIDATION_ERROR",
            Self::OwnerNotFound(_) => "MEMBER_NOT_FOUND",
            Self::NotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::DuplicateSlug(_) => 409,
            Self::InvalidSlug(_) | Self::BlankName => 400,
            Self::OwnerNotFound(_) | Self::NotFound(_) => 404,
            Self::Database(_) => 500,
        }
    }
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// URL slug, unique across all accounts.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Owning member.
    pub owner_id: Uuid,
}

/// Returns true if `slug` is lowercase ASCII alphanumeric words separated by
/// single hyphens.
#[must_use]
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= MAX_SLUG_LEN
        && slug.split('-').all(|word| {
            !word.is_empty()
                && word
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        })
}

/// Account repository.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an account owned by an existing member.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The slug is malformed or already taken
    /// - The name is blank
    /// - The owner does not exist
    pub async fn create(&self, input: CreateAccountInput) -> Result<accounts::Model, AccountError> {
        let slug = input.slug.trim().to_string();
        if !is_valid_slug(&slug) {
            return Err(AccountError::InvalidSlug(slug));
        }
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(AccountError::BlankName);
        }

        if self.slug_exists(&slug).await? {
            return Err(AccountError::DuplicateSlug(slug));
        }

        let owner_exists = members::Entity::find_by_id(input.owner_id)
            .count(&self.db)
            .await?
            > 0;
        if !owner_exists {
            return Err(AccountError::OwnerNotFound(input.owner_id));
        }

        let now = chrono::Utc::now().into();
        let account = accounts::ActiveModel {
            id: Set(AccountId::new().into_inner()),
            slug: Set(slug),
            name: Set(name),
            owner_id: Set(input.owner_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        debug!(account_id = %account.id, slug = %account.slug, "account created");
        Ok(account)
    }

    /// Checks whether a slug is taken.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn slug_exists(&self, slug: &str) -> Result<bool, DbErr> {
        let count = accounts::Entity::find()
            .filter(accounts::Column::Slug.eq(slug))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    /// Resolves an account slug to its row.
    ///
    /// # Errors
    ///
    /// `AccountNotFound` if no account carries the slug.
    pub async fn resolve_slug(&self, slug: &str) -> Result<accounts::Model, StoreError> {
        let account = accounts::Entity::find()
            .filter(accounts::Column::Slug.eq(slug))
            .one(&self.db)
            .await?;

        account.ok_or_else(|| {
            warn!(%slug, "account slug not found");
            LedgerError::AccountNotFound(slug.to_string()).into()
        })
    }

    /// Deletes an account together with its wallets, transactions, budgets
    /// and installments. Activity rows are kept.
    ///
    /// # Errors
    ///
    /// `NotFound` if no account carries the slug.
    pub async fn delete_cascade(&self, slug: &str) -> Result<(), AccountError> {
        let txn = self.db.begin().await?;

        let account = accounts::Entity::find()
            .filter(accounts::Column::Slug.eq(slug))
            .one(&txn)
            .await?
            .ok_or_else(|| AccountError::NotFound(slug.to_string()))?;

        accounts::Entity::delete_by_id(account.id).exec(&txn).await?;
        txn.commit().await?;

        debug!(account_id = %account.id, %slug, "account deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_slugs() {
        assert!(is_valid_slug("keluarga-budi"));
        assert!(is_valid_slug("home2026"));
        assert!(is_valid_slug("a"));
    }

    #[test]
    fn test_invalid_slugs() {
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("Keluarga"));
        assert!(!is_valid_slug("double--hyphen"));
        assert!(!is_valid_slug("-leading"));
        assert!(!is_valid_slug("trailing-"));
        assert!(!is_valid_slug("with space"));
        assert!(!is_valid_slug(&"a".repeat(MAX_SLUG_LEN + 1)));
    }

    #[test]
    fn test_error_mapping() {
        assert_eq!(AccountError::DuplicateSlug("x".into()).http_status_code(), 409);
        assert_eq!(AccountError::NotFound("x".into()).error_code(), "ACCOUNT_NOT_FOUND");
        assert_eq!(AccountError::BlankName.http_status_code(), 400);
    }
}
