//! Budget repository.
//!
//! Budgets are spending ceilings per category. They never touch wallets or
//! transactions.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::debug;
use uuid::Uuid;

use kasku_core::budget::{BudgetDraft, BudgetError, BudgetPeriod, BudgetService};
use kasku_shared::types::BudgetId;

use crate::entities::budgets;

/// Error types for budget storage.
#[derive(Debug, thiserror::Error)]
pub enum BudgetStoreError {
    /// A budget rule rejected the input, or the budget is missing.
    #[error(transparent)]
    Budget(#[from] BudgetError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl BudgetStoreError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Budget(err) => err.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Budget(err) => err.http_status_code(),
            Self::Database(_) => 500,
        }
    }
}

/// Input for updating a budget. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdateBudgetInput {
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
    /// Last day; `Some(None)` makes the budget open-ended.
    pub end_date: Option<Option<NaiveDate>>,
}

fn draft_of(budget: &budgets::Model) -> BudgetDraft {
    BudgetDraft {
        name: budget.name.clone(),
        category: budget.category.clone(),
        amount: budget.amount,
        period: budget.period.into(),
        start_date: budget.start_date,
        end_date: budget.end_date,
    }
}

/// Budget repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct BudgetRepository {
    db: DatabaseConnection,
}

impl BudgetRepository {
    /// Creates a new budget repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a budget.
    pub async fn create(
        &self,
        account_id: Uuid,
        draft: BudgetDraft,
    ) -> Result<budgets::Model, BudgetStoreError> {
        let draft = BudgetService::validate(draft)?;

        let now = Utc::now().into();
        let budget = budgets::ActiveModel {
            id: Set(BudgetId::new().into_inner()),
            account_id: Set(account_id),
            name: Set(draft.name),
            category: Set(draft.category),
            amount: Set(draft.amount),
            period: Set(draft.period.into()),
            start_date: Set(draft.start_date),
            end_date: Set(draft.end_date),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        debug!(budget_id = %budget.id, %account_id, "budget created");
        Ok(budget)
    }

    /// Lists budgets ordered by category then name.
    pub async fn list(&self, account_id: Uuid) -> Result<Vec<budgets::Model>, BudgetStoreError> {
        let budgets = budgets::Entity::find()
            .filter(budgets::Column::AccountId.eq(account_id))
            .order_by_asc(budgets::Column::Category)
            .order_by_asc(budgets::Column::Name)
            .all(&self.db)
            .await?;
        Ok(budgets)
    }

    /// Gets one budget.
    pub async fn get(
        &self,
        account_id: Uuid,
        budget_id: Uuid,
    ) -> Result<budgets::Model, BudgetStoreError> {
        let budget = budgets::Entity::find_by_id(budget_id)
            .filter(budgets::Column::AccountId.eq(account_id))
            .one(&self.db)
            .await?
            .ok_or(BudgetError::NotFound(budget_id))?;
        Ok(budget)
    }

    /// Updates a budget. The merged result is validated as a whole.
    pub async fn update(
        &self,
        account_id: Uuid,
        budget_id: Uuid,
        input: UpdateBudgetInput,
    ) -> Result<budgets::Model, BudgetStoreError> {
        let existing = self.get(account_id, budget_id).await?;
        let current = draft_of(&existing);

        let draft = BudgetService::validate(BudgetDraft {
            name: input.name.unwrap_or(current.name),
            category: input.category.unwrap_or(current.category),
            amount: input.amount.unwrap_or(current.amount),
            period: input.period.unwrap_or(current.period),
            start_date: input.start_date.unwrap_or(current.start_date),
            end_date: input.end_date.unwrap_or(current.end_date),
        })?;

        let mut active: budgets::ActiveModel = existing.into();
        active.name = Set(draft.name);
        active.category = Set(draft.category);
        active.amount = Set(draft.amount);
        active.period = Set(draft.period.into());
        active.start_date = Set(draft.start_date);
        active.end_date = Set(draft.end_date);
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await?;
        debug!(%budget_id, "budget updated");
        Ok(updated)
    }

    /// Deletes a budget.
    pub async fn delete(&self, account_id: Uuid, budget_id: Uuid) -> Result<(), BudgetStoreError> {
        let result = budgets::Entity::delete_many()
            .filter(budgets::Column::Id.eq(budget_id))
            .filter(budgets::Column::AccountId.eq(account_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(BudgetError::NotFound(budget_id).into());
        }
        debug!(%budget_id, "budget deleted");
        Ok(())
    }
}
