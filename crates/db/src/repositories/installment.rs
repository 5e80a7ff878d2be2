//! Installment repository.
//!
//! Recording a payment only advances the installment itself; no wallet
//! balance changes.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, warn};
use uuid::Uuid;

use kasku_core::installment::{
    InstallmentDraft, InstallmentError, InstallmentProgress, InstallmentService, InstallmentStatus,
};
use kasku_shared::types::InstallmentId;

use crate::entities::{installments, wallets};

/// Error types for installment storage.
#[derive(Debug, thiserror::Error)]
pub enum InstallmentStoreError {
    /// An installment rule rejected the input, or a row is missing.
    #[error(transparent)]
    Installment(#[from] InstallmentError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl InstallmentStoreError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Installment(err) => err.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Installment(err) => err.http_status_code(),
            Self::Database(_) => 500,
        }
    }
}

/// Input for creating an installment.
#[derive(Debug, Clone)]
pub struct CreateInstallmentInput {
    /// Schedule and amounts.
    pub draft: InstallmentDraft,
    /// Wallet the payments usually come from.
    pub wallet_id: Option<Uuid>,
    /// Free text.
    pub notes: Option<String>,
}

/// Input for updating an installment. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdateInstallmentInput {
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
    /// Attached wallet.
    pub wallet_id: Option<Option<Uuid>>,
    /// Notes.
    pub notes: Option<Option<String>>,
}

fn draft_of(row: &installments::Model) -> InstallmentDraft {
    InstallmentDraft {
        name: row.name.clone(),
        monthly_amount: row.monthly_amount,
        remaining_amount: row.remaining_amount,
        total_months: row.total_months,
        paid_months: row.paid_months,
        due_day: u32::try_from(row.due_day).unwrap_or_default(),
        next_due_date: row.next_due_date,
    }
}

fn progress_of(row: &installments::Model) -> InstallmentProgress {
    InstallmentProgress {
        remaining_amount: row.remaining_amount,
        paid_months: row.paid_months,
        total_months: row.total_months,
        due_day: u32::try_from(row.due_day).unwrap_or_default(),
        next_due_date: row.next_due_date,
        status: row.status.into(),
    }
}

fn due_day_column(due_day: u32) -> Result<i16, InstallmentError> {
    i16::try_from(due_day).map_err(|_| InstallmentError::InvalidDueDay(due_day))
}

/// Status of a stored installment as seen on `today`.
#[must_use]
pub fn effective_status(row: &installments::Model, today: NaiveDate) -> InstallmentStatus {
    InstallmentService::status_on(row.status.into(), row.next_due_date, today)
}

/// Installment repository for CRUD operations and payments.
#[derive(Debug, Clone)]
pub struct InstallmentRepository {
    db: DatabaseConnection,
}

impl InstallmentRepository {
    /// Creates a new installment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an installment.
    pub async fn create(
        &self,
        account_id: Uuid,
        input: CreateInstallmentInput,
    ) -> Result<installments::Model, InstallmentStoreError> {
        let draft = InstallmentService::validate(input.draft)?;
        if let Some(wallet_id) = input.wallet_id {
            self.ensure_wallet(account_id, wallet_id).await?;
        }

        let now = Utc::now().into();
        let row = installments::ActiveModel {
            id: Set(InstallmentId::new().into_inner()),
            account_id: Set(account_id),
            wallet_id: Set(input.wallet_id),
            name: Set(draft.name),
            monthly_amount: Set(draft.monthly_amount),
            remaining_amount: Set(draft.remaining_amount),
            total_months: Set(draft.total_months),
            paid_months: Set(draft.paid_months),
            due_day: Set(due_day_column(draft.due_day)?),
            next_due_date: Set(draft.next_due_date),
            status: Set(InstallmentService::status_for(draft.remaining_amount).into()),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        debug!(installment_id = %row.id, %account_id, "installment created");
        Ok(row)
    }

    /// Lists installments by next due date.
    pub async fn list(
        &self,
        account_id: Uuid,
    ) -> Result<Vec<installments::Model>, InstallmentStoreError> {
        let rows = installments::Entity::find()
            .filter(installments::Column::AccountId.eq(account_id))
            .order_by_asc(installments::Column::NextDueDate)
            .order_by_asc(installments::Column::Name)
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    /// Gets one installment.
    pub async fn get(
        &self,
        account_id: Uuid,
        installment_id: Uuid,
    ) -> Result<installments::Model, InstallmentStoreError> {
        let row = installments::Entity::find_by_id(installment_id)
            .filter(installments::Column::AccountId.eq(account_id))
            .one(&self.db)
            .await?
            .ok_or(InstallmentError::NotFound(installment_id))?;
        Ok(row)
    }

    /// Updates an installment. The merged result is validated as a whole
    /// and the status recomputed from the remaining amount.
    pub async fn update(
        &self,
        account_id: Uuid,
        installment_id: Uuid,
        input: UpdateInstallmentInput,
    ) -> Result<installments::Model, InstallmentStoreError> {
        let existing = self.get(account_id, installment_id).await?;
        let current = draft_of(&existing);

        let draft = InstallmentService::validate(InstallmentDraft {
            name: input.name.unwrap_or(current.name),
            monthly_amount: input.monthly_amount.unwrap_or(current.monthly_amount),
            remaining_amount: input.remaining_amount.unwrap_or(current.remaining_amount),
            total_months: input.total_months.unwrap_or(current.total_months),
            paid_months: input.paid_months.unwrap_or(current.paid_months),
            due_day: input.due_day.unwrap_or(current.due_day),
            next_due_date: input.next_due_date.unwrap_or(current.next_due_date),
        })?;

        if let Some(Some(wallet_id)) = input.wallet_id {
            self.ensure_wallet(account_id, wallet_id).await?;
        }

        let mut active: installments::ActiveModel = existing.into();
        active.name = Set(draft.name);
        active.monthly_amount = Set(draft.monthly_amount);
        active.remaining_amount = Set(draft.remaining_amount);
        active.total_months = Set(draft.total_months);
        active.paid_months = Set(draft.paid_months);
        active.due_day = Set(due_day_column(draft.due_day)?);
        active.next_due_date = Set(draft.next_due_date);
        active.status = Set(InstallmentService::status_for(draft.remaining_amount).into());
        if let Some(wallet_id) = input.wallet_id {
            active.wallet_id = Set(wallet_id);
        }
        if let Some(notes) = input.notes {
            active.notes = Set(notes);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await?;
        debug!(%installment_id, "installment updated");
        Ok(updated)
    }

    /// Deletes an installment.
    pub async fn delete(
        &self,
        account_id: Uuid,
        installment_id: Uuid,
    ) -> Result<(), InstallmentStoreError> {
        let result = installments::Entity::delete_many()
            .filter(installments::Column::Id.eq(installment_id))
            .filter(installments::Column::AccountId.eq(account_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(InstallmentError::NotFound(installment_id).into());
        }
        debug!(%installment_id, "installment deleted");
        Ok(())
    }

    /// Records one payment; `amount` defaults to the monthly amount.
    ///
    /// The row is locked so two concurrent payments are applied one after
    /// the other.
    pub async fn record_payment(
        &self,
        account_id: Uuid,
        installment_id: Uuid,
        amount: Option<Decimal>,
    ) -> Result<installments::Model, InstallmentStoreError> {
        let txn = self.db.begin().await?;

        let existing = installments::Entity::find_by_id(installment_id)
            .filter(installments::Column::AccountId.eq(account_id))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(InstallmentError::NotFound(installment_id))?;

        let progress = progress_of(&existing);
        let next = match InstallmentService::record_payment(progress, existing.monthly_amount, amount)
        {
            Ok(next) => next,
            Err(err) => {
                warn!(%installment_id, error = %err, "installment payment rejected");
                return Err(err.into());
            }
        };

        let mut active: installments::ActiveModel = existing.into();
        active.remaining_amount = Set(next.remaining_amount);
        active.paid_months = Set(next.paid_months);
        active.next_due_date = Set(next.next_due_date);
        active.status = Set(next.status.into());
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await?;

        txn.commit().await?;

        debug!(
            %installment_id,
            remaining = %updated.remaining_amount,
            paid_months = updated.paid_months,
            "installment payment recorded"
        );
        Ok(updated)
    }

    async fn ensure_wallet(
        &self,
        account_id: Uuid,
        wallet_id: Uuid,
    ) -> Result<(), InstallmentStoreError> {
        let count = wallets::Entity::find_by_id(wallet_id)
            .filter(wallets::Column::AccountId.eq(account_id))
            .count(&self.db)
            .await?;
        if count == 0 {
            return Err(InstallmentError::WalletNotFound(wallet_id).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::sea_orm_active_enums::InstallmentStatus as DbStatus;
    use rust_decimal_macros::dec;

    fn row() -> installments::Model {
        let now = Utc::now().into();
        installments::Model {
            id: Uuid::from_u128(1),
            account_id: Uuid::from_u128(2),
            wallet_id: None,
            name: "Motor".into(),
            monthly_amount: dec!(850000.00),
            remaining_amount: dec!(1700000.00),
            total_months: 24,
            paid_months: 22,
            due_day: 5,
            next_due_date: NaiveDate::from_ymd_opt(2026, 10, 5).unwrap(),
            status: DbStatus::Active,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_progress_of() {
        let progress = progress_of(&row());
        assert_eq!(progress.due_day, 5);
        assert_eq!(progress.status, InstallmentStatus::Active);
        assert_eq!(progress.remaining_amount, dec!(1700000.00));
    }

    #[test]
    fn test_effective_status() {
        let before = NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();
        let after = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(effective_status(&row(), before), InstallmentStatus::Active);
        assert_eq!(effective_status(&row(), after), InstallmentStatus::Overdue);
    }

    #[test]
    fn test_due_day_column() {
        assert_eq!(due_day_column(31), Ok(31));
        assert_eq!(due_day_column(70_000), Err(InstallmentError::InvalidDueDay(70_000)));
    }

    #[test]
    fn test_draft_of_validates() {
        assert!(InstallmentService::validate(draft_of(&row())).is_ok());
    }
}
