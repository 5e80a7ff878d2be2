//! Installment validation and repayment rules.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use kasku_shared::types::{MAX_MONEY, is_storable_money, round_money};

use crate::ledger::{LedgerError, NAME_MAX_CHARS, required_text};

use super::error::InstallmentError;
use super::types::{InstallmentDraft, InstallmentProgress, InstallmentStatus};

/// Installment service with pure business logic.
pub struct InstallmentService;

impl InstallmentService {
    /// Validates a draft and returns it normalized.
    pub fn validate(draft: InstallmentDraft) -> Result<InstallmentDraft, InstallmentError> {
        let name = required_text("name", &draft.name, NAME_MAX_CHARS).map_err(|err| match err {
            LedgerError::FieldTooLong { max, .. } => {
                InstallmentError::FieldTooLong { field: "name", max }
            }
            _ => InstallmentError::BlankField("name"),
        })?;

        for amount in [draft.monthly_amount, draft.remaining_amount] {
            if !is_storable_money(amount) {
                return Err(InstallmentError::InvalidAmount(format!(
                    "amount must not exceed {MAX_MONEY}"
                )));
            }
        }
        let monthly_amount = round_money(draft.monthly_amount);
        if monthly_amount <= Decimal::ZERO {
            return Err(InstallmentError::InvalidAmount(
                "monthly amount must be greater than zero".into(),
            ));
        }
        let remaining_amount = round_money(draft.remaining_amount);
        if remaining_amount < Decimal::ZERO {
            return Err(InstallmentError::InvalidAmount(
                "remaining amount must not be negative".into(),
            ));
        }

        if draft.total_months < 1 || draft.paid_months < 0 || draft.paid_months > draft.total_months
        {
            return Err(InstallmentError::InvalidMonths {
                paid: draft.paid_months,
                total: draft.total_months,
            });
        }
        if !(1..=31).contains(&draft.due_day) {
            return Err(InstallmentError::InvalidDueDay(draft.due_day));
        }

        Ok(InstallmentDraft {
            name,
            monthly_amount,
            remaining_amount,
            ..draft
        })
    }

    /// Status for a freshly stored or edited installment.
    #[must_use]
    pub fn status_for(remaining_amount: Decimal) -> InstallmentStatus {
        if remaining_amount <= Decimal::ZERO {
            InstallmentStatus::PaidOff
        } else {
            InstallmentStatus::Active
        }
    }

    /// Status as seen on `today`: an active installment whose due date has
    /// passed is overdue.
    #[must_use]
    pub fn status_on(
        status: InstallmentStatus,
        next_due_date: NaiveDate,
        today: NaiveDate,
    ) -> InstallmentStatus {
        match status {
            InstallmentStatus::Active if next_due_date < today => InstallmentStatus::Overdue,
            other => other,
        }
    }

    /// Records one payment.
    ///
    /// `amount` defaults to `monthly_amount` and is capped at the remaining
    /// amount. Paid months go up by one (never past the total), the due date
    /// moves to the next month and the status becomes `paid_off` once nothing
    /// remains, `active` otherwise.
    pub fn record_payment(
        progress: InstallmentProgress,
        monthly_amount: Decimal,
        amount: Option<Decimal>,
    ) -> Result<InstallmentProgress, InstallmentError> {
        if progress.status == InstallmentStatus::PaidOff || progress.remaining_amount <= Decimal::ZERO
        {
            return Err(InstallmentError::AlreadyPaidOff);
        }

        let paid = amount.unwrap_or(monthly_amount);
        if !is_storable_money(paid) {
            return Err(InstallmentError::InvalidAmount(format!(
                "payment must not exceed {MAX_MONEY}"
            )));
        }
        let paid = round_money(paid);
        if paid <= Decimal::ZERO {
            return Err(InstallmentError::InvalidAmount(
                "payment must be greater than zero".into(),
            ));
        }

        let remaining_amount = round_money((progress.remaining_amount - paid).max(Decimal::ZERO));
        let paid_months = (progress.paid_months + 1).min(progress.total_months);
        let next_due_date = Self::following_due_date(progress.next_due_date, progress.due_day)?;

        Ok(InstallmentProgress {
            remaining_amount,
            paid_months,
            next_due_date,
            status: Self::status_for(remaining_amount),
            ..progress
        })
    }

    /// Due date one month after `current`, on `due_day` or the last day of
    /// that month when it is shorter.
    pub fn following_due_date(current: NaiveDate, due_day: u32) -> Result<NaiveDate, InstallmentError> {
        let (year, month) = if current.month() == 12 {
            (current.year() + 1, 1)
        } else {
            (current.year(), current.month() + 1)
        };
        Self::due_date_in(year, month, due_day).ok_or(InstallmentError::InvalidDueDay(due_day))
    }

    fn due_date_in(year: i32, month: u32, due_day: u32) -> Option<NaiveDate> {
        let first_of_next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        let last_day = first_of_next.pred_opt()?.day();
        NaiveDate::from_ymd_opt(year, month, due_day.clamp(1, last_day))
    }
}
