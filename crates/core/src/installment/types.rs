//! Installment data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle of an installment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallmentStatus {
    /// Payments are on schedule.
    #[default]
    Active,
    /// Remaining amount reached zero.
    PaidOff,
    /// Next due date has passed without a payment.
    Overdue,
}

/// Installment fields as they will be persisted, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallmentDraft {
    /// Display name.
    pub name: String,
    /// Amount due every month.
    pub monthly_amount: Decimal,
    /// Amount still owed.
    pub remaining_amount: Decimal,
    /// Length of the plan in months.
    pub total_months: i32,
    /// Months already paid.
    pub paid_months: i32,
    /// Day of month the payment is due.
    pub due_day: u32,
    /// Next date a payment is due.
    pub next_due_date: NaiveDate,
}

/// Repayment state touched by [`record_payment`](super::InstallmentService::record_payment).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallmentProgress {
    /// Amount still owed.
    pub remaining_amount: Decimal,
    /// Months already paid.
    pub paid_months: i32,
    /// Length of the plan in months.
    pub total_months: i32,
    /// Day of month the payment is due.
    pub due_day: u32,
    /// Next date a payment is due.
    pub next_due_date: NaiveDate,
    /// Current status.
    pub status: InstallmentStatus,
}
