//! Budget data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Recurrence of a budget ceiling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    /// Resets every week.
    Weekly,
    /// Resets every month.
    #[default]
    Monthly,
    /// Resets every year.
    Yearly,
}

/// Budget fields as they will be persisted, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetDraft {
    /// Display name.
    pub name: String,
    /// Transaction category the ceiling applies to.
    pub category: String,
    /// Ceiling per period.
    pub amount: Decimal,
    /// Recurrence.
    pub period: BudgetPeriod,
    /// First day the budget applies.
    pub start_date: NaiveDate,
    /// Last day the budget applies, open-ended when absent.
    pub end_date: Option<NaiveDate>,
}
