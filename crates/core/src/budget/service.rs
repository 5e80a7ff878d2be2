//! Budget validation.

use rust_decimal::Decimal;

use kasku_shared::types::{is_storable_money, round_money};

use crate::ledger::{LedgerError, NAME_MAX_CHARS, required_text};

use super::error::BudgetError;
use super::types::BudgetDraft;

/// Budget service with pure validation logic.
pub struct BudgetService;

impl BudgetService {
    /// Validates a draft and returns it normalized.
    ///
    /// Names and categories are trimmed, the amount is rounded to two
    /// fraction digits.
    pub fn validate(draft: BudgetDraft) -> Result<BudgetDraft, BudgetError> {
        let name = text("name", &draft.name)?;
        let category = text("category", &draft.category)?;

        if !is_storable_money(draft.amount) {
            return Err(BudgetError::AmountOutOfRange);
        }
        let amount = round_money(draft.amount);
        if amount <= Decimal::ZERO {
            return Err(BudgetError::NonPositiveAmount);
        }

        if let Some(end) = draft.end_date
            && end < draft.start_date
        {
            return Err(BudgetError::InvalidDateRange);
        }

        Ok(BudgetDraft {
            name,
            category,
            amount,
            ..draft
        })
    }
}

fn text(field: &'static str, value: &str) -> Result<String, BudgetError> {
    required_text(field, value, NAME_MAX_CHARS).map_err(|err| match err {
        LedgerError::FieldTooLong { max, .. } => BudgetError::FieldTooLong { field, max },
        _ => BudgetError::BlankField(field),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::types::BudgetPeriod;
    use chrono::NaiveDate;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn draft() -> BudgetDraft {
        BudgetDraft {
            name: "  Groceries ".into(),
            category: "Food".into(),
            amount: dec!(1500000),
            period: BudgetPeriod::Monthly,
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            end_date: None,
        }
    }

    #[test]
    fn test_normalizes() {
        let valid = BudgetService::validate(draft()).unwrap();
        assert_eq!(valid.name, "Groceries");
        assert_eq!(valid.amount.to_string(), "1500000.00");
    }

    #[rstest]
    #[case(dec!(0))]
    #[case(dec!(-10))]
    #[case(dec!(0.001))]
    fn test_rejects_non_positive_amount(#[case] amount: Decimal) {
        let result = BudgetService::validate(BudgetDraft { amount, ..draft() });
        assert_eq!(result, Err(BudgetError::NonPositiveAmount));
    }

    #[rstest]
    #[case(Decimal::MAX)]
    #[case(dec!(100000000000000000))]
    fn test_rejects_out_of_range_amount(#[case] amount: Decimal) {
        let result = BudgetService::validate(BudgetDraft { amount, ..draft() });
        assert_eq!(result, Err(BudgetError::AmountOutOfRange));
        assert_eq!(BudgetError::AmountOutOfRange.http_status_code(), 400);
    }

    #[test]
    fn test_rejects_blank_fields() {
        let result = BudgetService::validate(BudgetDraft {
            name: "   ".into(),
            ..draft()
        });
        assert_eq!(result, Err(BudgetError::BlankField("name")));

        let result = BudgetService::validate(BudgetDraft {
            category: String::new(),
            ..draft()
        });
        assert_eq!(result, Err(BudgetError::BlankField("category")));

        let result = BudgetService::validate(BudgetDraft {
            category: "c".repeat(101),
            ..draft()
        });
        assert_eq!(
            result,
            Err(BudgetError::FieldTooLong { field: "category", max: 100 })
        );
    }

    #[test]
    fn test_date_range() {
        let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let before = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        assert_eq!(
            BudgetService::validate(BudgetDraft {
                end_date: Some(before),
                ..draft()
            }),
            Err(BudgetError::InvalidDateRange)
        );
        assert!(
            BudgetService::validate(BudgetDraft {
                end_date: Some(start),
                ..draft()
            })
            .is_ok()
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(BudgetError::NotFound(uuid::Uuid::nil()).http_status_code(), 404);
        assert_eq!(BudgetError::InvalidDateRange.error_code(), "INVALID_DATE_RANGE");
    }
}
