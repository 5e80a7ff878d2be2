//! `SeaORM` active enums mapped to the Postgres enum types.
//!
//! Each enum converts to and from its `kasku-core` counterpart.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use kasku_core::budget::BudgetPeriod as CoreBudgetPeriod;
use kasku_core::installment::InstallmentStatus as CoreInstallmentStatus;
use kasku_core::ledger::{
    ActivityAction as CoreActivityAction, TransactionType as CoreTransactionType,
    WalletType as CoreWalletType,
};

/// `wallet_type` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "wallet_type")]
#[serde(rename_all = "snake_case")]
pub enum WalletType {
    /// Bank account.
    #[sea_orm(string_value = "bank")]
    Bank,
    /// E-wallet.
    #[sea_orm(string_value = "e_wallet")]
    EWallet,
    /// Credit card.
    #[sea_orm(string_value = "credit_card")]
    CreditCard,
    /// Cash.
    #[sea_orm(string_value = "cash")]
    Cash,
}

/// `transaction_type` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_type")]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Income.
    #[sea_orm(string_value = "income")]
    Income,
    /// Expense.
    #[sea_orm(string_value = "expense")]
    Expense,
}

/// `activity_action` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "activity_action")]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    /// Create.
    #[sea_orm(string_value = "create")]
    Create,
    /// Update.
    #[sea_orm(string_value = "update")]
    Update,
    /// Delete.
    #[sea_orm(string_value = "delete")]
    Delete,
}

/// `budget_period` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "budget_period")]
#[serde(rename_all = "snake_case")]
pub enum BudgetPeriod {
    /// Weekly.
    #[sea_orm(string_value = "weekly")]
    Weekly,
    /// Monthly.
    #[sea_orm(string_value = "monthly")]
    Monthly,
    /// Yearly.
    #[sea_orm(string_value = "yearly")]
    Yearly,
}

/// `installment_status` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "installment_status")]
#[serde(rename_all = "snake_case")]
pub enum InstallmentStatus {
    /// Active.
    #[sea_orm(string_value = "active")]
    Active,
    /// Paid off.
    #[sea_orm(string_value = "paid_off")]
    PaidOff,
    /// Overdue.
    #[sea_orm(string_value = "overdue")]
    Overdue,
}

macro_rules! mirror_enum {
    ($db:ident, $core:ident, [$($variant:ident),+ $(,)?]) => {
        impl From<$core> for $db {
            fn from(value: $core) -> Self {
                match value {
                    $($core::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$db> for $core {
            fn from(value: $db) -> Self {
                match value {
                    $($db::$variant => Self::$variant,)+
                }
            }
        }
    };
}

mirror_enum!(WalletType, CoreWalletType, [Bank, EWallet, CreditCard, Cash]);
mirror_enum!(TransactionType, CoreTransactionType, [Income, Expense]);
mirror_enum!(ActivityAction, CoreActivityAction, [Create, Update, Delete]);
mirror_enum!(BudgetPeriod, CoreBudgetPeriod, [Weekly, Monthly, Yearly]);
mirror_enum!(InstallmentStatus, CoreInstallmentStatus, [Active, PaidOff, Overdue]);

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn test_round_trip_with_core() {
        for variant in WalletType::iter() {
            assert_eq!(WalletType::from(CoreWalletType::from(variant)), variant);
        }
        for variant in InstallmentStatus::iter() {
            assert_eq!(
                InstallmentStatus::from(CoreInstallmentStatus::from(variant)),
                variant
            );
        }
    }

    #[test]
    fn test_string_values() {
        assert_eq!(WalletType::EWallet.to_value(), "e_wallet");
        assert_eq!(InstallmentStatus::PaidOff.to_value(), "paid_off");
        assert_eq!(TransactionType::Expense.to_value(), "expense");
    }
}
