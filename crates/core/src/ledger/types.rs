//! Ledger domain types.
//!
//! Amounts are stored as non-negative magnitudes. The direction of a
//! transaction's effect on its wallet comes from [`TransactionType`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use kasku_shared::types::round_money;

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming into a wallet.
    Income,
    /// Money leaving a wallet.
    Expense,
}

impl TransactionType {
    /// Returns the signed wallet delta for an amount of this type.
    ///
    /// Income credits the wallet (`+amount`), expense debits it (`-amount`).
    /// The result is rounded to two fraction digits.
    #[must_use]
    pub fn signed_delta(self, amount: Decimal) -> Decimal {
        let magnitude = round_money(amount.abs());
        match self {
            Self::Income => magnitude,
            Self::Expense => -magnitude,
        }
    }

    /// Returns the lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

/// Kind of balance-holding container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletType {
    /// Bank account.
    Bank,
    /// E-wallet (GoPay, OVO, ...).
    EWallet,
    /// Credit card.
    CreditCard,
    /// Physical cash.
    Cash,
}

/// Mutation recorded by a transaction activity row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityAction {
    /// Transaction was created.
    Create,
    /// Transaction was edited.
    Update,
    /// Transaction was deleted.
    Delete,
}

/// Direction of a direct balance adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentDirection {
    /// Add to the balance.
    Increase,
    /// Subtract from the balance.
    Decrease,
}

impl AdjustmentDirection {
    /// Returns the signed delta for a positive amount.
    #[must_use]
    pub fn signed_delta(self, amount: Decimal) -> Decimal {
        let magnitude = round_money(amount.abs());
        match self {
            Self::Increase => magnitude,
            Self::Decrease => -magnitude,
        }
    }
}

/// Wallet fields attached to enriched transactions and mutator results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSummary {
    /// Wallet id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Wallet type.
    #[serde(rename = "type")]
    pub wallet_type: WalletType,
    /// Display color hint.
    pub color: String,
}

/// Point-in-time copy of a transaction, stored in activity payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSnapshot {
    /// Transaction id.
    pub id: Uuid,
    /// Owning account.
    pub account_id: Uuid,
    /// Income or expense.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Title.
    pub title: String,
    /// Free-text category.
    pub category: String,
    /// Non-negative magnitude.
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    /// When the money moved, chosen by the member.
    pub occurred_at: DateTime<Utc>,
    /// Attached wallet, if any.
    pub wallet_id: Option<Uuid>,
    /// Owning member, if any.
    pub member_id: Option<Uuid>,
    /// Optional free text.
    pub description: Option<String>,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl TransactionSnapshot {
    /// Signed effect of this transaction on its wallet.
    #[must_use]
    pub fn signed_delta(&self) -> Decimal {
        self.transaction_type.signed_delta(self.amount)
    }
}
