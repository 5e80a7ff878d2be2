//! Wallet-to-wallet transfer rules.
//!
//! A transfer is two ordinary transactions committed together: an expense
//! on the source wallet and an income on the target wallet.

use rust_decimal::Decimal;

use kasku_shared::types::WalletId;

use super::balance::BalanceRule;
use super::error::LedgerError;
use super::reconcile::WalletAdjustment;
use super::types::TransactionType;

/// Category given to both legs of a transfer.
pub const TRANSFER_CATEGORY: &str = "Transfer";

/// A validated transfer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferPlan {
    /// Wallet that is debited.
    pub source: WalletId,
    /// Wallet that is credited.
    pub target: WalletId,
    /// Positive amount, two fraction digits.
    pub amount: Decimal,
}

/// One generated transaction of a transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferLeg {
    /// Wallet the leg is attached to.
    pub wallet_id: WalletId,
    /// Expense for the source, income for the target.
    pub transaction_type: TransactionType,
    /// Generated title.
    pub title: String,
}

impl TransferPlan {
    /// Validates the request.
    ///
    /// # Errors
    ///
    /// `InvalidTransfer` if source equals target, `InvalidAmount` if the
    /// amount is not positive after rounding to two digits.
    pub fn new(source: WalletId, target: WalletId, amount: Decimal) -> Result<Self, LedgerError> {
        if source == target {
            return Err(LedgerError::InvalidTransfer);
        }
        let amount = BalanceRule::positive_amount(amount)?;
        Ok(Self {
            source,
            target,
            amount,
        })
    }

    /// Wallets in the order their rows must be locked.
    #[must_use]
    pub fn lock_order(&self) -> Vec<WalletId> {
        WalletId::lock_order(&[self.source, self.target])
    }

    /// Rejects the transfer if the locked source balance cannot cover it.
    pub fn ensure_covered(&self, source_balance: Decimal) -> Result<(), LedgerError> {
        if source_balance < self.amount {
            return Err(LedgerError::InsufficientBalance {
                wallet_id: self.source.into_inner(),
                balance: source_balance,
                delta: -self.amount,
            });
        }
        Ok(())
    }

    /// Balance deltas: debit the source, credit the target.
    #[must_use]
    pub fn adjustments(&self) -> [WalletAdjustment; 2] {
        [
            WalletAdjustment {
                wallet_id: self.source,
                delta: TransactionType::Expense.signed_delta(self.amount),
            },
            WalletAdjustment {
                wallet_id: self.target,
                delta: TransactionType::Income.signed_delta(self.amount),
            },
        ]
    }

    /// The expense leg on the source and the income leg on the target,
    /// titled after the opposite wallet.
    #[must_use]
    pub fn legs(&self, source_name: &str, target_name: &str) -> [TransferLeg; 2] {
        [
            TransferLeg {
                wallet_id: self.source,
                transaction_type: TransactionType::Expense,
                title: format!("Transfer to {target_name}"),
            },
            TransferLeg {
                wallet_id: self.target,
                transaction_type: TransactionType::Income,
                title: format!("Transfer from {source_name}"),
            },
        ]
    }
}
