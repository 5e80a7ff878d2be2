//! Wallet reconciliation for transaction edits.
//!
//! Editing a transaction can change its wallet, its amount and its type at
//! once. [`WalletTransition`] classifies the wallet change, and
//! [`WalletTransition::adjustments`] turns it into the signed deltas the
//! balance mutator must apply.

use rust_decimal::Decimal;

use kasku_shared::types::{WalletId, round_money};

use super::error::LedgerError;

/// How the wallet reference changes between the stored and edited row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletTransition {
    /// No wallet before or after. Balances are untouched.
    Detached,
    /// Same wallet before and after. Only the difference is applied.
    Same(WalletId),
    /// The wallet reference was removed. The old effect is reversed.
    Cleared {
        /// Previously attached wallet.
        from: WalletId,
    },
    /// A wallet was newly attached or replaced by another one.
    Moved {
        /// Previously attached wallet, if any.
        from: Option<WalletId>,
        /// Newly attached wallet.
        to: WalletId,
    },
}

/// A signed delta for one wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletAdjustment {
    /// Wallet to mutate.
    pub wallet_id: WalletId,
    /// Signed delta, two fraction digits.
    pub delta: Decimal,
}

impl WalletTransition {
    /// Classifies the change from `previous` to `next`.
    #[must_use]
    pub fn between(previous: Option<WalletId>, next: Option<WalletId>) -> Self {
        match (previous, next) {
            (None, None) => Self::Detached,
            (Some(from), Some(to)) if from == to => Self::Same(to),
            (Some(from), None) => Self::Cleared { from },
            (from, Some(to)) => Self::Moved { from, to },
        }
    }

    /// Returns the adjustments that move balances from the effect of
    /// `previous_delta` to the effect of `next_delta`.
    ///
    /// The result is sorted by wallet id so that callers lock rows in a
    /// consistent order. An unchanged wallet always yields exactly one
    /// adjustment (possibly zero) so that its existence is still checked.
    ///
    /// # Errors
    ///
    /// `InvalidAmount` when the difference of the two deltas overflows.
    pub fn adjustments(
        self,
        previous_delta: Decimal,
        next_delta: Decimal,
    ) -> Result<Vec<WalletAdjustment>, LedgerError> {
        let mut plan = match self {
            Self::Detached => Vec::new(),
            Self::Same(wallet_id) => vec![WalletAdjustment {
                wallet_id,
                delta: next_delta
                    .checked_sub(previous_delta)
                    .map(round_money)
                    .ok_or_else(|| {
                        LedgerError::InvalidAmount(format!(
                            "cannot move {previous_delta} to {next_delta}"
                        ))
                    })?,
            }],
            Self::Cleared { from } => vec![WalletAdjustment {
                wallet_id: from,
                delta: round_money(-previous_delta),
            }],
            Self::Moved { from, to } => {
                let mut steps = Vec::with_capacity(2);
                if let Some(from) = from {
                    steps.push(WalletAdjustment {
                        wallet_id: from,
                        delta: round_money(-previous_delta),
                    });
                }
                steps.push(WalletAdjustment {
                    wallet_id: to,
                    delta: round_money(next_delta),
                });
                steps
            }
        };
        plan.sort_by_key(|step| step.wallet_id);
        Ok(plan)
    }

    /// Wallets touched by this transition.
    #[must_use]
    pub fn wallets(self) -> Vec<WalletId> {
        let touched = match self {
            Self::Detached => Vec::new(),
            Self::Same(id) | Self::Cleared { from: id } | Self::Moved { from: None, to: id } => {
                vec![id]
            }
            Self::Moved {
                from: Some(from),
                to,
            } => vec![from, to],
        };
        WalletId::lock_order(&touched)
    }
}
