//! Wallet ledger logic.
//!
//! This module implements the rules behind every balance change:
//! - Domain types and the signed delta of a transaction
//! - The balance mutation rule (non-negative results, 2 dp rounding)
//! - Reconciliation of wallet effects when a transaction is edited
//! - Transfer validation and the generated transaction pair
//! - Text field limits matching the column widths
//! - Activity payloads and latest-activity selection
//! - Error types for ledger operations

pub mod activity;
pub mod balance;
pub mod error;
pub mod fields;
pub mod reconcile;
pub mod transfer;
pub mod types;

#[cfg(test)]
mod reconcile_props;
#[cfg(test)]
mod transfer_props;

pub use activity::{ActivityPayload, ActivitySummary, latest_per_key};
pub use balance::{BalanceChange, BalanceRule};
pub use error::LedgerError;
pub use fields::{NAME_MAX_CHARS, TITLE_MAX_CHARS, required_text};
pub use reconcile::{WalletAdjustment, WalletTransition};
pub use transfer::{TRANSFER_CATEGORY, TransferLeg, TransferPlan};
pub use types::{
    ActivityAction, AdjustmentDirection, TransactionSnapshot, TransactionType, WalletSummary,
    WalletType,
};
