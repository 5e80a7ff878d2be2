//! Core business logic for Kasku.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `ledger` - Wallet balances, transaction edits, transfers and the audit trail
//! - `budget` - Spending ceilings per category and period
//! - `installment` - Monthly repayment tracking

pub mod budget;
pub mod installment;
pub mod ledger;
