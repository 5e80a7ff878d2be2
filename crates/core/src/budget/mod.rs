//! Budget rules.
//!
//! A budget is a spending ceiling for one category over a recurring period.
//! It does not touch wallets or transactions.

pub mod error;
pub mod service;
pub mod types;

pub use error::BudgetError;
pub use service::BudgetService;
pub use types::{BudgetDraft, BudgetPeriod};
