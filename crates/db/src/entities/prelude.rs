//! Entity re-exports.

pub use super::accounts::Entity as Accounts;
pub use super::budgets::Entity as Budgets;
pub use super::installments::Entity as Installments;
pub use super::members::Entity as Members;
pub use super::transaction_activities::Entity as TransactionActivities;
pub use super::transactions::Entity as Transactions;
pub use super::wallets::Entity as Wallets;
