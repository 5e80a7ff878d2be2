//! `SeaORM` entity definitions.

pub mod prelude;

pub mod accounts;
pub mod budgets;
pub mod installments;
pub mod members;
pub mod sea_orm_active_enums;
pub mod transaction_activities;
pub mod transactions;
pub mod wallets;
