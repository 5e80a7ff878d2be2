//! API route definitions.
//!
//! Every account-scoped route starts by resolving the `{slug}` path segment
//! to the account id the repositories are scoped by.

use axum::Router;
use uuid::Uuid;

use kasku_db::AccountRepository;

use crate::{AppState, error::ApiResult};

pub mod accounts;
pub mod budgets;
pub mod health;
pub mod installments;
pub mod transactions;
pub mod wallets;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(accounts::routes())
        .merge(transactions::routes())
        .merge(wallets::routes())
        .merge(budgets::routes())
        .merge(installments::routes())
}

/// Resolves an account slug to its id.
pub(crate) async fn resolve_account(state: &AppState, slug: &str) -> ApiResult<Uuid> {
    let account = AccountRepository::new(state.conn())
        .resolve_slug(slug)
        .await?;
    Ok(account.id)
}
