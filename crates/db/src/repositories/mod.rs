//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Ledger writes (transactions, transfers, balance adjustments) each run in
//! one database transaction.

pub mod account;
pub mod activity;
pub mod budget;
pub mod installment;
pub mod member;
pub mod transaction;
pub mod transfer;
pub mod wallet;

pub use account::{AccountError, AccountRepository, CreateAccountInput};
pub use activity::{ActivityEntry, ActivityRepository};
pub use budget::{BudgetRepository, BudgetStoreError, UpdateBudgetInput};
pub use installment::{
    CreateInstallmentInput, InstallmentRepository, InstallmentStoreError, UpdateInstallmentInput,
    effective_status,
};
pub use member::MemberRepository;
pub use transaction::{
    CreateTransactionInput, EnrichedTransaction, TransactionFilter, TransactionRepository,
    UpdateTransactionInput,
};
pub use transfer::{TransferInput, TransferOutcome, TransferRepository};
pub use wallet::{
    CreateWalletInput, DEFAULT_WALLET_COLOR, UpdateWalletInput, WalletRepository,
    apply_wallet_delta,
};
