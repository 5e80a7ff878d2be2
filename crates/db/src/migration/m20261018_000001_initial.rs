//! Initial database migration.
//!
//! Creates the enums, tables and indexes of the wallet ledger.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: TENANCY
        // ============================================================
        db.execute_unprepared(MEMBERS_SQL).await?;
        db.execute_unprepared(ACCOUNTS_SQL).await?;

        // ============================================================
        // PART 3: LEDGER
        // ============================================================
        db.execute_unprepared(WALLETS_SQL).await?;
        db.execute_unprepared(TRANSACTIONS_SQL).await?;
        db.execute_unprepared(TRANSACTION_ACTIVITIES_SQL).await?;

        // ============================================================
        // PART 4: PLANNING
        // ============================================================
        db.execute_unprepared(BUDGETS_SQL).await?;
        db.execute_unprepared(INSTALLMENTS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE wallet_type AS ENUM ('bank', 'e_wallet', 'credit_card', 'cash');

CREATE TYPE transaction_type AS ENUM ('income', 'expense');

CREATE TYPE activity_action AS ENUM ('create', 'update', 'delete');

CREATE TYPE budget_period AS ENUM ('weekly', 'monthly', 'yearly');

CREATE TYPE installment_status AS ENUM ('active', 'paid_off', 'overdue');
";

const MEMBERS_SQL: &str = r"
CREATE TABLE members (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    display_name VARCHAR(100) NOT NULL,
    email VARCHAR(255) NOT NULL UNIQUE,
    avatar_url TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    slug VARCHAR(64) NOT NULL UNIQUE,
    name VARCHAR(100) NOT NULL,
    owner_id UUID NOT NULL REFERENCES members(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_account_slug CHECK (slug ~ '^[a-z0-9]+(-[a-z0-9]+)*$')
);

CREATE INDEX idx_accounts_owner ON accounts(owner_id);
";

// No CHECK on balance: seeded credit cards may start below zero. The
// non-negative rule applies to ledger mutations and is enforced in code.
const WALLETS_SQL: &str = r"
CREATE TABLE wallets (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    account_id UUID NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
    name VARCHAR(100) NOT NULL,
    wallet_type wallet_type NOT NULL,
    provider VARCHAR(100),
    account_number VARCHAR(64),
    color VARCHAR(32) NOT NULL DEFAULT '#64748b',
    balance NUMERIC(19, 2) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_wallets_account_name ON wallets(account_id, name);
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    account_id UUID NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
    wallet_id UUID REFERENCES wallets(id) ON DELETE SET NULL,
    member_id UUID REFERENCES members(id) ON DELETE SET NULL,
    transaction_type transaction_type NOT NULL,
    title VARCHAR(200) NOT NULL,
    category VARCHAR(100) NOT NULL,
    amount NUMERIC(19, 2) NOT NULL,
    occurred_at TIMESTAMPTZ NOT NULL,
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_transaction_amount CHECK (amount >= 0)
);

CREATE INDEX idx_txn_account_occurred ON transactions(account_id, occurred_at DESC);
CREATE INDEX idx_txn_wallet ON transactions(wallet_id) WHERE wallet_id IS NOT NULL;
CREATE INDEX idx_txn_account_category ON transactions(account_id, category);
";

// transaction_id and account_id are soft references: activity rows survive
// the deletion of the transaction and of the account.
const TRANSACTION_ACTIVITIES_SQL: &str = r"
CREATE TABLE transaction_activities (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    account_id UUID NOT NULL,
    transaction_id UUID NOT NULL,
    actor_id UUID REFERENCES members(id) ON DELETE SET NULL,
    action activity_action NOT NULL,
    payload JSONB NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_activity_transaction ON transaction_activities(transaction_id, created_at DESC);
CREATE INDEX idx_activity_account ON transaction_activities(account_id, created_at DESC);
";

const BUDGETS_SQL: &str = r"
CREATE TABLE budgets (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    account_id UUID NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
    name VARCHAR(100) NOT NULL,
    category VARCHAR(100) NOT NULL,
    amount NUMERIC(19, 2) NOT NULL,
    period budget_period NOT NULL DEFAULT 'monthly',
    start_date DATE NOT NULL,
    end_date DATE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_budget_amount CHECK (amount > 0),
    CONSTRAINT chk_budget_dates CHECK (end_date IS NULL OR end_date >= start_date)
);

CREATE INDEX idx_budgets_account_category ON budgets(account_id, category);
";

const INSTALLMENTS_SQL: &str = r"
CREATE TABLE installments (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    account_id UUID NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
    wallet_id UUID REFERENCES wallets(id) ON DELETE SET NULL,
    name VARCHAR(100) NOT NULL,
    monthly_amount NUMERIC(19, 2) NOT NULL,
    remaining_amount NUMERIC(19, 2) NOT NULL,
    total_months INTEGER NOT NULL,
    paid_months INTEGER NOT NULL DEFAULT 0,
    due_day SMALLINT NOT NULL,
    next_due_date DATE NOT NULL,
    status installment_status NOT NULL DEFAULT 'active',
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_installment_monthly CHECK (monthly_amount > 0),
    CONSTRAINT chk_installment_remaining CHECK (remaining_amount >= 0),
    CONSTRAINT chk_installment_months CHECK (total_months > 0 AND paid_months BETWEEN 0 AND total_months),
    CONSTRAINT chk_installment_due_day CHECK (due_day BETWEEN 1 AND 31)
);

CREATE INDEX idx_installments_account_due ON installments(account_id, next_due_date);
";

const DROP_ALL_SQL: &str = r"
-- ============================================================
-- DROP ALL: Rollback migration
-- Order matters due to foreign key constraints
-- ============================================================

DROP TABLE IF EXISTS installments CASCADE;
DROP TABLE IF EXISTS budgets CASCADE;
DROP TABLE IF EXISTS transaction_activities CASCADE;
DROP TABLE IF EXISTS transactions CASCADE;
DROP TABLE IF EXISTS wallets CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
DROP TABLE IF EXISTS members CASCADE;

DROP TYPE IF EXISTS installment_status;
DROP TYPE IF EXISTS budget_period;
DROP TYPE IF EXISTS activity_action;
DROP TYPE IF EXISTS transaction_type;
DROP TYPE IF EXISTS wallet_type;
";
