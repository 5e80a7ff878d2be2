//! Database seeder for Kasku development and testing.
//!
//! Seeds two members sharing the `demo-household` account, four wallets
//! (one of them a credit card carrying debt), a month of transactions, a
//! transfer, a budget and an installment plan. Running it twice is a no-op.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::{Datelike, Duration, NaiveDate, Utc};
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use tracing::info;
use uuid::Uuid;

use kasku_core::budget::{BudgetDraft, BudgetPeriod};
use kasku_core::installment::{InstallmentDraft, InstallmentStatus};
use kasku_core::ledger::{TransactionType, WalletType};
use kasku_db::entities::wallets;
use kasku_db::migration::Migrator;
use kasku_db::repositories::{
    AccountRepository, BudgetRepository, CreateAccountInput, CreateInstallmentInput,
    CreateTransactionInput, CreateWalletInput, InstallmentRepository, MemberRepository,
    TransactionRepository, TransferInput, TransferRepository, WalletRepository,
};
use kasku_shared::AppConfig;
use kasku_shared::types::WalletId;

const DEMO_SLUG: &str = "demo-household";

struct Wallets {
    bank: Uuid,
    e_wallet: Uuid,
    cash: Uuid,
    credit_card: Uuid,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter("seeder=info,kasku=info")
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    let db = kasku_db::connect(&config.database)
        .await
        .context("failed to connect to database")?;

    Migrator::up(&db, None).await?;

    let accounts = AccountRepository::new(db.clone());
    if accounts.slug_exists(DEMO_SLUG).await? {
        info!(slug = DEMO_SLUG, "demo account already exists, skipping");
        return Ok(());
    }

    let (owner, partner) = seed_members(&db).await?;
    let account = accounts
        .create(CreateAccountInput {
            slug: DEMO_SLUG.to_string(),
            name: "Demo Household".to_string(),
            owner_id: owner,
        })
        .await?;
    info!(account_id = %account.id, "seeded account");

    let wallets = seed_wallets(&db, account.id).await?;
    seed_transactions(&db, account.id, owner, partner, &wallets).await?;
    seed_plans(&db, account.id, &wallets).await?;

    info!("seeding complete");
    Ok(())
}

async fn seed_members(db: &DatabaseConnection) -> anyhow::Result<(Uuid, Uuid)> {
    let members = MemberRepository::new(db.clone());
    let owner = find_or_create_member(&members, "Andi", "andi@kasku.dev").await?;
    let partner = find_or_create_member(&members, "Sari", "sari@kasku.dev").await?;
    Ok((owner, partner))
}

async fn find_or_create_member(
    members: &MemberRepository,
    name: &str,
    email: &str,
) -> anyhow::Result<Uuid> {
    let member = match members.find_by_email(email).await? {
        Some(existing) => existing,
        None => members.create(name, email, None).await?,
    };
    info!(member_id = %member.id, email, "seeded member");
    Ok(member.id)
}

async fn seed_wallets(db: &DatabaseConnection, account_id: Uuid) -> anyhow::Result<Wallets> {
    let repo = WalletRepository::new(db.clone());
    let specs = [
        ("BCA", WalletType::Bank, Some("BCA"), "#2563eb", dec!(8500000)),
        ("GoPay", WalletType::EWallet, Some("Gojek"), "#10b981", dec!(350000)),
        ("Dompet", WalletType::Cash, None, "#6b7280", dec!(400000)),
    ];

    let mut ids = Vec::with_capacity(specs.len());
    for (name, wallet_type, provider, color, balance) in specs {
        let wallet = repo
            .create(
                account_id,
                CreateWalletInput {
                    name: name.to_string(),
                    wallet_type,
                    provider: provider.map(str::to_string),
                    account_number: None,
                    color: Some(color.to_string()),
                    initial_balance: balance,
                },
            )
            .await?;
        ids.push(wallet.id);
    }
    let [bank, e_wallet, cash] = ids[..] else {
        anyhow::bail!("expected three seeded wallets");
    };

    // Opening balances must not be negative through the repository, so the
    // card debt goes in directly.
    let now = Utc::now().into();
    let credit_card = wallets::ActiveModel {
        id: Set(WalletId::new().into_inner()),
        account_id: Set(account_id),
        name: Set("Kartu Kredit".to_string()),
        wallet_type: Set(WalletType::CreditCard.into()),
        provider: Set(Some("BNI".to_string())),
        account_number: Set(Some("**** 4821".to_string())),
        color: Set("#f97316".to_string()),
        balance: Set(dec!(-1250000.00)),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    info!(count = ids.len() + 1, "seeded wallets");
    Ok(Wallets {
        bank,
        e_wallet,
        cash,
        credit_card: credit_card.id,
    })
}

async fn seed_transactions(
    db: &DatabaseConnection,
    account_id: Uuid,
    owner: Uuid,
    partner: Uuid,
    wallets: &Wallets,
) -> anyhow::Result<()> {
    use TransactionType::{Expense, Income};

    let repo = TransactionRepository::new(db.clone());
    let today = Utc::now();

    // (type, title, category, amount, days ago, wallet, member)
    let rows = [
        (Income, "Gaji Oktober", "Salary", dec!(12000000), 14, wallets.bank, owner),
        (Expense, "Belanja bulanan", "Groceries", dec!(1450000), 12, wallets.bank, partner),
        (Expense, "Listrik", "Utilities", dec!(385000), 10, wallets.bank, owner),
        (Expense, "Makan siang", "Food", dec!(62000), 6, wallets.e_wallet, partner),
        (Expense, "Parkir", "Transport", dec!(10000), 3, wallets.cash, owner),
        (Income, "Jual barang bekas", "Other", dec!(250000), 1, wallets.cash, partner),
    ];
    let count = rows.len();

    for (transaction_type, title, category, amount, days_ago, wallet_id, member_id) in rows {
        repo.create(
            account_id,
            Some(member_id),
            CreateTransactionInput {
                transaction_type,
                title: title.to_string(),
                category: category.to_string(),
                amount,
                occurred_at: today - Duration::days(days_ago),
                wallet_id: Some(wallet_id),
                member_id: Some(member_id),
                description: None,
            },
        )
        .await?;
    }

    TransferRepository::new(db.clone())
        .transfer(
            account_id,
            Some(owner),
            TransferInput {
                source_wallet_id: wallets.bank,
                target_wallet_id: wallets.e_wallet,
                amount: dec!(500000),
                note: Some("Top up".to_string()),
                occurred_at: Some(today - Duration::days(2)),
                member_id: Some(owner),
            },
        )
        .await?;

    info!(count, "seeded transactions and one transfer");
    Ok(())
}

async fn seed_plans(
    db: &DatabaseConnection,
    account_id: Uuid,
    wallets: &Wallets,
) -> anyhow::Result<()> {
    let today = Utc::now().date_naive();
    let month_start = today.with_day(1).unwrap_or(today);

    BudgetRepository::new(db.clone())
        .create(
            account_id,
            BudgetDraft {
                name: "Makan".to_string(),
                category: "Food".to_string(),
                amount: dec!(1500000),
                period: BudgetPeriod::Monthly,
                start_date: month_start,
                end_date: None,
            },
        )
        .await?;

    let next_due = next_due_date(today, 25);
    let installment = InstallmentRepository::new(db.clone())
        .create(
            account_id,
            CreateInstallmentInput {
                draft: InstallmentDraft {
                    name: "Laptop".to_string(),
                    monthly_amount: dec!(750000),
                    remaining_amount: dec!(6000000),
                    total_months: 12,
                    paid_months: 4,
                    due_day: 25,
                    next_due_date: next_due,
                },
                wallet_id: Some(wallets.credit_card),
                notes: Some("Cicilan 0%".to_string()),
            },
        )
        .await?;

    info!(
        installment_id = %installment.id,
        status = ?InstallmentStatus::from(installment.status),
        "seeded budget and installment"
    );
    Ok(())
}

/// First `due_day` on or after `today`.
fn next_due_date(today: NaiveDate, due_day: u32) -> NaiveDate {
    if today.day() <= due_day
        && let Some(date) = today.with_day(due_day)
    {
        return date;
    }
    let (year, month) = if today.month() == 12 {
        (today.year() + 1, 1)
    } else {
        (today.year(), today.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, due_day).unwrap_or(today)
}
