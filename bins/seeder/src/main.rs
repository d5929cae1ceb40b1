//! Demo seeder for Chartwell.
//!
//! Builds the detailed standard chart in memory, lays out the current
//! fiscal year as monthly periods, opens the period containing today,
//! posts an opening entry and a rent payment, and prints the resulting
//! trial balance as JSON.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;

use anyhow::Context;
use chartwell_core::accounts::HierarchyConfig;
use chartwell_core::chart::ChartOfAccountsService;
use chartwell_core::fiscal::{
    FiscalPeriodService, FiscalPeriodStatusType, FiscalYear, TransitionRequest,
};
use chartwell_core::ledger::{JournalEntry, LedgerService, OperationType};
use chartwell_core::repository::{AccountRepository, FiscalPeriodRepository};
use chartwell_shared::Settings;
use chartwell_shared::types::{AccountId, CompanyId, Currency, Money};
use chartwell_store::{InMemoryAuditLog, InMemoryStore};
use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal_macros::dec;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const CURRENCY: Currency = Currency::USD;

async fn account_id(store: &InMemoryStore, code: &str) -> anyhow::Result<AccountId> {
    let account = store
        .find_by_code(code)
        .await?
        .with_context(|| format!("standard account {code} missing"))?;
    Ok(account.id())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chartwell=debug,seeder=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load().context("failed to load configuration")?;
    let config = Arc::new(HierarchyConfig::from_settings(&settings.hierarchy)?);

    let store = Arc::new(InMemoryStore::new());
    let audit = Arc::new(InMemoryAuditLog::new());
    let chart = ChartOfAccountsService::new(Arc::clone(&store), Arc::clone(&audit), config);
    let ledger = LedgerService::new(Arc::clone(&store), Arc::clone(&audit));
    let fiscal = FiscalPeriodService::new(Arc::clone(&store), Arc::clone(&audit));

    let company = CompanyId::new();
    let created = chart
        .create_standard_chart_of_accounts(company, CURRENCY, true, None)
        .await?;
    info!(accounts = created.created.len(), "standard chart seeded");

    let today = Utc::now().date_naive();
    let year = FiscalYear::new(
        company,
        format!("FY{}", today.year()),
        NaiveDate::from_ymd_opt(today.year(), 1, 1).context("invalid year start")?,
        NaiveDate::from_ymd_opt(today.year(), 12, 31).context("invalid year end")?,
    )?;
    for period in year.monthly_periods() {
        store.save_period(period).await?;
    }
    let period = store
        .find_period_for_date(today)
        .await?
        .context("no fiscal period contains today")?;
    let period = fiscal
        .transition_period(
            period.id,
            &TransitionRequest::to(FiscalPeriodStatusType::Open).because("seeded"),
        )
        .await?;
    info!(period = %period.name, "current period opened");

    let bank = account_id(&store, "1120").await?;
    let capital = account_id(&store, "3100").await?;
    let rent = account_id(&store, "5220").await?;

    let mut opening = JournalEntry::draft(
        company,
        period.start_date,
        period.id,
        OperationType::OpeningBalance,
        "Initial capital",
    );
    opening.add_debit(bank, Money::new(dec!(50000.00), CURRENCY), None)?;
    opening.add_credit(capital, Money::new(dec!(50000.00), CURRENCY), None)?;
    ledger.post_journal_entry(opening, None).await?;

    let mut payment = JournalEntry::draft(
        company,
        today,
        period.id,
        OperationType::Payment,
        "Office rent",
    )
    .with_reference("RENT-001");
    payment.add_debit(rent, Money::new(dec!(2500.00), CURRENCY), None)?;
    payment.add_credit(bank, Money::new(dec!(2500.00), CURRENCY), None)?;
    ledger.post_journal_entry(payment, None).await?;

    let trial = chart
        .calculate_trial_balance(today, Some(CURRENCY), false)
        .await?;
    info!(
        balanced = trial.is_balanced,
        events = audit.records().await.len(),
        "seeding complete"
    );
    println!("{}", serde_json::to_string_pretty(&trial)?);

    Ok(())
}
