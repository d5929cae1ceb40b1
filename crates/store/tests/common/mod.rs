//! Shared fixture for the store integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chartwell_core::accounts::{Account, AccountType, HierarchyConfig, NewAccount};
use chartwell_core::chart::ChartOfAccountsService;
use chartwell_core::fiscal::{
    FiscalPeriod, FiscalPeriodService, FiscalPeriodStatus, FiscalPeriodStatusType,
};
use chartwell_core::ledger::{JournalEntry, LedgerError, LedgerService, OperationType};
use chartwell_core::repository::FiscalPeriodRepository;
use chartwell_shared::types::{AccountId, CompanyId, Currency, FiscalYearId, Money};
use chartwell_store::{InMemoryAuditLog, InMemoryStore};
use chrono::NaiveDate;
use rust_decimal::Decimal;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn usd(amount: Decimal) -> Money {
    Money::new(amount, Currency::USD)
}

/// Services wired to one store and one audit log.
pub struct Fixture {
    pub company: CompanyId,
    pub store: Arc<InMemoryStore>,
    pub audit: Arc<InMemoryAuditLog>,
    pub chart: ChartOfAccountsService<InMemoryStore, InMemoryAuditLog>,
    pub ledger: LedgerService<InMemoryStore, InMemoryAuditLog>,
    pub fiscal: FiscalPeriodService<InMemoryStore, InMemoryAuditLog>,
}

impl Fixture {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let audit = Arc::new(InMemoryAuditLog::new());
        let config = Arc::new(HierarchyConfig::default());
        Self {
            company: CompanyId::new(),
            chart: ChartOfAccountsService::new(Arc::clone(&store), Arc::clone(&audit), config),
            ledger: LedgerService::new(Arc::clone(&store), Arc::clone(&audit)),
            fiscal: FiscalPeriodService::new(Arc::clone(&store), Arc::clone(&audit)),
            store,
            audit,
        }
    }

    /// Stores an open January 2026 period.
    pub async fn january(&self) -> FiscalPeriod {
        let period = FiscalPeriod::new(
            FiscalYearId::new(),
            1,
            "January 2026",
            date(2026, 1, 1),
            date(2026, 1, 31),
            FiscalPeriodStatus::new(FiscalPeriodStatusType::Open),
        )
        .unwrap();
        self.store.save_period(period).await.unwrap()
    }

    pub async fn account(
        &self,
        code: &str,
        name: &str,
        account_type: AccountType,
        parent: Option<&Account>,
    ) -> Account {
        self.chart
            .create_account(
                NewAccount::new(
                    self.company,
                    code,
                    name,
                    account_type,
                    Currency::USD,
                    parent.map(Account::id),
                ),
                None,
            )
            .await
            .unwrap()
    }

    /// Drafts and posts a two-sided entry.
    pub async fn post(
        &self,
        period: &FiscalPeriod,
        entry_date: NaiveDate,
        operation: OperationType,
        debits: &[(AccountId, Decimal)],
        credits: &[(AccountId, Decimal)],
    ) -> Result<JournalEntry, LedgerError> {
        let mut entry = JournalEntry::draft(
            self.company,
            entry_date,
            period.id,
            operation,
            "test entry",
        );
        for (account, amount) in debits {
            entry.add_debit(*account, usd(*amount), None)?;
        }
        for (account, amount) in credits {
            entry.add_credit(*account, usd(*amount), None)?;
        }
        self.ledger.post_journal_entry(entry, None).await
    }
}
