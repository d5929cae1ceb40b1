//! Integration tests for journal posting through the in-memory store.

mod common;

use std::collections::HashMap;

use chartwell_core::accounts::{Account, AccountError, AccountType};
use chartwell_core::chart::ChartError;
use chartwell_core::fiscal::{FiscalPeriodStatusType, TransitionRequest};
use chartwell_core::ledger::{JournalEntry, LedgerError, OperationType};
use chartwell_core::repository::{AccountRepository, JournalRepository, RepositoryError};
use chartwell_shared::types::{AccountId, Currency};
use rust_decimal_macros::dec;

use common::{Fixture, date, usd};

// ============================================================================
// Rejected entries leave no trace
// ============================================================================

#[tokio::test]
async fn test_unbalanced_entry_persists_nothing() {
    let fx = Fixture::new();
    let period = fx.january().await;
    let cash = fx.account("1110", "Cash", AccountType::Cash, None).await;
    let sales = fx
        .account("4100", "Sales Revenue", AccountType::OperatingRevenue, None)
        .await;

    let err = fx
        .post(
            &period,
            date(2026, 1, 5),
            OperationType::Invoice,
            &[(cash.id(), dec!(100.00))],
            &[(sales.id(), dec!(90.00))],
        )
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::Unbalanced { currency: Currency::USD, .. }));
    assert_eq!(fx.store.entry_count().await, 0);
    assert!(fx.store.postings_for(cash.id()).await.is_empty());
    assert!(fx.store.postings_for(sales.id()).await.is_empty());

    let stored = fx.store.find_by_id(cash.id()).await.unwrap().unwrap();
    assert_eq!(stored.version(), cash.version());
    assert!(stored.balance().is_zero());
    assert!(!fx.audit.event_names().await.contains(&"journal_posted"));
}

#[tokio::test]
async fn test_inactive_account_rejects_the_whole_entry() {
    let fx = Fixture::new();
    let period = fx.january().await;
    let cash = fx.account("1110", "Cash", AccountType::Cash, None).await;
    let old = fx.account("1120", "Old Bank", AccountType::Bank, None).await;
    fx.chart.deactivate_account(old.id(), None).await.unwrap();

    let err = fx
        .post(
            &period,
            date(2026, 1, 5),
            OperationType::Transfer,
            &[(cash.id(), dec!(40))],
            &[(old.id(), dec!(40))],
        )
        .await
        .unwrap_err();

    assert_eq!(err, LedgerError::AccountInactive(old.id()));
    assert_eq!(fx.store.entry_count().await, 0);
    assert!(fx.store.calculate_balance(cash.id(), None).await.unwrap().is_zero());
}

#[tokio::test]
async fn test_entry_outside_period_is_rejected() {
    let fx = Fixture::new();
    let period = fx.january().await;
    let cash = fx.account("1110", "Cash", AccountType::Cash, None).await;
    let capital = fx.account("3100", "Share Capital", AccountType::ShareCapital, None).await;

    let err = fx
        .post(
            &period,
            date(2026, 2, 1),
            OperationType::OpeningBalance,
            &[(cash.id(), dec!(10))],
            &[(capital.id(), dec!(10))],
        )
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::DateOutsidePeriod { .. }));
    assert_eq!(err.error_code(), "DATE_OUTSIDE_PERIOD");
}

#[tokio::test]
async fn test_post_rejects_accounts_changed_since_validation() {
    let fx = Fixture::new();
    let period = fx.january().await;
    let cash = fx.account("1110", "Cash", AccountType::Cash, None).await;
    let receivables = fx
        .account("1130", "Accounts Receivable", AccountType::AccountsReceivable, None)
        .await;

    let mut entry = JournalEntry::draft(
        fx.company,
        date(2026, 1, 5),
        period.id,
        OperationType::Payment,
        "customer payment",
    );
    entry.add_debit(cash.id(), usd(dec!(50)), None).unwrap();
    entry.add_credit(receivables.id(), usd(dec!(50)), None).unwrap();
    let validated: HashMap<AccountId, Account> = [cash.clone(), receivables.clone()]
        .into_iter()
        .map(|a| (a.id(), a))
        .collect();
    let changes = entry.post(&period, |id| validated.get(&id), None).unwrap();
    assert!(
        changes
            .iter()
            .all(|c| c.account_version == validated[&c.account_id].version())
    );

    fx.chart
        .mark_as_control_account(receivables.id(), None)
        .await
        .unwrap();

    let err = fx.store.post_entry(&entry, &changes).await.unwrap_err();
    assert!(matches!(err, RepositoryError::VersionConflict { .. }));
    assert!(err.is_retryable());
    assert_eq!(fx.store.entry_count().await, 0);
    assert!(fx.store.postings_for(receivables.id()).await.is_empty());
    let stored = fx.store.find_by_id(receivables.id()).await.unwrap().unwrap();
    assert!(stored.balance().is_zero());
    assert!(!stored.allows_direct_posting());
}

#[tokio::test]
async fn test_posted_entry_carries_stored_version() {
    let fx = Fixture::new();
    let period = fx.january().await;
    let cash = fx.account("1110", "Cash", AccountType::Cash, None).await;
    let capital = fx.account("3100", "Share Capital", AccountType::ShareCapital, None).await;

    let posted = fx
        .post(
            &period,
            date(2026, 1, 2),
            OperationType::OpeningBalance,
            &[(cash.id(), dec!(10))],
            &[(capital.id(), dec!(10))],
        )
        .await
        .unwrap();

    assert_eq!(posted.version(), 1);
    let stored = fx.store.find_entry(posted.id()).await.unwrap().unwrap();
    assert_eq!(stored.version(), 1);
}

// ============================================================================
// Posting effects
// ============================================================================

#[tokio::test]
async fn test_posting_updates_balances_and_running_balances() {
    let fx = Fixture::new();
    let period = fx.january().await;
    let cash = fx.account("1110", "Cash", AccountType::Cash, None).await;
    let capital = fx.account("3100", "Share Capital", AccountType::ShareCapital, None).await;
    let rent = fx.account("5220", "Rent", AccountType::OperatingExpense, None).await;

    fx.post(
        &period,
        date(2026, 1, 2),
        OperationType::OpeningBalance,
        &[(cash.id(), dec!(1000))],
        &[(capital.id(), dec!(1000))],
    )
    .await
    .unwrap();
    fx.post(
        &period,
        date(2026, 1, 10),
        OperationType::Payment,
        &[(rent.id(), dec!(200))],
        &[(cash.id(), dec!(200))],
    )
    .await
    .unwrap();

    let cash_postings = fx.store.postings_for(cash.id()).await;
    assert_eq!(cash_postings.len(), 2);
    assert_eq!(cash_postings[0].running.previous_balance, usd(dec!(0)));
    assert_eq!(cash_postings[0].running.current_balance, usd(dec!(1000)));
    assert_eq!(cash_postings[1].running.previous_balance, usd(dec!(1000)));
    assert_eq!(cash_postings[1].running.current_balance, usd(dec!(800)));
    assert_eq!(cash_postings[1].running.account_version, 2);

    let stored = fx.store.find_by_id(cash.id()).await.unwrap().unwrap();
    assert_eq!(stored.balance(), usd(dec!(800)));
    assert_eq!(stored.version(), cash.version() + 2);
    assert_eq!(
        fx.store.calculate_balance(capital.id(), None).await.unwrap(),
        usd(dec!(1000))
    );
    assert_eq!(
        fx.store
            .calculate_balance(cash.id(), Some(date(2026, 1, 5)))
            .await
            .unwrap(),
        usd(dec!(1000))
    );

    let posted = fx
        .audit
        .event_names()
        .await
        .into_iter()
        .filter(|name| *name == "journal_posted")
        .count();
    assert_eq!(posted, 2);
}

#[tokio::test]
async fn test_reversal_restores_balances_and_keeps_original() {
    let fx = Fixture::new();
    let period = fx.january().await;
    let cash = fx.account("1110", "Cash", AccountType::Cash, None).await;
    let capital = fx.account("3100", "Share Capital", AccountType::ShareCapital, None).await;

    let original = fx
        .post(
            &period,
            date(2026, 1, 2),
            OperationType::OpeningBalance,
            &[(cash.id(), dec!(500))],
            &[(capital.id(), dec!(500))],
        )
        .await
        .unwrap();

    let reversal = fx
        .ledger
        .reverse_journal_entry(original.id(), date(2026, 1, 3), period.id, None, None)
        .await
        .unwrap();

    assert_eq!(reversal.reverses(), Some(original.id()));
    assert_eq!(reversal.operation_type(), OperationType::Reversal);
    assert!(fx.store.calculate_balance(cash.id(), None).await.unwrap().is_zero());
    assert!(fx.store.calculate_balance(capital.id(), None).await.unwrap().is_zero());

    let stored = fx.store.find_entry(original.id()).await.unwrap().unwrap();
    assert_eq!(stored, original);
    assert_eq!(fx.store.entry_count().await, 2);
}

#[tokio::test]
async fn test_reversing_unknown_entry_fails() {
    let fx = Fixture::new();
    let period = fx.january().await;
    let missing = chartwell_shared::types::JournalEntryId::new();

    let err = fx
        .ledger
        .reverse_journal_entry(missing, date(2026, 1, 3), period.id, None, None)
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::EntryNotFound(missing));
}

// ============================================================================
// Period gating
// ============================================================================

#[tokio::test]
async fn test_soft_closed_period_accepts_adjustments_only() {
    let fx = Fixture::new();
    let period = fx.january().await;
    let cash = fx.account("1110", "Cash", AccountType::Cash, None).await;
    let sales = fx
        .account("4100", "Sales Revenue", AccountType::OperatingRevenue, None)
        .await;

    fx.fiscal
        .transition_period(period.id, &TransitionRequest::to(FiscalPeriodStatusType::SoftClose))
        .await
        .unwrap();

    let err = fx
        .post(
            &period,
            date(2026, 1, 20),
            OperationType::Invoice,
            &[(cash.id(), dec!(75))],
            &[(sales.id(), dec!(75))],
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::PeriodRejectsOperation {
            status: FiscalPeriodStatusType::SoftClose,
            operation: OperationType::Invoice,
        }
    ));

    fx.post(
        &period,
        date(2026, 1, 20),
        OperationType::Adjustment,
        &[(cash.id(), dec!(75))],
        &[(sales.id(), dec!(75))],
    )
    .await
    .unwrap();
    assert_eq!(
        fx.store.calculate_balance(sales.id(), None).await.unwrap(),
        usd(dec!(75))
    );
}

// ============================================================================
// Balance guards on the chart
// ============================================================================

#[tokio::test]
async fn test_deactivation_depends_on_balance() {
    let fx = Fixture::new();
    let period = fx.january().await;
    let cash = fx.account("1110", "Cash", AccountType::Cash, None).await;
    let petty = fx.account("1111", "Petty Cash", AccountType::Cash, None).await;
    let capital = fx.account("3100", "Share Capital", AccountType::ShareCapital, None).await;

    fx.post(
        &period,
        date(2026, 1, 2),
        OperationType::OpeningBalance,
        &[(cash.id(), dec!(50.00))],
        &[(capital.id(), dec!(50.00))],
    )
    .await
    .unwrap();

    let err = fx.chart.deactivate_account(cash.id(), None).await.unwrap_err();
    assert!(matches!(
        err,
        ChartError::Account(AccountError::NonZeroBalance { .. })
    ));
    assert!(fx.store.find_by_id(cash.id()).await.unwrap().unwrap().is_active());

    let deactivated = fx.chart.deactivate_account(petty.id(), None).await.unwrap();
    assert!(!deactivated.is_active());
    assert!(deactivated.deactivated_at().is_some());
}
