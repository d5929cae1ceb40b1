//! Property-based tests for journal entries.
//!
//! - Every line has exactly one non-zero side
//! - An entry posts only if every currency nets to zero
//! - A rejected post leaves the entry untouched
//! - A reversal of a posted entry is itself balanced

use std::sync::Arc;

use chartwell_shared::types::{AccountId, CompanyId, Currency, FiscalYearId, Money};
use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::journal::{JournalEntry, JournalEntryStatus};
use super::line::TransactionLine;
use super::operation::OperationType;
use crate::accounts::{AccountHierarchy, AccountType, HierarchyConfig, NewAccount};
use crate::fiscal::{FiscalPeriod, FiscalPeriodStatus, FiscalPeriodStatusType};

/// Strategy to generate positive amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn currency() -> impl Strategy<Value = Currency> {
    prop_oneof![Just(Currency::USD), Just(Currency::EUR), Just(Currency::JPY)]
}

struct Fixture {
    chart: AccountHierarchy,
    expense: AccountId,
    payable: AccountId,
    period: FiscalPeriod,
    company: CompanyId,
}

fn fixture() -> Fixture {
    let company = CompanyId::new();
    let mut chart = AccountHierarchy::new(Arc::new(HierarchyConfig::default()));
    let expense = chart
        .create(NewAccount::new(
            company,
            "5200",
            "Operating Expenses",
            AccountType::OperatingExpense,
            Currency::USD,
            None,
        ))
        .unwrap();
    let payable = chart
        .create(NewAccount::new(
            company,
            "2110",
            "Accounts Payable",
            AccountType::AccountsPayable,
            Currency::USD,
            None,
        ))
        .unwrap();
    let period = FiscalPeriod::new(
        FiscalYearId::new(),
        1,
        "January 2026",
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
        FiscalPeriodStatus::new(FiscalPeriodStatusType::Open),
    )
    .unwrap();
    Fixture {
        chart,
        expense,
        payable,
        period,
        company,
    }
}

fn entry(f: &Fixture, debits: &[Decimal], credits: &[Decimal]) -> JournalEntry {
    let mut entry = JournalEntry::draft(
        f.company,
        NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
        f.period.id,
        OperationType::Bill,
        "Vendor bill",
    );
    for amount in debits {
        entry
            .add_debit(f.expense, Money::new(*amount, Currency::USD), None)
            .unwrap();
    }
    for amount in credits {
        entry
            .add_credit(f.payable, Money::new(*amount, Currency::USD), None)
            .unwrap();
    }
    entry
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_line_has_exactly_one_side(
        amount in positive_amount(),
        currency in currency(),
        debit in any::<bool>(),
    ) {
        let money = Money::new(amount, currency);
        let line = if debit {
            TransactionLine::create_debit(1, AccountId::new(), money, None).unwrap()
        } else {
            TransactionLine::create_credit(1, AccountId::new(), money, None).unwrap()
        };
        prop_assert!(line.debit().is_zero() != line.credit().is_zero());
        prop_assert_eq!(line.debit().currency, line.credit().currency);
        prop_assert_eq!(line.amount(), money);
    }

    #[test]
    fn prop_split_balanced_entry_posts(
        debits in prop::collection::vec(positive_amount(), 1..8),
    ) {
        let f = fixture();
        let total: Decimal = debits.iter().copied().sum();
        let mut entry = entry(&f, &debits, &[total]);

        let changes = entry.post(&f.period, |id| f.chart.get(id), None).unwrap();
        prop_assert_eq!(entry.status(), JournalEntryStatus::Posted);
        for totals in entry.totals().unwrap() {
            prop_assert_eq!(totals.debit, totals.credit);
        }
        for change in changes {
            prop_assert_eq!(change.change.amount, total);
        }
    }

    #[test]
    fn prop_unbalanced_entry_never_posts(
        debit in positive_amount(),
        credit in positive_amount(),
    ) {
        prop_assume!(debit != credit);
        let f = fixture();
        let mut entry = entry(&f, &[debit], &[credit]);
        let before = entry.clone();

        let result = entry.post(&f.period, |id| f.chart.get(id), None);
        let is_unbalanced = matches!(result, Err(LedgerError::Unbalanced { .. }));
        prop_assert!(is_unbalanced);
        prop_assert_eq!(entry, before);
    }

    #[test]
    fn prop_reversal_is_balanced_and_mirrors(
        amounts in prop::collection::vec(positive_amount(), 1..6),
    ) {
        let f = fixture();
        let total: Decimal = amounts.iter().copied().sum();
        let mut original = entry(&f, &amounts, &[total]);
        original.post(&f.period, |id| f.chart.get(id), None).unwrap();

        let reversal = original
            .reverse(NaiveDate::from_ymd_opt(2026, 1, 20).unwrap(), f.period.id, None)
            .unwrap();
        prop_assert!(reversal.validate_balance().is_ok());
        prop_assert_eq!(reversal.lines().len(), original.lines().len());

        let original_totals = original.totals().unwrap();
        let reversal_totals = reversal.totals().unwrap();
        for (a, b) in original_totals.iter().zip(&reversal_totals) {
            prop_assert_eq!(a.debit, b.credit);
            prop_assert_eq!(a.credit, b.debit);
        }
    }
}
