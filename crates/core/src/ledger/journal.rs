//! Journal entry aggregate.
//!
//! A journal entry owns an ordered list of transaction lines. It moves from
//! `Draft` to `Posted` exactly once; posted entries are never edited and are
//! corrected by a new reversing entry instead.

use std::collections::BTreeMap;

use chartwell_shared::types::{
    AccountId, CompanyId, Currency, FiscalPeriodId, JournalEntryId, Money, TransactionLineId, UserId,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::balance::BalanceChange;
use super::error::LedgerError;
use super::line::TransactionLine;
use super::operation::OperationType;
use crate::accounts::Account;
use crate::fiscal::FiscalPeriod;

/// Journal entry lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalEntryStatus {
    /// Lines may still be added.
    Draft,
    /// Written to the ledger (immutable).
    Posted,
}

/// Debit and credit totals of one currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyTotals {
    /// Currency of the totals.
    pub currency: Currency,
    /// Sum of debit amounts.
    pub debit: Decimal,
    /// Sum of credit amounts.
    pub credit: Decimal,
}

impl CurrencyTotals {
    /// Debits minus credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.debit - self.credit
    }

    /// True if debits equal credits.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.debit == self.credit
    }
}

/// A balanced set of transaction lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    id: JournalEntryId,
    company_id: CompanyId,
    entry_date: NaiveDate,
    description: String,
    reference: Option<String>,
    fiscal_period_id: FiscalPeriodId,
    operation_type: OperationType,
    status: JournalEntryStatus,
    lines: Vec<TransactionLine>,
    reverses: Option<JournalEntryId>,
    posted_at: Option<DateTime<Utc>>,
    posted_by: Option<UserId>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    version: i64,
}

impl JournalEntry {
    /// Starts a draft entry without lines.
    #[must_use]
    pub fn draft(
        company_id: CompanyId,
        entry_date: NaiveDate,
        fiscal_period_id: FiscalPeriodId,
        operation_type: OperationType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: JournalEntryId::new(),
            company_id,
            entry_date,
            description: description.into(),
            reference: None,
            fiscal_period_id,
            operation_type,
            status: JournalEntryStatus::Draft,
            lines: Vec::new(),
            reverses: None,
            posted_at: None,
            posted_by: None,
            created_at: Utc::now(),
            version: 0,
        }
    }

    /// Attaches an external reference such as an invoice number.
    #[must_use]
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Entry id.
    #[must_use]
    pub fn id(&self) -> JournalEntryId {
        self.id
    }

    /// Owning company.
    #[must_use]
    pub fn company_id(&self) -> CompanyId {
        self.company_id
    }

    /// Accounting date.
    #[must_use]
    pub fn entry_date(&self) -> NaiveDate {
        self.entry_date
    }

    /// Description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// External reference.
    #[must_use]
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    /// Fiscal period the entry is booked into.
    #[must_use]
    pub fn fiscal_period_id(&self) -> FiscalPeriodId {
        self.fiscal_period_id
    }

    /// Operation type.
    #[must_use]
    pub fn operation_type(&self) -> OperationType {
        self.operation_type
    }

    /// Lifecycle status.
    #[must_use]
    pub fn status(&self) -> JournalEntryStatus {
        self.status
    }

    /// True once posted.
    #[must_use]
    pub fn is_posted(&self) -> bool {
        self.status == JournalEntryStatus::Posted
    }

    /// Lines in order.
    #[must_use]
    pub fn lines(&self) -> &[TransactionLine] {
        &self.lines
    }

    /// The entry this one reverses.
    #[must_use]
    pub fn reverses(&self) -> Option<JournalEntryId> {
        self.reverses
    }

    /// Posting timestamp.
    #[must_use]
    pub fn posted_at(&self) -> Option<DateTime<Utc>> {
        self.posted_at
    }

    /// Posting user.
    #[must_use]
    pub fn posted_by(&self) -> Option<UserId> {
        self.posted_by
    }

    /// Creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Appends a debit line.
    pub fn add_debit(
        &mut self,
        account_id: AccountId,
        amount: Money,
        description: Option<String>,
    ) -> Result<TransactionLineId, LedgerError> {
        self.ensure_draft()?;
        let line = TransactionLine::create_debit(self.next_line_number(), account_id, amount, description)?;
        Ok(self.push(line))
    }

    /// Appends a credit line.
    pub fn add_credit(
        &mut self,
        account_id: AccountId,
        amount: Money,
        description: Option<String>,
    ) -> Result<TransactionLineId, LedgerError> {
        self.ensure_draft()?;
        let line =
            TransactionLine::create_credit(self.next_line_number(), account_id, amount, description)?;
        Ok(self.push(line))
    }

    /// Debit and credit totals per currency, ordered by currency code.
    pub fn totals(&self) -> Result<Vec<CurrencyTotals>, LedgerError> {
        let mut sums: BTreeMap<Currency, (Money, Money)> = BTreeMap::new();
        for line in &self.lines {
            let currency = line.amount().currency;
            let (debit, credit) = sums
                .entry(currency)
                .or_insert_with(|| (Money::zero(currency), Money::zero(currency)));
            *debit = debit.checked_add(&line.debit())?;
            *credit = credit.checked_add(&line.credit())?;
        }
        Ok(sums
            .into_iter()
            .map(|(currency, (debit, credit))| CurrencyTotals {
                currency,
                debit: debit.amount,
                credit: credit.amount,
            })
            .collect())
    }

    /// Checks the double-entry invariant: at least two lines and debits equal
    /// credits in every currency.
    pub fn validate_balance(&self) -> Result<(), LedgerError> {
        if self.lines.len() < 2 {
            return Err(LedgerError::InsufficientLines);
        }
        if let Some(totals) = self.totals()?.into_iter().find(|t| !t.is_balanced()) {
            return Err(LedgerError::Unbalanced {
                currency: totals.currency,
                debit: totals.debit,
                credit: totals.credit,
            });
        }
        Ok(())
    }

    /// Posts the entry.
    ///
    /// Every check runs before the status changes, so a rejected entry stays
    /// a draft with no side effects. On success returns the per-account
    /// balance changes the persistence layer must apply together with the
    /// lines.
    ///
    /// # Errors
    ///
    /// Rejects unbalanced entries, periods that do not accept the operation
    /// or the date, and lines targeting unknown, inactive, archived or
    /// control accounts or using another currency than their account.
    pub fn post<'a, F>(
        &mut self,
        period: &FiscalPeriod,
        account_of: F,
        posted_by: Option<UserId>,
    ) -> Result<Vec<BalanceChange>, LedgerError>
    where
        F: Fn(AccountId) -> Option<&'a Account>,
    {
        self.ensure_draft()?;
        self.validate_balance()?;

        if period.id != self.fiscal_period_id {
            return Err(LedgerError::PeriodNotFound(self.fiscal_period_id));
        }
        if !period.contains_date(self.entry_date) {
            return Err(LedgerError::DateOutsidePeriod {
                date: self.entry_date,
                period: period.id,
            });
        }
        if !period.status.is_transaction_allowed(self.operation_type) {
            return Err(LedgerError::PeriodRejectsOperation {
                status: period.status.status(),
                operation: self.operation_type,
            });
        }

        let mut changes: BTreeMap<AccountId, BalanceChange> = BTreeMap::new();
        for line in &self.lines {
            let account = account_of(line.account_id())
                .ok_or(LedgerError::AccountNotFound(line.account_id()))?;
            Self::check_account(account, line)?;

            let delta = Money::new(
                account
                    .normal_balance()
                    .balance_change(line.debit().amount, line.credit().amount),
                account.currency(),
            );
            let change = changes.entry(account.id()).or_insert_with(|| BalanceChange {
                account_id: account.id(),
                change: Money::zero(account.currency()),
                account_version: account.version(),
            });
            change.change = change.change.checked_add(&delta)?;
        }

        self.status = JournalEntryStatus::Posted;
        self.posted_at = Some(Utc::now());
        self.posted_by = posted_by;

        Ok(changes.into_values().collect())
    }

    /// Builds a new draft that reverses this posted entry. The original is
    /// left untouched.
    ///
    /// # Errors
    ///
    /// Returns `NotPosted` for drafts.
    pub fn reverse(
        &self,
        entry_date: NaiveDate,
        fiscal_period_id: FiscalPeriodId,
        description: Option<String>,
    ) -> Result<Self, LedgerError> {
        if !self.is_posted() {
            return Err(LedgerError::NotPosted(self.id));
        }
        let description =
            description.unwrap_or_else(|| format!("Reversal of {}", self.description));
        let mut reversal = Self::draft(
            self.company_id,
            entry_date,
            fiscal_period_id,
            OperationType::Reversal,
            description,
        );
        reversal.reverses = Some(self.id);
        reversal.reference.clone_from(&self.reference);
        reversal.lines = self
            .lines
            .iter()
            .zip(1..)
            .map(|(line, number)| line.reversed(number))
            .collect();
        Ok(reversal)
    }

    /// Storage version, 0 until persisted.
    #[must_use]
    pub fn version(&self) -> i64 {
        self.version
    }

    /// Sets the storage version.
    pub fn set_version(&mut self, version: i64) {
        self.version = version;
    }

    /// Points every line on `from` at `to`. Used by account merges on
    /// persisted entries; returns the number of lines changed.
    pub fn reassign_account(&mut self, from: AccountId, to: AccountId) -> usize {
        let mut count = 0;
        self.lines = std::mem::take(&mut self.lines)
            .into_iter()
            .map(|line| {
                if line.account_id() == from {
                    count += 1;
                    line.reassigned_to(to)
                } else {
                    line
                }
            })
            .collect();
        count
    }

    fn check_account(account: &Account, line: &TransactionLine) -> Result<(), LedgerError> {
        if account.is_archived() {
            return Err(LedgerError::AccountArchived(account.id()));
        }
        if !account.is_active() {
            return Err(LedgerError::AccountInactive(account.id()));
        }
        if !account.allows_direct_posting() {
            return Err(LedgerError::AccountNoDirectPosting(account.id()));
        }
        let currency = line.amount().currency;
        if currency != account.currency() {
            return Err(LedgerError::CurrencyMismatch {
                account: account.id(),
                expected: account.currency(),
                actual: currency,
            });
        }
        Ok(())
    }

    fn ensure_draft(&self) -> Result<(), LedgerError> {
        if self.is_posted() {
            return Err(LedgerError::AlreadyPosted(self.id));
        }
        Ok(())
    }

    fn next_line_number(&self) -> u32 {
        u32::try_from(self.lines.len()).map_or(u32::MAX, |n| n.saturating_add(1))
    }

    fn push(&mut self, line: TransactionLine) -> TransactionLineId {
        let id = line.id();
        self.lines.push(line);
        id
    }
}
