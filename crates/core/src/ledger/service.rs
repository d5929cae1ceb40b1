//! Ledger service for posting and reversing journal entries.
//!
//! The service loads the period and accounts an entry touches, lets the
//! entry validate itself, and hands the result to the repository, which
//! writes lines and balance changes atomically. A rejected entry writes
//! nothing.

use std::collections::HashMap;
use std::sync::Arc;

use chartwell_shared::types::{AccountId, FiscalPeriodId, JournalEntryId, UserId};
use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use super::error::LedgerError;
use super::journal::JournalEntry;
use crate::accounts::Account;
use crate::audit::{AuditRecord, AuditSink, DomainEvent};
use crate::repository::{AccountRepository, FiscalPeriodRepository, JournalRepository};

/// Ledger service over a repository and an audit sink.
pub struct LedgerService<R, A> {
    repo: Arc<R>,
    audit: Arc<A>,
}

impl<R, A> LedgerService<R, A>
where
    R: AccountRepository + JournalRepository + FiscalPeriodRepository,
    A: AuditSink,
{
    /// Create a new ledger service.
    #[must_use]
    pub fn new(repo: Arc<R>, audit: Arc<A>) -> Self {
        Self { repo, audit }
    }

    /// Validates and posts a draft entry.
    ///
    /// Steps:
    /// 1. Load the referenced fiscal period
    /// 2. Load every account the lines touch
    /// 3. Validate balance, period gating and account eligibility
    /// 4. Persist lines and balance changes in one atomic write
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if any check fails or the write is rejected
    /// (for example on a version conflict, which is retryable).
    #[instrument(skip(self, entry), fields(entry_id = %entry.id()))]
    pub async fn post_journal_entry(
        &self,
        mut entry: JournalEntry,
        posted_by: Option<UserId>,
    ) -> Result<JournalEntry, LedgerError> {
        let period = self
            .repo
            .find_period(entry.fiscal_period_id())
            .await?
            .ok_or(LedgerError::PeriodNotFound(entry.fiscal_period_id()))?;

        let mut accounts: HashMap<AccountId, Account> = HashMap::new();
        for line in entry.lines() {
            let id = line.account_id();
            if accounts.contains_key(&id) {
                continue;
            }
            if let Some(account) = self.repo.find_by_id(id).await? {
                accounts.insert(id, account);
            }
        }

        let changes = match entry.post(&period, |id| accounts.get(&id), posted_by) {
            Ok(changes) => changes,
            Err(err) => {
                warn!(error = %err, code = err.error_code(), "journal entry rejected");
                return Err(err);
            }
        };

        let entry = self.repo.post_entry(&entry, &changes).await?;
        info!(
            lines = entry.lines().len(),
            accounts = changes.len(),
            operation = %entry.operation_type(),
            "journal entry posted"
        );

        self.emit(
            DomainEvent::JournalPosted {
                entry_id: entry.id(),
                line_count: entry.lines().len(),
                reverses: entry.reverses(),
            },
            posted_by,
        )
        .await;
        Ok(entry)
    }

    /// Posts a reversing entry for a posted entry. The original is not
    /// modified.
    ///
    /// # Errors
    ///
    /// Fails if the original is unknown or not posted, or if the reversal
    /// cannot be posted into `fiscal_period_id`.
    pub async fn reverse_journal_entry(
        &self,
        entry_id: JournalEntryId,
        entry_date: NaiveDate,
        fiscal_period_id: FiscalPeriodId,
        description: Option<String>,
        posted_by: Option<UserId>,
    ) -> Result<JournalEntry, LedgerError> {
        let original = self
            .repo
            .find_entry(entry_id)
            .await?
            .ok_or(LedgerError::EntryNotFound(entry_id))?;
        let reversal = original.reverse(entry_date, fiscal_period_id, description)?;
        info!(original = %entry_id, reversal = %reversal.id(), "reversing journal entry");
        self.post_journal_entry(reversal, posted_by).await
    }

    async fn emit(&self, event: DomainEvent, actor: Option<UserId>) {
        let name = event.name();
        if let Err(err) = self.audit.record(AuditRecord::new(event, actor)).await {
            warn!(event = name, error = %err, "failed to record audit event");
        }
    }
}
