//! In-memory repository.
//!
//! All state sits behind one `RwLock`, so each repository call is a single
//! critical section. Writes validate everything against copies first and
//! only then commit, which keeps journal posting and line reassignment
//! atomic.

use std::collections::HashMap;

use chartwell_core::accounts::Account;
use chartwell_core::fiscal::FiscalPeriod;
use chartwell_core::ledger::{
    AccountBalance, BalanceChange, JournalEntry, RunningBalance, TransactionLine,
};
use chartwell_core::repository::{
    AccountRepository, FiscalPeriodRepository, JournalRepository, RepositoryError,
};
use chartwell_shared::types::{AccountId, Currency, FiscalPeriodId, JournalEntryId, Money};
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// A posted line with the running balance it produced on its account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    /// Entry the line belongs to.
    pub entry_id: JournalEntryId,
    /// Entry date.
    pub entry_date: NaiveDate,
    /// The line, pointing at its current account.
    pub line: TransactionLine,
    /// Balance before and after the line on that account.
    pub running: RunningBalance,
}

/// A completed line reassignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Reassignment {
    from: AccountId,
    to: AccountId,
    effective_date: NaiveDate,
    lines: u64,
}

#[derive(Debug, Default)]
struct StoreState {
    accounts: HashMap<AccountId, Account>,
    codes: HashMap<String, AccountId>,
    entries: HashMap<JournalEntryId, JournalEntry>,
    postings: Vec<Posting>,
    periods: HashMap<FiscalPeriodId, FiscalPeriod>,
    reassignments: Vec<Reassignment>,
    today: Option<NaiveDate>,
    fail_next_reassign: bool,
}

impl StoreState {
    fn account(&self, id: AccountId) -> Result<&Account, RepositoryError> {
        self.accounts
            .get(&id)
            .ok_or_else(|| RepositoryError::not_found("account", id))
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Utc::now().date_naive())
    }

    fn last_running(&self, id: AccountId) -> Option<RunningBalance> {
        self.postings
            .iter()
            .rev()
            .find(|p| p.line.account_id() == id)
            .map(|p| p.running)
    }

    /// Recomputes the running balance chain of one account in posting order.
    fn rebuild_running(&mut self, account: &Account) -> Result<(), RepositoryError> {
        let mut previous: Option<RunningBalance> = None;
        for posting in &mut self.postings {
            if posting.line.account_id() != account.id() {
                continue;
            }
            let change = signed_change(account, &posting.line);
            let running = match &previous {
                Some(prev) => RunningBalance::next_entry(prev, change).map_err(storage)?,
                None => RunningBalance::first_entry(change),
            };
            posting.running = running;
            previous = Some(running);
        }
        Ok(())
    }
}

fn storage(err: impl ToString) -> RepositoryError {
    RepositoryError::Storage(err.to_string())
}

fn signed_change(account: &Account, line: &TransactionLine) -> Money {
    Money::new(
        account
            .normal_balance()
            .balance_change(line.debit().amount, line.credit().amount),
        account.currency(),
    )
}

fn check_version(entity: &str, stored: i64, carried: i64) -> Result<(), RepositoryError> {
    if stored == carried {
        Ok(())
    } else {
        Err(RepositoryError::VersionConflict {
            entity: entity.to_string(),
            expected: carried,
            actual: stored,
        })
    }
}

/// Repository over process memory, scoped to one company's chart.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins the date used for activity calculations.
    pub async fn set_today(&self, today: NaiveDate) {
        self.state.write().await.today = Some(today);
    }

    /// Makes the next `reassign_transactions` call fail without changes.
    pub async fn fail_next_reassign(&self) {
        self.state.write().await.fail_next_reassign = true;
    }

    /// Posted lines of an account, oldest first.
    pub async fn postings_for(&self, id: AccountId) -> Vec<Posting> {
        self.state
            .read()
            .await
            .postings
            .iter()
            .filter(|p| p.line.account_id() == id)
            .cloned()
            .collect()
    }

    /// Number of posted journal entries.
    pub async fn entry_count(&self) -> usize {
        self.state.read().await.entries.len()
    }
}

impl AccountRepository for InMemoryStore {
    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        Ok(self.state.read().await.accounts.get(&id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Account>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .codes
            .get(code)
            .and_then(|id| state.accounts.get(id))
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<Account>, RepositoryError> {
        let state = self.state.read().await;
        let mut accounts: Vec<Account> = state.accounts.values().cloned().collect();
        accounts.sort_by(|a, b| a.code().cmp(b.code()));
        Ok(accounts)
    }

    async fn find_by_currency(&self, currency: Currency) -> Result<Vec<Account>, RepositoryError> {
        let state = self.state.read().await;
        let mut accounts: Vec<Account> = state
            .accounts
            .values()
            .filter(|a| a.currency() == currency)
            .cloned()
            .collect();
        accounts.sort_by(|a, b| a.code().cmp(b.code()));
        Ok(accounts)
    }

    async fn save(&self, mut account: Account) -> Result<Account, RepositoryError> {
        let mut state = self.state.write().await;
        let previous_code = match state.accounts.get(&account.id()) {
            Some(stored) => {
                check_version("account", stored.version(), account.version())?;
                Some(stored.code().to_string())
            }
            None => {
                check_version("account", 0, account.version())?;
                None
            }
        };
        if let Some(owner) = state.codes.get(account.code())
            && *owner != account.id()
        {
            return Err(RepositoryError::DuplicateKey(account.code().to_string()));
        }

        account.set_version(account.version() + 1);
        if let Some(code) = previous_code {
            state.codes.remove(&code);
        }
        state.codes.insert(account.code().to_string(), account.id());
        state.accounts.insert(account.id(), account.clone());
        debug!(account_id = %account.id(), version = account.version(), "account saved");
        Ok(account)
    }

    async fn calculate_balance(
        &self,
        id: AccountId,
        as_of: Option<NaiveDate>,
    ) -> Result<Money, RepositoryError> {
        let state = self.state.read().await;
        let account = state.account(id)?;
        let mut balance = AccountBalance::new(id, account.currency());
        for posting in &state.postings {
            if posting.line.account_id() != id {
                continue;
            }
            if as_of.is_some_and(|date| posting.entry_date > date) {
                continue;
            }
            balance.add_line(&posting.line).map_err(storage)?;
        }
        Ok(balance.net(account.normal_balance()))
    }

    async fn reassign_transactions(
        &self,
        retired: Account,
        to: AccountId,
        effective_date: NaiveDate,
    ) -> Result<u64, RepositoryError> {
        let from = retired.id();
        let mut state = self.state.write().await;
        if std::mem::take(&mut state.fail_next_reassign) {
            warn!(from = %from, to = %to, "reassignment failed");
            return Err(RepositoryError::Storage("reassignment failed".to_string()));
        }

        let stored = state.account(from)?;
        check_version("account", stored.version(), retired.version())?;
        let carried = stored.balance();
        let mut source = retired;
        let mut target = state.account(to)?.clone();
        if source.currency() != target.currency() {
            return Err(storage(format!(
                "cannot move {} lines into a {} account",
                source.currency(),
                target.currency()
            )));
        }
        target.apply_balance_change(carried).map_err(storage)?;
        source
            .update_balance(Money::zero(source.currency()))
            .map_err(storage)?;
        source.set_version(source.version() + 1);
        target.set_version(target.version() + 1);

        let mut moved = 0u64;
        for posting in &mut state.postings {
            if posting.line.account_id() == from {
                posting.line = posting.line.clone().reassigned_to(to);
                moved += 1;
            }
        }
        for entry in state.entries.values_mut() {
            if entry.reassign_account(from, to) > 0 {
                entry.set_version(entry.version() + 1);
            }
        }
        state.rebuild_running(&target)?;
        state.accounts.insert(from, source);
        state.accounts.insert(to, target);
        state.reassignments.push(Reassignment {
            from,
            to,
            effective_date,
            lines: moved,
        });

        info!(from = %from, to = %to, lines = moved, %effective_date, "lines reassigned");
        Ok(moved)
    }

    async fn find_inactive_accounts_since(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<Account>, RepositoryError> {
        let state = self.state.read().await;
        let mut accounts: Vec<Account> = state
            .accounts
            .values()
            .filter(|a| !a.is_active())
            .filter(|a| a.deactivated_at().is_some_and(|at| at.date_naive() <= date))
            .cloned()
            .collect();
        accounts.sort_by(|a, b| a.code().cmp(b.code()));
        Ok(accounts)
    }

    async fn get_days_since_last_activity(&self, id: AccountId) -> Result<i64, RepositoryError> {
        let state = self.state.read().await;
        let account = state.account(id)?;
        let last_posting = state
            .postings
            .iter()
            .filter(|p| p.line.account_id() == id)
            .map(|p| p.entry_date)
            .max();
        let last_reassignment = state
            .reassignments
            .iter()
            .filter(|r| r.lines > 0 && (r.from == id || r.to == id))
            .map(|r| r.effective_date)
            .max();
        let last = [
            Some(account.created_at().date_naive()),
            account.deactivated_at().map(|at| at.date_naive()),
            last_posting,
            last_reassignment,
        ]
        .into_iter()
        .flatten()
        .max()
        .unwrap_or_else(|| state.today());
        Ok((state.today() - last).num_days())
    }
}

impl JournalRepository for InMemoryStore {
    async fn find_entry(&self, id: JournalEntryId) -> Result<Option<JournalEntry>, RepositoryError> {
        Ok(self.state.read().await.entries.get(&id).cloned())
    }

    async fn post_entry(
        &self,
        entry: &JournalEntry,
        changes: &[BalanceChange],
    ) -> Result<JournalEntry, RepositoryError> {
        let mut state = self.state.write().await;
        if !entry.is_posted() {
            return Err(storage(format!("journal entry {} is not posted", entry.id())));
        }
        if state.entries.contains_key(&entry.id()) {
            return Err(RepositoryError::DuplicateKey(entry.id().to_string()));
        }

        let mut updated: HashMap<AccountId, Account> = HashMap::with_capacity(changes.len());
        for change in changes {
            let mut account = state.account(change.account_id)?.clone();
            check_version("account", account.version(), change.account_version)?;
            account
                .apply_balance_change(change.change)
                .map_err(storage)?;
            account.set_version(account.version() + 1);
            updated.insert(account.id(), account);
        }

        let mut running: HashMap<AccountId, Option<RunningBalance>> = HashMap::new();
        let mut postings = Vec::with_capacity(entry.lines().len());
        for line in entry.lines() {
            let account = updated
                .get(&line.account_id())
                .ok_or_else(|| RepositoryError::not_found("account", line.account_id()))?;
            let last = running
                .entry(line.account_id())
                .or_insert_with(|| state.last_running(line.account_id()));
            let change = signed_change(account, line);
            let next = match last {
                Some(prev) => RunningBalance::next_entry(prev, change).map_err(storage)?,
                None => RunningBalance::first_entry(change),
            };
            *last = Some(next);
            postings.push(Posting {
                entry_id: entry.id(),
                entry_date: entry.entry_date(),
                line: line.clone(),
                running: next,
            });
        }

        let mut stored = entry.clone();
        stored.set_version(entry.version() + 1);
        state.accounts.extend(updated);
        state.postings.extend(postings);
        state.entries.insert(stored.id(), stored.clone());
        debug!(entry_id = %stored.id(), version = stored.version(), "journal entry stored");
        Ok(stored)
    }
}

impl FiscalPeriodRepository for InMemoryStore {
    async fn find_period(&self, id: FiscalPeriodId) -> Result<Option<FiscalPeriod>, RepositoryError> {
        Ok(self.state.read().await.periods.get(&id).cloned())
    }

    async fn find_period_for_date(
        &self,
        date: NaiveDate,
    ) -> Result<Option<FiscalPeriod>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .periods
            .values()
            .filter(|p| p.contains_date(date))
            .min_by_key(|p| (p.start_date, p.period_number))
            .cloned())
    }

    async fn save_period(&self, mut period: FiscalPeriod) -> Result<FiscalPeriod, RepositoryError> {
        let mut state = self.state.write().await;
        let stored = state.periods.get(&period.id).map_or(0, |p| p.version);
        check_version("fiscal_period", stored, period.version)?;
        period.version += 1;
        state.periods.insert(period.id, period.clone());
        debug!(period_id = %period.id, version = period.version, "fiscal period saved");
        Ok(period)
    }
}

#[cfg(test)]
mod tests {
    use chartwell_core::accounts::{AccountHierarchy, AccountType, HierarchyConfig, NewAccount};
    use chartwell_shared::types::CompanyId;
    use std::sync::Arc;

    use super::*;

    fn cash() -> Account {
        let mut chart = AccountHierarchy::new(Arc::new(HierarchyConfig::default()));
        let id = chart
            .create(NewAccount::new(
                CompanyId::new(),
                "1110",
                "Cash",
                AccountType::Cash,
                Currency::USD,
                None,
            ))
            .unwrap();
        chart.get(id).cloned().unwrap()
    }

    #[tokio::test]
    async fn test_save_increments_version() {
        let store = InMemoryStore::new();
        let saved = store.save(cash()).await.unwrap();
        assert_eq!(saved.version(), 1);
        let again = store.save(saved).await.unwrap();
        assert_eq!(again.version(), 2);
    }

    #[tokio::test]
    async fn test_stale_save_is_a_version_conflict() {
        let store = InMemoryStore::new();
        let saved = store.save(cash()).await.unwrap();
        store.save(saved.clone()).await.unwrap();

        let err = store.save(saved).await.unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::VersionConflict {
                expected: 1,
                actual: 2,
                ..
            }
        ));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_code_is_unique() {
        let store = InMemoryStore::new();
        store.save(cash()).await.unwrap();
        let err = store.save(cash()).await.unwrap_err();
        assert_eq!(err, RepositoryError::DuplicateKey("1110".into()));
    }

    #[tokio::test]
    async fn test_unknown_account_balance_is_not_found() {
        let store = InMemoryStore::new();
        let err = store
            .calculate_balance(AccountId::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_activity_counts_from_creation() {
        let store = InMemoryStore::new();
        let saved = store.save(cash()).await.unwrap();
        let created = saved.created_at().date_naive();
        store.set_today(created + chrono::Days::new(30)).await;
        assert_eq!(store.get_days_since_last_activity(saved.id()).await.unwrap(), 30);
    }
}
