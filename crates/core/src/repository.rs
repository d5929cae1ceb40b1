//! Persistence collaborator contracts.
//!
//! The core never stores anything itself. Services talk to these traits;
//! implementations own atomicity and optimistic version checks. A
//! repository instance is scoped to one company's chart.

use std::future::Future;

use chartwell_shared::types::{AccountId, Currency, FiscalPeriodId, JournalEntryId, Money};
use chrono::NaiveDate;
use thiserror::Error;

use crate::accounts::Account;
use crate::error::ErrorKind;
use crate::fiscal::FiscalPeriod;
use crate::ledger::{BalanceChange, JournalEntry};

/// Errors reported by repository implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// Stored version differs from the version being saved.
    #[error("Version conflict on {entity}: expected {expected}, found {actual}")]
    VersionConflict {
        /// Entity kind.
        entity: String,
        /// Version carried by the caller.
        expected: i64,
        /// Version in storage.
        actual: i64,
    },

    /// Entity missing.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind.
        entity: String,
        /// Identifier.
        id: String,
    },

    /// Unique key already taken.
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// Storage unavailable or failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl RepositoryError {
    /// Shorthand for a missing entity.
    #[must_use]
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::VersionConflict { .. } => "VERSION_CONFLICT",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::DuplicateKey(_) => "DUPLICATE_KEY",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Returns the taxonomy bucket of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::VersionConflict { .. } => ErrorKind::Conflict,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::DuplicateKey(_) => ErrorKind::Validation,
            Self::Storage(_) => ErrorKind::Infrastructure,
        }
    }

    /// Only version conflicts are worth an unchanged retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }
}

/// Account storage.
pub trait AccountRepository: Send + Sync {
    /// Finds an account by id.
    fn find_by_id(
        &self,
        id: AccountId,
    ) -> impl Future<Output = Result<Option<Account>, RepositoryError>> + Send;

    /// Finds an account by code.
    fn find_by_code(
        &self,
        code: &str,
    ) -> impl Future<Output = Result<Option<Account>, RepositoryError>> + Send;

    /// All accounts of the chart.
    fn find_all(&self) -> impl Future<Output = Result<Vec<Account>, RepositoryError>> + Send;

    /// Accounts kept in `currency`.
    fn find_by_currency(
        &self,
        currency: Currency,
    ) -> impl Future<Output = Result<Vec<Account>, RepositoryError>> + Send;

    /// Upserts an account. The stored version must equal `account.version()`;
    /// the returned copy carries the incremented version.
    fn save(
        &self,
        account: Account,
    ) -> impl Future<Output = Result<Account, RepositoryError>> + Send;

    /// Balance from posted lines dated on or before `as_of` (all lines when
    /// `None`), signed by the account's normal side.
    fn calculate_balance(
        &self,
        id: AccountId,
        as_of: Option<NaiveDate>,
    ) -> impl Future<Output = Result<Money, RepositoryError>> + Send;

    /// Moves every posted line of `retired` to `to`, carrying the balance
    /// along, and stores `retired` (already deactivated) in the same atomic
    /// step. The stored source must still be at `retired.version()`.
    /// Returns the number of lines moved.
    fn reassign_transactions(
        &self,
        retired: Account,
        to: AccountId,
        effective_date: NaiveDate,
    ) -> impl Future<Output = Result<u64, RepositoryError>> + Send;

    /// Inactive accounts deactivated on or before `date`.
    fn find_inactive_accounts_since(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<Account>, RepositoryError>> + Send;

    /// Days since the last posted line, deactivation or creation, whichever
    /// is latest.
    fn get_days_since_last_activity(
        &self,
        id: AccountId,
    ) -> impl Future<Output = Result<i64, RepositoryError>> + Send;
}

/// Journal entry storage.
pub trait JournalRepository: Send + Sync {
    /// Finds an entry by id.
    fn find_entry(
        &self,
        id: JournalEntryId,
    ) -> impl Future<Output = Result<Option<JournalEntry>, RepositoryError>> + Send;

    /// Writes a posted entry and applies its balance changes. Either all of
    /// it becomes visible or none of it does. Each touched account must
    /// still be at the version carried by its change; the returned copy
    /// carries the entry's stored version.
    fn post_entry(
        &self,
        entry: &JournalEntry,
        changes: &[BalanceChange],
    ) -> impl Future<Output = Result<JournalEntry, RepositoryError>> + Send;
}

/// Fiscal period storage.
pub trait FiscalPeriodRepository: Send + Sync {
    /// Finds a period by id.
    fn find_period(
        &self,
        id: FiscalPeriodId,
    ) -> impl Future<Output = Result<Option<FiscalPeriod>, RepositoryError>> + Send;

    /// Finds the period containing `date`.
    fn find_period_for_date(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Option<FiscalPeriod>, RepositoryError>> + Send;

    /// Upserts a period with the same version rule as accounts.
    fn save_period(
        &self,
        period: FiscalPeriod,
    ) -> impl Future<Output = Result<FiscalPeriod, RepositoryError>> + Send;
}
