//! Ledger error types for posting and reversal.
//!
//! This module defines all errors that can occur while building, posting
//! or reversing journal entries: line validation, balance invariants,
//! account eligibility, fiscal period gating and persistence failures.

use chartwell_shared::types::{
    AccountId, Currency, FiscalPeriodId, JournalEntryId, MoneyError,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use super::operation::OperationType;
use crate::error::ErrorKind;
use crate::fiscal::FiscalPeriodStatusType;
use crate::repository::RepositoryError;

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Journal entry must have at least 2 lines.
    #[error("Journal entry must have at least 2 lines")]
    InsufficientLines,

    /// Line amount cannot be zero.
    #[error("Line amount cannot be zero")]
    ZeroAmount,

    /// Line amount cannot be negative.
    #[error("Line amount cannot be negative")]
    NegativeAmount,

    /// Line currency differs from the account currency.
    #[error("Account {account} is kept in {expected}, line is in {actual}")]
    CurrencyMismatch {
        /// Target account.
        account: AccountId,
        /// Account currency.
        expected: Currency,
        /// Line currency.
        actual: Currency,
    },

    /// Entry date falls outside the referenced fiscal period.
    #[error("Entry date {date} is outside fiscal period {period}")]
    DateOutsidePeriod {
        /// Entry date.
        date: NaiveDate,
        /// Referenced period.
        period: FiscalPeriodId,
    },

    /// Money arithmetic failed.
    #[error(transparent)]
    Money(#[from] MoneyError),

    // ========== Invariant Violations ==========
    /// Debits and credits do not net to zero in a currency.
    #[error("Journal entry is not balanced in {currency}. Debit: {debit}, Credit: {credit}")]
    Unbalanced {
        /// Currency that does not balance.
        currency: Currency,
        /// Total debits in that currency.
        debit: Decimal,
        /// Total credits in that currency.
        credit: Decimal,
    },

    /// Account is inactive and cannot be used.
    #[error("Account {0} is inactive")]
    AccountInactive(AccountId),

    /// Account does not allow direct posting.
    #[error("Account {0} does not allow direct posting")]
    AccountNoDirectPosting(AccountId),

    /// Account is archived.
    #[error("Account {0} is archived")]
    AccountArchived(AccountId),

    /// Posted entries are immutable.
    #[error("Journal entry {0} is already posted")]
    AlreadyPosted(JournalEntryId),

    /// Only posted entries can be reversed.
    #[error("Journal entry {0} is not posted and cannot be reversed")]
    NotPosted(JournalEntryId),

    /// The period status does not accept this operation.
    #[error("Fiscal period status {status} does not allow {operation} entries")]
    PeriodRejectsOperation {
        /// Current period status.
        status: FiscalPeriodStatusType,
        /// Rejected operation.
        operation: OperationType,
    },

    // ========== Lookup Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Fiscal period not found.
    #[error("Fiscal period not found: {0}")]
    PeriodNotFound(FiscalPeriodId),

    /// Journal entry not found.
    #[error("Journal entry not found: {0}")]
    EntryNotFound(JournalEntryId),

    // ========== Persistence Errors ==========
    /// Repository failure while writing the entry.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientLines => "INSUFFICIENT_LINES",
            Self::ZeroAmount => "ZERO_AMOUNT",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            Self::DateOutsidePeriod { .. } => "DATE_OUTSIDE_PERIOD",
            Self::Money(_) => "MONEY_ERROR",
            Self::Unbalanced { .. } => "UNBALANCED_ENTRY",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::AccountNoDirectPosting(_) => "ACCOUNT_NO_DIRECT_POSTING",
            Self::AccountArchived(_) => "ACCOUNT_ARCHIVED",
            Self::AlreadyPosted(_) => "ALREADY_POSTED",
            Self::NotPosted(_) => "NOT_POSTED",
            Self::PeriodRejectsOperation { .. } => "PERIOD_REJECTS_OPERATION",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::PeriodNotFound(_) => "PERIOD_NOT_FOUND",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::Repository(err) => err.error_code(),
        }
    }

    /// Returns the taxonomy bucket of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InsufficientLines
            | Self::ZeroAmount
            | Self::NegativeAmount
            | Self::CurrencyMismatch { .. }
            | Self::DateOutsidePeriod { .. }
            | Self::Money(_) => ErrorKind::Validation,
            Self::Unbalanced { .. }
            | Self::AccountInactive(_)
            | Self::AccountNoDirectPosting(_)
            | Self::AccountArchived(_)
            | Self::AlreadyPosted(_)
            | Self::NotPosted(_)
            | Self::PeriodRejectsOperation { .. } => ErrorKind::InvariantViolation,
            Self::AccountNotFound(_) | Self::PeriodNotFound(_) | Self::EntryNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::Repository(err) => err.kind(),
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Repository(err) if err.is_retryable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(LedgerError::InsufficientLines.error_code(), "INSUFFICIENT_LINES");
        assert_eq!(
            LedgerError::Unbalanced {
                currency: Currency::USD,
                debit: dec!(100.00),
                credit: dec!(90.00),
            }
            .error_code(),
            "UNBALANCED_ENTRY"
        );
        assert_eq!(LedgerError::ZeroAmount.error_code(), "ZERO_AMOUNT");
        assert_eq!(LedgerError::NegativeAmount.error_code(), "NEGATIVE_AMOUNT");
    }

    #[test]
    fn test_kinds() {
        assert_eq!(LedgerError::ZeroAmount.kind(), ErrorKind::Validation);
        assert_eq!(
            LedgerError::AccountInactive(AccountId::new()).kind(),
            ErrorKind::InvariantViolation
        );
        assert_eq!(
            LedgerError::EntryNotFound(JournalEntryId::new()).kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_retryable_errors() {
        let conflict = LedgerError::Repository(RepositoryError::VersionConflict {
            entity: "account".to_string(),
            expected: 1,
            actual: 2,
        });
        assert!(conflict.is_retryable());
        assert_eq!(conflict.kind(), ErrorKind::Conflict);
        assert!(!LedgerError::InsufficientLines.is_retryable());
        assert!(!LedgerError::ZeroAmount.is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::Unbalanced {
            currency: Currency::USD,
            debit: dec!(100.00),
            credit: dec!(90.00),
        };
        assert_eq!(
            err.to_string(),
            "Journal entry is not balanced in USD. Debit: 100.00, Credit: 90.00"
        );
    }
}
