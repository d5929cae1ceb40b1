//! Chart of accounts service error types.

use chartwell_shared::types::{AccountId, Currency, MoneyError};
use thiserror::Error;

use crate::accounts::{AccountError, AccountType};
use crate::error::ErrorKind;
use crate::repository::RepositoryError;

/// Errors raised by chart-level operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChartError {
    /// Account-level rule failed.
    #[error(transparent)]
    Account(#[from] AccountError),

    /// Repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Money arithmetic failed while totalling.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Unknown account.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Source and target are the same account.
    #[error("Cannot merge account {0} into itself")]
    MergeSameAccount(AccountId),

    /// Source and target differ in type.
    #[error("Cannot merge {source_type} account into {target_type} account")]
    MergeTypeMismatch {
        /// Source type.
        source_type: AccountType,
        /// Target type.
        target_type: AccountType,
    },

    /// Source and target differ in currency.
    #[error("Cannot merge {source_currency} account into {target_currency} account")]
    MergeCurrencyMismatch {
        /// Source currency.
        source_currency: Currency,
        /// Target currency.
        target_currency: Currency,
    },

    /// Merge target must be active to receive lines.
    #[error("Merge target {0} is inactive")]
    MergeTargetInactive(AccountId),

    /// Inactivity threshold below zero.
    #[error("Minimum inactive days must not be negative, got {0}")]
    InvalidThreshold(i64),
}

impl ChartError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Account(err) => err.error_code(),
            Self::Repository(err) => err.error_code(),
            Self::Money(_) => "MONEY_ERROR",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::MergeSameAccount(_) => "MERGE_SAME_ACCOUNT",
            Self::MergeTypeMismatch { .. } => "MERGE_TYPE_MISMATCH",
            Self::MergeCurrencyMismatch { .. } => "MERGE_CURRENCY_MISMATCH",
            Self::MergeTargetInactive(_) => "MERGE_TARGET_INACTIVE",
            Self::InvalidThreshold(_) => "INVALID_THRESHOLD",
        }
    }

    /// Returns the taxonomy bucket of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Account(err) => err.kind(),
            Self::Repository(err) => err.kind(),
            Self::Money(_)
            | Self::MergeSameAccount(_)
            | Self::MergeTypeMismatch { .. }
            | Self::MergeCurrencyMismatch { .. }
            | Self::InvalidThreshold(_) => ErrorKind::Validation,
            Self::MergeTargetInactive(_) => ErrorKind::InvariantViolation,
            Self::AccountNotFound(_) => ErrorKind::NotFound,
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

    #[test]
    fn test_merge_mismatch_is_validation() {
        let err = ChartError::MergeTypeMismatch {
            source_type: AccountType::Cash,
            target_type: AccountType::Bank,
        };
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.error_code(), "MERGE_TYPE_MISMATCH");
        assert_eq!(err.to_string(), "Cannot merge cash account into bank account");
    }

    #[test]
    fn test_wrapped_errors_delegate() {
        let id = AccountId::new();
        let err: ChartError = AccountError::SelfParent(id).into();
        assert_eq!(err.kind(), ErrorKind::InvariantViolation);
        assert_eq!(err.error_code(), "SELF_PARENT");
        assert!(!err.is_retryable());

        let err: ChartError = RepositoryError::VersionConflict {
            entity: "account".into(),
            expected: 1,
            actual: 3,
        }
        .into();
        assert!(err.is_retryable());
    }
}
