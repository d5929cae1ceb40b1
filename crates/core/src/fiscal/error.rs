//! Fiscal calendar and status transition errors.

use chartwell_shared::types::FiscalPeriodId;
use chrono::NaiveDate;
use thiserror::Error;

use super::status::FiscalPeriodStatusType;
use crate::error::ErrorKind;
use crate::repository::RepositoryError;

/// Errors raised by fiscal years, periods and status transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FiscalError {
    /// Target is not adjacent to the current status.
    #[error("Invalid fiscal period transition from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: FiscalPeriodStatusType,
        /// Requested status.
        to: FiscalPeriodStatusType,
    },

    /// Current status is final.
    #[error("Fiscal period status {0} is final")]
    FinalState(FiscalPeriodStatusType),

    /// Target status needs an approver.
    #[error("Transition to {0} requires approval")]
    ApprovalRequired(FiscalPeriodStatusType),

    /// Scheduled transition applied before its date.
    #[error("Scheduled transition is not due until {0}")]
    TransitionNotDue(NaiveDate),

    /// Start date after end date.
    #[error("Invalid date range: {start} to {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// Unknown period.
    #[error("Fiscal period not found: {0}")]
    PeriodNotFound(FiscalPeriodId),

    /// Repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl FiscalError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::FinalState(_) => "FINAL_STATE",
            Self::ApprovalRequired(_) => "APPROVAL_REQUIRED",
            Self::TransitionNotDue(_) => "TRANSITION_NOT_DUE",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::PeriodNotFound(_) => "PERIOD_NOT_FOUND",
            Self::Repository(err) => err.error_code(),
        }
    }

    /// Returns the taxonomy bucket of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTransition { .. } | Self::FinalState(_) | Self::ApprovalRequired(_) => {
                ErrorKind::StateTransition
            }
            Self::TransitionNotDue(_) | Self::InvalidDateRange { .. } => ErrorKind::Validation,
            Self::PeriodNotFound(_) => ErrorKind::NotFound,
            Self::Repository(err) => err.kind(),
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Repository(err) if err.is_retryable())
    }
}
