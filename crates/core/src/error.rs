//! Error taxonomy shared by the core modules.
//!
//! Each module owns its own `thiserror` enum; all of them classify into
//! [`ErrorKind`] and convert into [`AppError`] at the crate boundary.

use chartwell_shared::AppError;
use serde::Serialize;

use crate::accounts::AccountError;
use crate::chart::ChartError;
use crate::fiscal::FiscalError;
use crate::ledger::LedgerError;
use crate::repository::RepositoryError;

/// Taxonomy bucket of a domain error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Structural or format violation, checked before any mutation.
    Validation,
    /// Domain invariant would break; state is left unchanged.
    InvariantViolation,
    /// Illegal fiscal period transition.
    StateTransition,
    /// Unknown account, parent or period.
    NotFound,
    /// Duplicate key or optimistic version mismatch.
    Conflict,
    /// Collaborator failure.
    Infrastructure,
}

impl ErrorKind {
    /// Wraps a message into the matching [`AppError`] variant.
    #[must_use]
    pub fn into_app_error(self, message: String) -> AppError {
        match self {
            Self::Validation => AppError::Validation(message),
            Self::InvariantViolation => AppError::InvariantViolation(message),
            Self::StateTransition => AppError::StateTransition(message),
            Self::NotFound => AppError::NotFound(message),
            Self::Conflict => AppError::Conflict(message),
            Self::Infrastructure => AppError::Repository(message),
        }
    }
}

macro_rules! impl_into_app_error {
    ($($error:ty),+ $(,)?) => {
        $(
            impl From<$error> for AppError {
                fn from(err: $error) -> Self {
                    err.kind().into_app_error(err.to_string())
                }
            }
        )+
    };
}

impl_into_app_error!(AccountError, LedgerError, FiscalError, RepositoryError, ChartError);
