//! Application-wide error types.
//!
//! Every domain error in the core converts into [`AppError`], which carries
//! the outward-facing taxonomy and status codes used by any transport layer.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Structural or format violation (code pattern, currency mismatch, depth).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Domain invariant would be broken (cycle, unbalanced entry).
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Illegal fiscal period status transition.
    #[error("State transition error: {0}")]
    StateTransition(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conflict (duplicate code or optimistic version mismatch).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Persistence collaborator failure.
    #[error("Repository error: {0}")]
    Repository(String),

    /// Configuration could not be loaded or compiled.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::InvariantViolation(_) | Self::StateTransition(_) => 422,
            Self::Repository(_) | Self::Configuration(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvariantViolation(_) => "INVARIANT_VIOLATION",
            Self::StateTransition(_) => "STATE_TRANSITION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Repository(_) => "REPOSITORY_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true if the caller may retry the operation unchanged.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl From<crate::types::MoneyError> for AppError {
    fn from(err: crate::types::MoneyError) -> Self {
        Self::Validation(err.to_string())
    }
}
