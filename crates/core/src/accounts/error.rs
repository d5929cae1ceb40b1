//! Account and hierarchy error types.

use chartwell_shared::types::{AccountId, Currency, Money, MoneyError};
use thiserror::Error;

use super::types::{AccountCategory, AccountType};
use crate::error::ErrorKind;

/// Errors raised while creating or mutating accounts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    // ========== Validation Errors ==========
    /// Code length outside the configured bounds.
    #[error("Account code '{code}' must be between {min} and {max} characters")]
    InvalidCodeLength {
        /// The offending code.
        code: String,
        /// Minimum length.
        min: usize,
        /// Maximum length.
        max: usize,
    },

    /// Code does not match the category pattern.
    #[error("Account code '{code}' does not match the {category} code pattern")]
    CodePatternMismatch {
        /// The offending code.
        code: String,
        /// Category whose pattern was applied.
        category: AccountCategory,
    },

    /// Account name is blank.
    #[error("Account name cannot be empty")]
    EmptyName,

    /// Parent belongs to a different category.
    #[error("Account category {child} cannot be nested under {parent}")]
    CategoryMismatch {
        /// Child category.
        child: AccountCategory,
        /// Parent category.
        parent: AccountCategory,
    },

    /// Parent type does not accept this child type.
    #[error("Account type {child} cannot be a child of {parent}")]
    IncompatibleParentType {
        /// Child type.
        child: AccountType,
        /// Parent type.
        parent: AccountType,
    },

    /// Parent uses a different currency.
    #[error("Account currency {child} differs from parent currency {parent}")]
    CurrencyMismatch {
        /// Child currency.
        child: Currency,
        /// Parent currency.
        parent: Currency,
    },

    /// Hierarchy would exceed the maximum depth.
    #[error("Hierarchy depth {depth} exceeds maximum of {max}")]
    MaxDepthExceeded {
        /// Depth that would result.
        depth: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Account code already used in the chart.
    #[error("Account code '{0}' already exists")]
    DuplicateCode(String),

    /// Money arithmetic failed.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Hierarchy limits could not be compiled.
    #[error("Invalid hierarchy configuration: {0}")]
    InvalidConfiguration(String),

    // ========== Invariant Violations ==========
    /// Account would become its own parent.
    #[error("Account {0} cannot be its own parent")]
    SelfParent(AccountId),

    /// Proposed parent chain leads back to the account.
    #[error("Circular reference: account {account} cannot be moved under {parent}")]
    CircularReference {
        /// Account being moved.
        account: AccountId,
        /// Proposed parent.
        parent: AccountId,
    },

    /// Only leaves may become control accounts.
    #[error("Account {0} has children and cannot be a control account")]
    ControlAccountNotLeaf(AccountId),

    /// Control accounts cannot receive children.
    #[error("Control account {0} cannot have child accounts")]
    ControlAccountCannotHaveChildren(AccountId),

    /// Deactivation requires a zero balance.
    #[error("Account {account} has non-zero balance {balance}")]
    NonZeroBalance {
        /// The account.
        account: AccountId,
        /// Its balance.
        balance: Money,
    },

    /// Deactivation requires every direct child to be inactive.
    #[error("Account {account} has {count} active child account(s)")]
    ActiveChildren {
        /// The account.
        account: AccountId,
        /// Number of active children.
        count: usize,
    },

    /// Inactive accounts must keep a zero balance.
    #[error("Inactive account {0} must keep a zero balance")]
    InactiveBalance(AccountId),

    /// System accounts change activation only with an explicit actor.
    #[error("System account {0} requires an explicit actor")]
    SystemAccountRequiresActor(AccountId),

    /// Archived accounts are frozen.
    #[error("Account {0} is archived")]
    Archived(AccountId),

    /// Archival requires an inactive account.
    #[error("Account {0} must be inactive before archiving")]
    StillActive(AccountId),

    // ========== Lookup Errors ==========
    /// Unknown account.
    #[error("Account not found: {0}")]
    NotFound(AccountId),

    /// Unknown parent account.
    #[error("Parent account not found: {0}")]
    ParentNotFound(AccountId),
}

impl AccountError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCodeLength { .. } => "INVALID_CODE_LENGTH",
            Self::CodePatternMismatch { .. } => "CODE_PATTERN_MISMATCH",
            Self::EmptyName => "EMPTY_NAME",
            Self::CategoryMismatch { .. } => "CATEGORY_MISMATCH",
            Self::IncompatibleParentType { .. } => "INCOMPATIBLE_PARENT_TYPE",
            Self::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            Self::MaxDepthExceeded { .. } => "MAX_DEPTH_EXCEEDED",
            Self::DuplicateCode(_) => "DUPLICATE_CODE",
            Self::Money(_) => "MONEY_ERROR",
            Self::InvalidConfiguration(_) => "INVALID_CONFIGURATION",
            Self::SelfParent(_) => "SELF_PARENT",
            Self::CircularReference { .. } => "CIRCULAR_REFERENCE",
            Self::ControlAccountNotLeaf(_) => "CONTROL_ACCOUNT_NOT_LEAF",
            Self::ControlAccountCannotHaveChildren(_) => "CONTROL_ACCOUNT_CANNOT_HAVE_CHILDREN",
            Self::NonZeroBalance { .. } => "NON_ZERO_BALANCE",
            Self::ActiveChildren { .. } => "ACTIVE_CHILDREN",
            Self::InactiveBalance(_) => "INACTIVE_BALANCE",
            Self::SystemAccountRequiresActor(_) => "SYSTEM_ACCOUNT_REQUIRES_ACTOR",
            Self::Archived(_) => "ACCOUNT_ARCHIVED",
            Self::StillActive(_) => "ACCOUNT_STILL_ACTIVE",
            Self::NotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::ParentNotFound(_) => "PARENT_NOT_FOUND",
        }
    }

    /// Returns the taxonomy bucket of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCodeLength { .. }
            | Self::CodePatternMismatch { .. }
            | Self::EmptyName
            | Self::CategoryMismatch { .. }
            | Self::IncompatibleParentType { .. }
            | Self::CurrencyMismatch { .. }
            | Self::MaxDepthExceeded { .. }
            | Self::DuplicateCode(_)
            | Self::Money(_)
            | Self::InvalidConfiguration(_) => ErrorKind::Validation,
            Self::SelfParent(_)
            | Self::CircularReference { .. }
            | Self::ControlAccountNotLeaf(_)
            | Self::ControlAccountCannotHaveChildren(_)
            | Self::NonZeroBalance { .. }
            | Self::ActiveChildren { .. }
            | Self::InactiveBalance(_)
            | Self::SystemAccountRequiresActor(_)
            | Self::Archived(_)
            | Self::StillActive(_) => ErrorKind::InvariantViolation,
            Self::NotFound(_) | Self::ParentNotFound(_) => ErrorKind::NotFound,
        }
    }

    /// Account errors never succeed on an unchanged retry.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        false
    }
}
