//! Immutable structural limits for the account hierarchy.

use chartwell_shared::HierarchySettings;
use regex::Regex;

use super::error::AccountError;
use super::types::{AccountCategory, AccountType};

/// Compiled hierarchy limits and code patterns.
///
/// Passed explicitly to the hierarchy and the chart service so tests can
/// vary limits without touching process-wide state.
#[derive(Debug, Clone)]
pub struct HierarchyConfig {
    max_depth: usize,
    min_code_length: usize,
    max_code_length: usize,
    asset_pattern: Regex,
    liability_pattern: Regex,
    equity_pattern: Regex,
    revenue_pattern: Regex,
    expense_pattern: Regex,
}

impl HierarchyConfig {
    /// Compiles settings into a config.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidConfiguration` if a pattern does not
    /// compile or the length bounds are inverted.
    pub fn from_settings(settings: &HierarchySettings) -> Result<Self, AccountError> {
        if settings.min_code_length == 0 || settings.min_code_length > settings.max_code_length {
            return Err(AccountError::InvalidConfiguration(format!(
                "code length bounds {}..={} are invalid",
                settings.min_code_length, settings.max_code_length
            )));
        }

        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| AccountError::InvalidConfiguration(e.to_string()))
        };

        Ok(Self {
            max_depth: settings.max_depth,
            min_code_length: settings.min_code_length,
            max_code_length: settings.max_code_length,
            asset_pattern: compile(&settings.asset_code_pattern)?,
            liability_pattern: compile(&settings.liability_code_pattern)?,
            equity_pattern: compile(&settings.equity_code_pattern)?,
            revenue_pattern: compile(&settings.revenue_code_pattern)?,
            expense_pattern: compile(&settings.expense_code_pattern)?,
        })
    }

    /// Returns a copy with a different maximum depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Maximum hierarchy depth from any root (root = level 0).
    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Code pattern for a category.
    #[must_use]
    pub fn pattern(&self, category: AccountCategory) -> &Regex {
        match category {
            AccountCategory::Asset => &self.asset_pattern,
            AccountCategory::Liability => &self.liability_pattern,
            AccountCategory::Equity => &self.equity_pattern,
            AccountCategory::Revenue => &self.revenue_pattern,
            AccountCategory::Expense => &self.expense_pattern,
        }
    }

    /// Validates an account code against the length bounds and the
    /// pattern of the type's category.
    pub fn validate_code(&self, code: &str, account_type: AccountType) -> Result<(), AccountError> {
        let len = code.chars().count();
        if len < self.min_code_length || len > self.max_code_length {
            return Err(AccountError::InvalidCodeLength {
                code: code.to_string(),
                min: self.min_code_length,
                max: self.max_code_length,
            });
        }
        let category = account_type.category();
        if !self.pattern(category).is_match(code) {
            return Err(AccountError::CodePatternMismatch {
                code: code.to_string(),
                category,
            });
        }
        Ok(())
    }

    /// Returns true if `code` is valid for `account_type`.
    #[must_use]
    pub fn is_valid_account_code(&self, code: &str, account_type: AccountType) -> bool {
        self.validate_code(code, account_type).is_ok()
    }
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self::from_settings(&HierarchySettings::default())
            .expect("default hierarchy settings always compile")
    }
}
