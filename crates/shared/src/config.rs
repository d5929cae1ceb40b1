//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Chart of accounts structural limits.
    #[serde(default)]
    pub hierarchy: HierarchySettings,
    /// Housekeeping thresholds for archival and deadline escalation.
    #[serde(default)]
    pub housekeeping: HousekeepingSettings,
}

/// Structural limits for the account hierarchy.
///
/// Code patterns are raw regular expressions; the core compiles them once.
#[derive(Debug, Clone, Deserialize)]
pub struct HierarchySettings {
    /// Maximum depth from any root (root = level 0).
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Minimum account code length.
    #[serde(default = "default_min_code_length")]
    pub min_code_length: usize,
    /// Maximum account code length.
    #[serde(default = "default_max_code_length")]
    pub max_code_length: usize,
    /// Code pattern for asset accounts.
    #[serde(default = "default_asset_pattern")]
    pub asset_code_pattern: String,
    /// Code pattern for liability accounts.
    #[serde(default = "default_liability_pattern")]
    pub liability_code_pattern: String,
    /// Code pattern for equity accounts.
    #[serde(default = "default_equity_pattern")]
    pub equity_code_pattern: String,
    /// Code pattern for revenue accounts.
    #[serde(default = "default_revenue_pattern")]
    pub revenue_code_pattern: String,
    /// Code pattern for expense accounts.
    #[serde(default = "default_expense_pattern")]
    pub expense_code_pattern: String,
}

fn default_max_depth() -> usize {
    10
}

fn default_min_code_length() -> usize {
    3
}

fn default_max_code_length() -> usize {
    20
}

fn default_asset_pattern() -> String {
    r"^1\d{2,19}$".to_string()
}

fn default_liability_pattern() -> String {
    r"^2\d{2,19}$".to_string()
}

fn default_equity_pattern() -> String {
    r"^3\d{2,19}$".to_string()
}

fn default_revenue_pattern() -> String {
    r"^4\d{2,19}$".to_string()
}

fn default_expense_pattern() -> String {
    r"^5\d{2,19}$".to_string()
}

impl Default for HierarchySettings {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            min_code_length: default_min_code_length(),
            max_code_length: default_max_code_length(),
            asset_code_pattern: default_asset_pattern(),
            liability_code_pattern: default_liability_pattern(),
            equity_code_pattern: default_equity_pattern(),
            revenue_code_pattern: default_revenue_pattern(),
            expense_code_pattern: default_expense_pattern(),
        }
    }
}

/// Thresholds for batch housekeeping.
#[derive(Debug, Clone, Deserialize)]
pub struct HousekeepingSettings {
    /// Minimum days without activity before an account may be archived.
    #[serde(default = "default_archive_min_inactive_days")]
    pub archive_min_inactive_days: i64,
    /// Days before a period deadline at which it counts as approaching.
    #[serde(default = "default_deadline_warning_days")]
    pub deadline_warning_days: i64,
}

fn default_archive_min_inactive_days() -> i64 {
    365
}

fn default_deadline_warning_days() -> i64 {
    7
}

impl Default for HousekeepingSettings {
    fn default() -> Self {
        Self {
            archive_min_inactive_days: default_archive_min_inactive_days(),
            deadline_warning_days: default_deadline_warning_days(),
        }
    }
}

impl Settings {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("CHARTWELL").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
