//! Chart of accounts orchestration.
//!
//! - `standard` - The standard chart catalogue
//! - `validation` - Report-style hierarchy and plan checks
//! - `service` - Chart operations over the repository
//! - `types` - Inputs and reports

pub mod error;
pub mod service;
pub mod standard;
pub mod types;
pub mod validation;

pub use error::ChartError;
pub use service::ChartOfAccountsService;
pub use standard::{STANDARD_CHART, StandardAccount, standard_accounts};
pub use types::{
    AccountMove, ArchiveCandidate, ArchiveResult, BatchItemError, HierarchyIssue,
    HierarchyValidationReport, MergeResult, MovedAccount, ReorganizationPlan,
    ReorganizationResult, StandardChartResult, TrialBalance, TrialBalanceEntry,
    TrialBalanceTotals,
};
pub use validation::{validate_account, validate_plan};
