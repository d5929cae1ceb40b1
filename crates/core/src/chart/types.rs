//! Inputs and reports of chart-level operations.

use chartwell_shared::types::{AccountId, Currency, Money};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::accounts::AccountType;

/// A blocking finding of a hierarchy validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyIssue {
    /// Machine-readable code, e.g. `CIRCULAR_REFERENCE`.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

/// Result of checking an account against the chart.
///
/// Always produced, even when the input is badly wrong; the caller decides
/// what to do with it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyValidationReport {
    /// True when `issues` is empty.
    pub is_valid: bool,
    /// Blocking problems.
    pub issues: Vec<HierarchyIssue>,
    /// Non-blocking observations.
    pub warnings: Vec<String>,
    /// Suggested improvements.
    pub recommendations: Vec<String>,
}

impl HierarchyValidationReport {
    pub(crate) fn issue(&mut self, code: &str, message: impl Into<String>) {
        self.issues.push(HierarchyIssue {
            code: code.to_string(),
            message: message.into(),
        });
    }

    pub(crate) fn finish(mut self) -> Self {
        self.is_valid = self.issues.is_empty();
        self
    }
}

/// One step of a reorganization plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMove {
    /// Account to move.
    pub account_id: AccountId,
    /// Parent after the move, `None` for a root.
    pub new_parent_id: Option<AccountId>,
    /// Optional renumbering applied before the move.
    pub new_code: Option<String>,
}

/// Ordered list of moves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorganizationPlan {
    /// Moves, executed in this order.
    pub moves: Vec<AccountMove>,
}

/// A move that was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovedAccount {
    /// The account.
    pub account_id: AccountId,
    /// Parent before.
    pub previous_parent_id: Option<AccountId>,
    /// Parent after.
    pub new_parent_id: Option<AccountId>,
    /// Code before.
    pub previous_code: String,
    /// Code after.
    pub new_code: String,
}

/// A per-item failure in a batch operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItemError {
    /// The account the item referred to.
    pub account_id: AccountId,
    /// Machine-readable code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl BatchItemError {
    pub(crate) fn new(account_id: AccountId, code: &str, message: impl Into<String>) -> Self {
        Self {
            account_id,
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// Outcome of a reorganization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorganizationResult {
    /// True when every move was applied.
    pub success: bool,
    /// Applied moves, in execution order.
    pub moved_accounts: Vec<MovedAccount>,
    /// Moves that were rejected or failed.
    pub errors: Vec<BatchItemError>,
}

/// Outcome of a merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeResult {
    /// False if a collaborator failed after the preconditions passed.
    pub success: bool,
    /// Source account, deactivated on success.
    pub source_id: AccountId,
    /// Target account.
    pub target_id: AccountId,
    /// Source balance before the merge.
    pub source_balance_before: Money,
    /// Target balance before the merge.
    pub target_balance_before: Money,
    /// Target balance after the merge, when it completed.
    pub target_balance_after: Option<Money>,
    /// Lines moved from source to target.
    pub reassigned_count: u64,
    /// Why the merge did not complete.
    pub failure_reason: Option<String>,
}

/// An account eligible for archival.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveCandidate {
    /// The account.
    pub account_id: AccountId,
    /// Its code.
    pub code: String,
    /// Its name.
    pub name: String,
    /// Days since the last activity.
    pub days_inactive: i64,
}

/// Outcome of an archival run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveResult {
    /// Whether the run only reported candidates.
    pub dry_run: bool,
    /// Accounts meeting every criterion.
    pub candidates: Vec<ArchiveCandidate>,
    /// Accounts actually archived. Always empty on a dry run.
    pub archived: Vec<AccountId>,
    /// Per-account failures.
    pub errors: Vec<BatchItemError>,
}

/// One trial balance row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceEntry {
    /// The account.
    pub account_id: AccountId,
    /// Its code.
    pub code: String,
    /// Its name.
    pub name: String,
    /// Its type.
    pub account_type: AccountType,
    /// Its currency.
    pub currency: Currency,
    /// Debit column.
    pub debit: Decimal,
    /// Credit column.
    pub credit: Decimal,
}

/// Column totals for one currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceTotals {
    /// Currency of the totals.
    pub currency: Currency,
    /// Sum of the debit column.
    pub total_debits: Decimal,
    /// Sum of the credit column.
    pub total_credits: Decimal,
    /// True when the two columns match.
    pub is_balanced: bool,
}

/// Trial balance as of a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalance {
    /// Cut-off date (inclusive).
    pub as_of: NaiveDate,
    /// Currency filter, if one was applied.
    pub currency: Option<Currency>,
    /// Rows ordered by account code.
    pub entries: Vec<TrialBalanceEntry>,
    /// Totals per currency, ordered by currency code.
    pub totals: Vec<TrialBalanceTotals>,
    /// True when every currency balances.
    pub is_balanced: bool,
}

impl TrialBalance {
    /// Totals for one currency, if any row uses it.
    #[must_use]
    pub fn totals_for(&self, currency: Currency) -> Option<&TrialBalanceTotals> {
        self.totals.iter().find(|t| t.currency == currency)
    }
}

/// Outcome of bootstrapping the standard chart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardChartResult {
    /// Accounts created, roots first.
    pub created: Vec<AccountId>,
    /// Catalogue codes that already existed.
    pub skipped: Vec<String>,
}
