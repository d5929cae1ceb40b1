//! Fiscal period status types.
//!
//! Two tables drive the state machine: [`FiscalPeriodStatusType::permissions`]
//! maps a state to its posting permissions and
//! [`FiscalPeriodStatusType::allowed_transitions`] is the fixed adjacency
//! list. Nothing else decides what a state may do.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ledger::{OperationClass, OperationType};

/// Families of period states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusGroup {
    /// Being set up.
    Planning,
    /// Scheduled but not yet open.
    Future,
    /// Accepting ordinary postings.
    Active,
    /// On the way to closed.
    Closing,
    /// Closed or frozen.
    Closed,
    /// Reopened for a specific adjustment kind.
    Adjustment,
    /// Suspended or consolidating.
    Special,
    /// Something went wrong.
    Error,
    /// Under maintenance or migration.
    Maintenance,
}

/// Lifecycle state of a fiscal period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FiscalPeriodStatusType {
    // Planning
    /// Initial planning.
    Planning,
    /// Draft setup.
    Draft,
    /// Waiting for approval to open.
    PendingApproval,
    // Future
    /// Scheduled future period.
    FuturePeriod,
    /// About to open.
    PreOpen,
    // Active
    /// Open for postings.
    Open,
    /// The current period.
    Current,
    /// Actively used.
    Active,
    /// Open beyond its planned end.
    Extended,
    /// Reopened after hard close.
    Reopened,
    // Closing
    /// Adjustments only.
    SoftClose,
    /// Close procedures running.
    ClosingInProgress,
    /// Closed for ordinary postings; final adjustments only.
    HardClose,
    /// Waiting for final close.
    PendingClose,
    // Closed
    /// Closed.
    Closed,
    /// Closed forever.
    PermanentlyClosed,
    /// Archived.
    Archived,
    /// Locked against any change.
    Locked,
    // Adjustment
    /// General adjustment window.
    AdjustmentPeriod,
    /// Auditor adjustments.
    AuditAdjustments,
    /// Prior period corrections.
    PriorPeriodAdjustments,
    /// Year-end closing entries.
    YearEndAdjustments,
    // Special
    /// Group consolidation.
    Consolidation,
    /// Temporarily suspended.
    Suspended,
    // Error
    /// Processing error.
    ErrorState,
    /// Reconciliation needed before closing continues.
    ReconciliationRequired,
    /// Data corruption detected.
    DataCorruption,
    // Maintenance
    /// System maintenance.
    Maintenance,
    /// Data migration.
    Migration,
}

/// Posting permissions derived from a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct StatusPermissions {
    /// Ordinary postings accepted.
    pub allows_new_transactions: bool,
    /// Adjustment postings accepted.
    pub allows_adjustments: bool,
    /// Only adjustment-class postings accepted.
    pub restrict_to_adjustments_only: bool,
    /// No transition ever leaves this state.
    pub is_final: bool,
    /// Entering this state needs an approver.
    pub requires_approval: bool,
    /// Close deadlines are tracked in this state.
    pub has_deadlines: bool,
    /// Extra operation class accepted besides general adjustments.
    pub adjustment_kind: Option<OperationClass>,
}

impl StatusPermissions {
    const NONE: Self = Self {
        allows_new_transactions: false,
        allows_adjustments: false,
        restrict_to_adjustments_only: false,
        is_final: false,
        requires_approval: false,
        has_deadlines: false,
        adjustment_kind: None,
    };

    const fn posting() -> Self {
        Self {
            allows_new_transactions: true,
            allows_adjustments: true,
            has_deadlines: true,
            ..Self::NONE
        }
    }

    const fn adjustments_only(kind: Option<OperationClass>) -> Self {
        Self {
            allows_adjustments: true,
            restrict_to_adjustments_only: true,
            adjustment_kind: kind,
            ..Self::NONE
        }
    }
}

impl FiscalPeriodStatusType {
    /// Every status.
    pub const ALL: [Self; 29] = [
        Self::Planning,
        Self::Draft,
        Self::PendingApproval,
        Self::FuturePeriod,
        Self::PreOpen,
        Self::Open,
        Self::Current,
        Self::Active,
        Self::Extended,
        Self::Reopened,
        Self::SoftClose,
        Self::ClosingInProgress,
        Self::HardClose,
        Self::PendingClose,
        Self::Closed,
        Self::PermanentlyClosed,
        Self::Archived,
        Self::Locked,
        Self::AdjustmentPeriod,
        Self::AuditAdjustments,
        Self::PriorPeriodAdjustments,
        Self::YearEndAdjustments,
        Self::Consolidation,
        Self::Suspended,
        Self::ErrorState,
        Self::ReconciliationRequired,
        Self::DataCorruption,
        Self::Maintenance,
        Self::Migration,
    ];

    /// Family of the status.
    #[must_use]
    pub const fn group(self) -> StatusGroup {
        match self {
            Self::Planning | Self::Draft | Self::PendingApproval => StatusGroup::Planning,
            Self::FuturePeriod | Self::PreOpen => StatusGroup::Future,
            Self::Open | Self::Current | Self::Active | Self::Extended | Self::Reopened => {
                StatusGroup::Active
            }
            Self::SoftClose | Self::ClosingInProgress | Self::HardClose | Self::PendingClose => {
                StatusGroup::Closing
            }
            Self::Closed | Self::PermanentlyClosed | Self::Archived | Self::Locked => {
                StatusGroup::Closed
            }
            Self::AdjustmentPeriod
            | Self::AuditAdjustments
            | Self::PriorPeriodAdjustments
            | Self::YearEndAdjustments => StatusGroup::Adjustment,
            Self::Consolidation | Self::Suspended => StatusGroup::Special,
            Self::ErrorState | Self::ReconciliationRequired | Self::DataCorruption => {
                StatusGroup::Error
            }
            Self::Maintenance | Self::Migration => StatusGroup::Maintenance,
        }
    }

    /// Permissions of the status.
    #[must_use]
    pub const fn permissions(self) -> StatusPermissions {
        match self {
            Self::Open | Self::Current | Self::Active | Self::Extended => {
                StatusPermissions::posting()
            }
            Self::Reopened => StatusPermissions {
                requires_approval: true,
                ..StatusPermissions::posting()
            },
            Self::SoftClose | Self::AdjustmentPeriod => StatusPermissions {
                has_deadlines: true,
                ..StatusPermissions::adjustments_only(None)
            },
            Self::HardClose => StatusPermissions {
                has_deadlines: true,
                requires_approval: true,
                ..StatusPermissions::adjustments_only(None)
            },
            Self::AuditAdjustments => StatusPermissions {
                requires_approval: true,
                ..StatusPermissions::adjustments_only(Some(OperationClass::Audit))
            },
            Self::PriorPeriodAdjustments => StatusPermissions {
                requires_approval: true,
                ..StatusPermissions::adjustments_only(Some(OperationClass::PriorPeriod))
            },
            Self::YearEndAdjustments => StatusPermissions {
                has_deadlines: true,
                ..StatusPermissions::adjustments_only(Some(OperationClass::YearEnd))
            },
            Self::ClosingInProgress | Self::PendingClose => StatusPermissions {
                has_deadlines: true,
                ..StatusPermissions::NONE
            },
            Self::Closed => StatusPermissions {
                requires_approval: true,
                ..StatusPermissions::NONE
            },
            Self::PermanentlyClosed | Self::Archived => StatusPermissions {
                is_final: true,
                requires_approval: true,
                ..StatusPermissions::NONE
            },
            Self::Planning
            | Self::Draft
            | Self::PendingApproval
            | Self::FuturePeriod
            | Self::PreOpen
            | Self::Locked
            | Self::Consolidation
            | Self::Suspended
            | Self::ErrorState
            | Self::ReconciliationRequired
            | Self::DataCorruption
            | Self::Maintenance
            | Self::Migration => StatusPermissions::NONE,
        }
    }

    /// Statuses reachable in one step.
    #[must_use]
    pub const fn allowed_transitions(self) -> &'static [Self] {
        match self {
            Self::Planning => &[Self::Draft, Self::FuturePeriod, Self::PendingApproval],
            Self::Draft => &[Self::Planning, Self::PendingApproval, Self::Open],
            Self::PendingApproval => &[Self::Draft, Self::Open, Self::FuturePeriod],
            Self::FuturePeriod => &[Self::PreOpen, Self::Open, Self::Planning],
            Self::PreOpen => &[Self::Open, Self::FuturePeriod],
            Self::Open => &[
                Self::Current,
                Self::Active,
                Self::SoftClose,
                Self::Suspended,
                Self::Locked,
            ],
            Self::Current => &[
                Self::Active,
                Self::Open,
                Self::SoftClose,
                Self::Suspended,
                Self::Extended,
            ],
            Self::Active => &[
                Self::Current,
                Self::Open,
                Self::SoftClose,
                Self::Suspended,
                Self::Extended,
            ],
            Self::Extended => &[Self::Active, Self::SoftClose, Self::Suspended],
            Self::Reopened => &[Self::Open, Self::SoftClose],
            Self::SoftClose => &[
                Self::Open,
                Self::HardClose,
                Self::ClosingInProgress,
                Self::AdjustmentPeriod,
            ],
            Self::ClosingInProgress => &[
                Self::HardClose,
                Self::SoftClose,
                Self::ErrorState,
                Self::ReconciliationRequired,
            ],
            Self::HardClose => &[
                Self::Closed,
                Self::PendingClose,
                Self::AdjustmentPeriod,
                Self::Reopened,
                Self::YearEndAdjustments,
                Self::Consolidation,
            ],
            Self::PendingClose => &[Self::Closed, Self::HardClose],
            Self::Closed => &[
                Self::PermanentlyClosed,
                Self::Archived,
                Self::AuditAdjustments,
                Self::PriorPeriodAdjustments,
            ],
            Self::PermanentlyClosed | Self::Archived => &[],
            Self::Locked => &[Self::Open, Self::Closed, Self::Suspended],
            Self::AdjustmentPeriod => &[Self::SoftClose, Self::HardClose, Self::Closed],
            Self::AuditAdjustments | Self::PriorPeriodAdjustments => &[Self::Closed],
            Self::YearEndAdjustments | Self::Consolidation => &[Self::HardClose, Self::Closed],
            Self::Suspended => &[Self::Open, Self::Active, Self::Locked, Self::ErrorState],
            Self::ErrorState => &[
                Self::Maintenance,
                Self::ReconciliationRequired,
                Self::Suspended,
                Self::DataCorruption,
            ],
            Self::ReconciliationRequired => {
                &[Self::ClosingInProgress, Self::SoftClose, Self::ErrorState]
            }
            Self::DataCorruption => &[Self::Maintenance, Self::ErrorState],
            Self::Maintenance => &[Self::Open, Self::Suspended, Self::Locked, Self::Migration],
            Self::Migration => &[Self::Maintenance, Self::Open, Self::Closed],
        }
    }

    /// True if `target` is in the adjacency list.
    #[must_use]
    pub fn can_transition_to(self, target: Self) -> bool {
        self.allowed_transitions().contains(&target)
    }

    /// Ordinary postings accepted.
    #[must_use]
    pub const fn allows_new_transactions(self) -> bool {
        self.permissions().allows_new_transactions
    }

    /// Adjustment postings accepted.
    #[must_use]
    pub const fn allows_adjustments(self) -> bool {
        self.permissions().allows_adjustments
    }

    /// Only adjustment-class postings accepted.
    #[must_use]
    pub const fn restrict_to_adjustments_only(self) -> bool {
        self.permissions().restrict_to_adjustments_only
    }

    /// No further transition is legal.
    #[must_use]
    pub const fn is_final(self) -> bool {
        self.permissions().is_final
    }

    /// Entering the status needs an approver.
    #[must_use]
    pub const fn requires_approval(self) -> bool {
        self.permissions().requires_approval
    }

    /// Deadlines are tracked.
    #[must_use]
    pub const fn has_deadlines(self) -> bool {
        self.permissions().has_deadlines
    }

    /// Whether an entry of `operation` may be posted in this status.
    ///
    /// Restricted states accept general adjustments plus their own
    /// adjustment kind; all other states are gated by
    /// `allows_new_transactions` alone.
    #[must_use]
    pub fn is_transaction_allowed(self, operation: OperationType) -> bool {
        let permissions = self.permissions();
        if permissions.restrict_to_adjustments_only {
            let class = operation.class();
            return class == OperationClass::Adjustment
                || permissions.adjustment_kind == Some(class);
        }
        permissions.allows_new_transactions
    }

    /// Snake-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Draft => "draft",
            Self::PendingApproval => "pending_approval",
            Self::FuturePeriod => "future_period",
            Self::PreOpen => "pre_open",
            Self::Open => "open",
            Self::Current => "current",
            Self::Active => "active",
            Self::Extended => "extended",
            Self::Reopened => "reopened",
            Self::SoftClose => "soft_close",
            Self::ClosingInProgress => "closing_in_progress",
            Self::HardClose => "hard_close",
            Self::PendingClose => "pending_close",
            Self::Closed => "closed",
            Self::PermanentlyClosed => "permanently_closed",
            Self::Archived => "archived",
            Self::Locked => "locked",
            Self::AdjustmentPeriod => "adjustment_period",
            Self::AuditAdjustments => "audit_adjustments",
            Self::PriorPeriodAdjustments => "prior_period_adjustments",
            Self::YearEndAdjustments => "year_end_adjustments",
            Self::Consolidation => "consolidation",
            Self::Suspended => "suspended",
            Self::ErrorState => "error_state",
            Self::ReconciliationRequired => "reconciliation_required",
            Self::DataCorruption => "data_corruption",
            Self::Maintenance => "maintenance",
            Self::Migration => "migration",
        }
    }
}

impl fmt::Display for FiscalPeriodStatusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
