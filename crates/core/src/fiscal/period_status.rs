//! Status instance attached to a fiscal period.
//!
//! The instance pairs a [`FiscalPeriodStatusType`] with its close deadlines
//! and the audit trail of the last transition. Transitions never mutate in
//! place; they return the next instance.

use chartwell_shared::types::UserId;
use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::error::FiscalError;
use super::status::{FiscalPeriodStatusType, StatusPermissions};
use crate::ledger::OperationType;

/// Kinds of close deadlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadlineKind {
    /// Soft close.
    SoftClose,
    /// Hard close.
    HardClose,
    /// Final reporting.
    FinalReporting,
    /// Regulatory compliance filing.
    Compliance,
}

/// Close deadlines of a period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodDeadlines {
    /// Soft close deadline.
    pub soft_close: Option<NaiveDate>,
    /// Hard close deadline.
    pub hard_close: Option<NaiveDate>,
    /// Final reporting deadline.
    pub final_reporting: Option<NaiveDate>,
    /// Compliance deadline.
    pub compliance: Option<NaiveDate>,
}

impl PeriodDeadlines {
    /// Deadlines that are set, earliest first.
    #[must_use]
    pub fn iter(&self) -> Vec<(DeadlineKind, NaiveDate)> {
        let mut deadlines: Vec<(DeadlineKind, NaiveDate)> = [
            (DeadlineKind::SoftClose, self.soft_close),
            (DeadlineKind::HardClose, self.hard_close),
            (DeadlineKind::FinalReporting, self.final_reporting),
            (DeadlineKind::Compliance, self.compliance),
        ]
        .into_iter()
        .filter_map(|(kind, date)| date.map(|d| (kind, d)))
        .collect();
        deadlines.sort_by_key(|(_, date)| *date);
        deadlines
    }
}

/// Escalation level derived from deadlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeadlinePriority {
    /// Nothing due soon.
    Normal,
    /// A deadline is approaching.
    Elevated,
    /// A deadline was missed.
    Critical,
}

/// A requested status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRequest {
    /// Target status.
    pub target: FiscalPeriodStatusType,
    /// User making the change.
    pub changed_by: Option<UserId>,
    /// Approver, required for approval-gated targets.
    pub approved_by: Option<UserId>,
    /// Free-text reason.
    pub reason: Option<String>,
}

impl TransitionRequest {
    /// Request without actor or approver.
    #[must_use]
    pub fn to(target: FiscalPeriodStatusType) -> Self {
        Self {
            target,
            changed_by: None,
            approved_by: None,
            reason: None,
        }
    }

    /// Sets the acting user.
    #[must_use]
    pub fn by(mut self, user: UserId) -> Self {
        self.changed_by = Some(user);
        self
    }

    /// Sets the approver.
    #[must_use]
    pub fn approved_by(mut self, user: UserId) -> Self {
        self.approved_by = Some(user);
        self
    }

    /// Sets the reason.
    #[must_use]
    pub fn because(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Status of one fiscal period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalPeriodStatus {
    status: FiscalPeriodStatusType,
    previous: Option<FiscalPeriodStatusType>,
    deadlines: PeriodDeadlines,
    changed_at: Option<DateTime<Utc>>,
    changed_by: Option<UserId>,
    approved_by: Option<UserId>,
    reason: Option<String>,
}

impl FiscalPeriodStatus {
    /// Fresh status without deadlines or history.
    #[must_use]
    pub fn new(status: FiscalPeriodStatusType) -> Self {
        Self {
            status,
            previous: None,
            deadlines: PeriodDeadlines::default(),
            changed_at: None,
            changed_by: None,
            approved_by: None,
            reason: None,
        }
    }

    /// Attaches deadlines.
    #[must_use]
    pub fn with_deadlines(mut self, deadlines: PeriodDeadlines) -> Self {
        self.deadlines = deadlines;
        self
    }

    /// Current status type.
    #[must_use]
    pub fn status(&self) -> FiscalPeriodStatusType {
        self.status
    }

    /// Status before the last transition.
    #[must_use]
    pub fn previous(&self) -> Option<FiscalPeriodStatusType> {
        self.previous
    }

    /// Deadlines.
    #[must_use]
    pub fn deadlines(&self) -> &PeriodDeadlines {
        &self.deadlines
    }

    /// When the last transition happened.
    #[must_use]
    pub fn changed_at(&self) -> Option<DateTime<Utc>> {
        self.changed_at
    }

    /// Who made the last transition.
    #[must_use]
    pub fn changed_by(&self) -> Option<UserId> {
        self.changed_by
    }

    /// Who approved the last transition.
    #[must_use]
    pub fn approved_by(&self) -> Option<UserId> {
        self.approved_by
    }

    /// Reason given for the last transition.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Permissions of the current status.
    #[must_use]
    pub fn permissions(&self) -> StatusPermissions {
        self.status.permissions()
    }

    /// Ordinary postings accepted.
    #[must_use]
    pub fn allows_new_transactions(&self) -> bool {
        self.status.allows_new_transactions()
    }

    /// Adjustment postings accepted.
    #[must_use]
    pub fn allows_adjustments(&self) -> bool {
        self.status.allows_adjustments()
    }

    /// No further transition is legal.
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.status.is_final()
    }

    /// Whether an entry of `operation` may be posted.
    #[must_use]
    pub fn is_transaction_allowed(&self, operation: OperationType) -> bool {
        self.status.is_transaction_allowed(operation)
    }

    /// Returns the status after applying `request`; `self` is unchanged.
    ///
    /// # Errors
    ///
    /// Fails from a final state, for targets outside the adjacency list, and
    /// for approval-gated targets without an approver.
    pub fn transition_to(
        &self,
        request: &TransitionRequest,
        now: DateTime<Utc>,
    ) -> Result<Self, FiscalError> {
        if self.status.is_final() {
            return Err(FiscalError::FinalState(self.status));
        }
        if !self.status.can_transition_to(request.target) {
            return Err(FiscalError::InvalidTransition {
                from: self.status,
                to: request.target,
            });
        }
        if request.target.requires_approval() && request.approved_by.is_none() {
            return Err(FiscalError::ApprovalRequired(request.target));
        }
        Ok(Self {
            status: request.target,
            previous: Some(self.status),
            deadlines: self.deadlines,
            changed_at: Some(now),
            changed_by: request.changed_by,
            approved_by: request.approved_by,
            reason: request.reason.clone(),
        })
    }

    /// Deadlines that count for the current status. Statuses that do not
    /// track deadlines report none.
    fn tracked_deadlines(&self) -> Vec<(DeadlineKind, NaiveDate)> {
        if self.status.has_deadlines() {
            self.deadlines.iter()
        } else {
            Vec::new()
        }
    }

    /// True if a deadline falls within `[today, today + warning_days]`.
    #[must_use]
    pub fn has_approaching_deadlines(&self, today: NaiveDate, warning_days: u64) -> bool {
        let horizon = today
            .checked_add_days(Days::new(warning_days))
            .unwrap_or(NaiveDate::MAX);
        self.tracked_deadlines()
            .iter()
            .any(|(_, date)| *date >= today && *date <= horizon)
    }

    /// True if a deadline lies before `today`.
    #[must_use]
    pub fn has_missed_deadlines(&self, today: NaiveDate) -> bool {
        self.tracked_deadlines().iter().any(|(_, date)| *date < today)
    }

    /// Deadlines before `today`.
    #[must_use]
    pub fn missed_deadlines(&self, today: NaiveDate) -> Vec<DeadlineKind> {
        self.tracked_deadlines()
            .into_iter()
            .filter(|(_, date)| *date < today)
            .map(|(kind, _)| kind)
            .collect()
    }

    /// Earliest deadline on or after `today`.
    #[must_use]
    pub fn next_deadline(&self, today: NaiveDate) -> Option<(DeadlineKind, NaiveDate)> {
        self.tracked_deadlines()
            .into_iter()
            .find(|(_, date)| *date >= today)
    }

    /// Escalation level for `today`.
    #[must_use]
    pub fn deadline_priority(&self, today: NaiveDate, warning_days: u64) -> DeadlinePriority {
        if self.has_missed_deadlines(today) {
            DeadlinePriority::Critical
        } else if self.has_approaching_deadlines(today, warning_days) {
            DeadlinePriority::Elevated
        } else {
            DeadlinePriority::Normal
        }
    }
}

/// A transition planned for a future date.
///
/// Deadlines never move a period on their own; a scheduled transition is
/// applied only when a caller asks for it on or after `effective_on`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledTransition {
    /// Requested change.
    pub request: TransitionRequest,
    /// First date on which it may be applied.
    pub effective_on: NaiveDate,
}

impl ScheduledTransition {
    /// True once `today` reaches the effective date.
    #[must_use]
    pub fn is_due(&self, today: NaiveDate) -> bool {
        today >= self.effective_on
    }

    /// Applies the transition to `status`.
    ///
    /// # Errors
    ///
    /// Fails before the effective date and for any transition error.
    pub fn apply(
        &self,
        status: &FiscalPeriodStatus,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<FiscalPeriodStatus, FiscalError> {
        if !self.is_due(today) {
            return Err(FiscalError::TransitionNotDue(self.effective_on));
        }
        status.transition_to(&self.request, now)
    }
}
