//! Domain facts emitted to the audit collaborator.

use chartwell_shared::types::{AccountId, FiscalPeriodId, JournalEntryId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::accounts::AccountType;
use crate::fiscal::FiscalPeriodStatusType;

/// A named fact about the chart or the ledger, with before/after values
/// where the fact describes a change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    /// Account created.
    AccountCreated {
        /// New account.
        account_id: AccountId,
        /// Its code.
        code: String,
        /// Its type.
        account_type: AccountType,
        /// Its parent.
        parent_id: Option<AccountId>,
    },
    /// Account moved in the hierarchy.
    ParentChanged {
        /// Moved account.
        account_id: AccountId,
        /// Parent before.
        before: Option<AccountId>,
        /// Parent after.
        after: Option<AccountId>,
    },
    /// Account code changed.
    CodeChanged {
        /// Renumbered account.
        account_id: AccountId,
        /// Code before.
        before: String,
        /// Code after.
        after: String,
    },
    /// Activation flag flipped.
    ActivationChanged {
        /// The account.
        account_id: AccountId,
        /// Active before.
        before: bool,
        /// Active after.
        after: bool,
    },
    /// Account designated as control account.
    ControlAccountDesignated {
        /// The account.
        account_id: AccountId,
    },
    /// Journal entry posted.
    JournalPosted {
        /// The entry.
        entry_id: JournalEntryId,
        /// Number of lines.
        line_count: usize,
        /// Entry it reverses, if any.
        reverses: Option<JournalEntryId>,
    },
    /// Two accounts merged.
    AccountsMerged {
        /// Source, deactivated afterwards.
        source_id: AccountId,
        /// Target receiving the lines.
        target_id: AccountId,
        /// Lines moved.
        reassigned: u64,
        /// Effective date.
        effective_date: NaiveDate,
        /// Reason given.
        reason: String,
    },
    /// Account archived.
    AccountArchived {
        /// The account.
        account_id: AccountId,
        /// Archive timestamp.
        archived_at: DateTime<Utc>,
    },
    /// Reorganization plan executed.
    ChartReorganized {
        /// Moves applied.
        moved: usize,
        /// Moves that failed.
        failed: usize,
    },
    /// Fiscal period status changed.
    PeriodStatusChanged {
        /// The period.
        period_id: FiscalPeriodId,
        /// Status before.
        before: FiscalPeriodStatusType,
        /// Status after.
        after: FiscalPeriodStatusType,
    },
}

impl DomainEvent {
    /// Snake-case name of the fact.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AccountCreated { .. } => "account_created",
            Self::ParentChanged { .. } => "parent_changed",
            Self::CodeChanged { .. } => "code_changed",
            Self::ActivationChanged { .. } => "activation_changed",
            Self::ControlAccountDesignated { .. } => "control_account_designated",
            Self::JournalPosted { .. } => "journal_posted",
            Self::AccountsMerged { .. } => "accounts_merged",
            Self::AccountArchived { .. } => "account_archived",
            Self::ChartReorganized { .. } => "chart_reorganized",
            Self::PeriodStatusChanged { .. } => "period_status_changed",
        }
    }
}

/// A domain fact with its envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Record id (UUID v7, time-ordered).
    pub id: Uuid,
    /// When the fact happened.
    pub occurred_at: DateTime<Utc>,
    /// Acting user, if known.
    pub actor: Option<UserId>,
    /// The fact.
    pub event: DomainEvent,
}

impl AuditRecord {
    /// Wraps an event, stamped now.
    #[must_use]
    pub fn new(event: DomainEvent, actor: Option<UserId>) -> Self {
        Self {
            id: Uuid::now_v7(),
            occurred_at: Utc::now(),
            actor,
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_name_tag() {
        let event = DomainEvent::ActivationChanged {
            account_id: AccountId::new(),
            before: true,
            after: false,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], event.name());
        assert_eq!(json["before"], true);
        assert_eq!(json["after"], false);
    }

    #[test]
    fn test_record_wraps_event() {
        let actor = UserId::new();
        let record = AuditRecord::new(DomainEvent::ChartReorganized { moved: 2, failed: 1 }, Some(actor));
        assert_eq!(record.actor, Some(actor));
        assert_eq!(record.event.name(), "chart_reorganized");
    }
}
