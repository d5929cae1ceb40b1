//! Fiscal period service.
//!
//! Loads a period, applies a status transition and saves it with the
//! period's version. Deadlines only inform; the service moves a period
//! only when asked to.

use std::sync::Arc;

use chartwell_shared::types::FiscalPeriodId;
use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use super::error::FiscalError;
use super::period::FiscalPeriod;
use super::period_status::{DeadlinePriority, ScheduledTransition, TransitionRequest};
use super::status::FiscalPeriodStatusType;
use crate::audit::{AuditRecord, AuditSink, DomainEvent};
use crate::repository::FiscalPeriodRepository;

/// Fiscal period service over a repository and an audit sink.
pub struct FiscalPeriodService<R, A> {
    repo: Arc<R>,
    audit: Arc<A>,
}

impl<R, A> FiscalPeriodService<R, A>
where
    R: FiscalPeriodRepository,
    A: AuditSink,
{
    /// Create a new fiscal period service.
    #[must_use]
    pub fn new(repo: Arc<R>, audit: Arc<A>) -> Self {
        Self { repo, audit }
    }

    /// Moves a period to `request.target` and persists it.
    ///
    /// # Errors
    ///
    /// Returns `FiscalError::PeriodNotFound`, any transition error (the
    /// stored period is untouched), or a repository error.
    pub async fn transition_period(
        &self,
        period_id: FiscalPeriodId,
        request: &TransitionRequest,
    ) -> Result<FiscalPeriod, FiscalError> {
        let mut period = self.load(period_id).await?;
        let previous = match period.transition(request, Utc::now()) {
            Ok(previous) => previous,
            Err(err) => {
                warn!(
                    period_id = %period_id,
                    from = %period.status.status(),
                    to = %request.target,
                    error = %err,
                    "fiscal period transition rejected"
                );
                return Err(err);
            }
        };
        self.persist(period, previous, request).await
    }

    /// Applies a scheduled transition once it is due.
    ///
    /// # Errors
    ///
    /// Returns `FiscalError::TransitionNotDue` before the effective date, and
    /// the same errors as [`Self::transition_period`] otherwise.
    pub async fn apply_scheduled_transition(
        &self,
        period_id: FiscalPeriodId,
        scheduled: &ScheduledTransition,
        today: NaiveDate,
    ) -> Result<FiscalPeriod, FiscalError> {
        let mut period = self.load(period_id).await?;
        let next = scheduled.apply(&period.status, today, Utc::now())?;
        let previous = period.status.status();
        period.status = next;
        self.persist(period, previous, &scheduled.request).await
    }

    /// Escalation level of a period's deadlines as of `today`.
    ///
    /// # Errors
    ///
    /// Returns `FiscalError::PeriodNotFound` or a repository error.
    pub async fn deadline_priority(
        &self,
        period_id: FiscalPeriodId,
        today: NaiveDate,
        warning_days: u64,
    ) -> Result<DeadlinePriority, FiscalError> {
        let period = self.load(period_id).await?;
        Ok(period.status.deadline_priority(today, warning_days))
    }

    async fn load(&self, period_id: FiscalPeriodId) -> Result<FiscalPeriod, FiscalError> {
        self.repo
            .find_period(period_id)
            .await?
            .ok_or(FiscalError::PeriodNotFound(period_id))
    }

    async fn persist(
        &self,
        period: FiscalPeriod,
        previous: FiscalPeriodStatusType,
        request: &TransitionRequest,
    ) -> Result<FiscalPeriod, FiscalError> {
        let saved = self.repo.save_period(period).await?;
        let after = saved.status.status();
        info!(period_id = %saved.id, from = %previous, to = %after, "fiscal period transitioned");

        let record = AuditRecord::new(
            DomainEvent::PeriodStatusChanged {
                period_id: saved.id,
                before: previous,
                after,
            },
            request.changed_by,
        );
        if let Err(err) = self.audit.record(record).await {
            warn!(error = %err, "failed to record audit event");
        }
        Ok(saved)
    }
}
