//! Integration tests for persisted fiscal period transitions.

mod common;

use chartwell_core::audit::DomainEvent;
use chartwell_core::fiscal::{
    DeadlinePriority, FiscalError, FiscalPeriod, FiscalPeriodStatus, FiscalPeriodStatusType as S,
    PeriodDeadlines, ScheduledTransition, TransitionRequest,
};
use chartwell_core::repository::FiscalPeriodRepository;
use chartwell_shared::types::{FiscalPeriodId, FiscalYearId, UserId};
use rstest::rstest;

use common::{Fixture, date};

async fn stored(fx: &Fixture, id: FiscalPeriodId) -> FiscalPeriod {
    fx.store.find_period(id).await.unwrap().unwrap()
}

#[tokio::test]
async fn test_transition_persists_and_emits() {
    let fx = Fixture::new();
    let period = fx.january().await;
    let user = UserId::new();

    let saved = fx
        .fiscal
        .transition_period(
            period.id,
            &TransitionRequest::to(S::SoftClose).by(user).because("month end"),
        )
        .await
        .unwrap();

    assert_eq!(saved.status.status(), S::SoftClose);
    assert_eq!(saved.status.previous(), Some(S::Open));
    assert_eq!(saved.status.changed_by(), Some(user));
    assert_eq!(saved.status.reason(), Some("month end"));
    assert_eq!(saved.version, period.version + 1);
    assert_eq!(stored(&fx, period.id).await, saved);

    let records = fx.audit.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].actor, Some(user));
    assert_eq!(
        records[0].event,
        DomainEvent::PeriodStatusChanged {
            period_id: period.id,
            before: S::Open,
            after: S::SoftClose,
        }
    );
}

#[rstest]
#[case(S::Closed, "INVALID_TRANSITION")]
#[case(S::Planning, "INVALID_TRANSITION")]
#[tokio::test]
async fn test_illegal_transition_leaves_period_untouched(
    #[case] target: S,
    #[case] code: &str,
) {
    let fx = Fixture::new();
    let period = fx.january().await;

    let err = fx
        .fiscal
        .transition_period(period.id, &TransitionRequest::to(target))
        .await
        .unwrap_err();

    assert_eq!(err.error_code(), code);
    assert_eq!(stored(&fx, period.id).await, period);
    assert!(fx.audit.records().await.is_empty());
}

#[tokio::test]
async fn test_hard_close_needs_an_approver() {
    let fx = Fixture::new();
    let period = fx.january().await;
    fx.fiscal
        .transition_period(period.id, &TransitionRequest::to(S::SoftClose))
        .await
        .unwrap();

    let err = fx
        .fiscal
        .transition_period(period.id, &TransitionRequest::to(S::HardClose))
        .await
        .unwrap_err();
    assert_eq!(err, FiscalError::ApprovalRequired(S::HardClose));

    let closed = fx
        .fiscal
        .transition_period(
            period.id,
            &TransitionRequest::to(S::HardClose).approved_by(UserId::new()),
        )
        .await
        .unwrap();
    assert_eq!(closed.status.status(), S::HardClose);
    assert!(closed.status.allows_adjustments());
    assert!(!closed.status.allows_new_transactions());
}

#[tokio::test]
async fn test_stale_period_save_conflicts() {
    let fx = Fixture::new();
    let period = fx.january().await;
    fx.fiscal
        .transition_period(period.id, &TransitionRequest::to(S::Current))
        .await
        .unwrap();

    let err = fx.store.save_period(period).await.unwrap_err();
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_unknown_period() {
    let fx = Fixture::new();
    let missing = FiscalPeriodId::new();
    let err = fx
        .fiscal
        .transition_period(missing, &TransitionRequest::to(S::Current))
        .await
        .unwrap_err();
    assert_eq!(err, FiscalError::PeriodNotFound(missing));
}

#[tokio::test]
async fn test_scheduled_transition_waits_for_its_date() {
    let fx = Fixture::new();
    let period = fx.january().await;
    let scheduled = ScheduledTransition {
        request: TransitionRequest::to(S::SoftClose),
        effective_on: date(2026, 2, 1),
    };

    let err = fx
        .fiscal
        .apply_scheduled_transition(period.id, &scheduled, date(2026, 1, 31))
        .await
        .unwrap_err();
    assert_eq!(err, FiscalError::TransitionNotDue(date(2026, 2, 1)));
    assert_eq!(stored(&fx, period.id).await.status.status(), S::Open);

    let applied = fx
        .fiscal
        .apply_scheduled_transition(period.id, &scheduled, date(2026, 2, 1))
        .await
        .unwrap();
    assert_eq!(applied.status.status(), S::SoftClose);
}

#[tokio::test]
async fn test_deadline_priority_escalates() {
    let fx = Fixture::new();
    let deadlines = PeriodDeadlines {
        soft_close: Some(date(2026, 2, 5)),
        hard_close: Some(date(2026, 2, 15)),
        ..PeriodDeadlines::default()
    };
    let period = FiscalPeriod::new(
        FiscalYearId::new(),
        1,
        "January 2026",
        date(2026, 1, 1),
        date(2026, 1, 31),
        FiscalPeriodStatus::new(S::Open).with_deadlines(deadlines),
    )
    .unwrap();
    let period = fx.store.save_period(period).await.unwrap();

    let priority = |today| fx.fiscal.deadline_priority(period.id, today, 3);
    assert_eq!(priority(date(2026, 1, 20)).await.unwrap(), DeadlinePriority::Normal);
    assert_eq!(priority(date(2026, 2, 3)).await.unwrap(), DeadlinePriority::Elevated);
    assert_eq!(priority(date(2026, 2, 6)).await.unwrap(), DeadlinePriority::Critical);
}
