//! Property-based tests for the fiscal period state machine.
//!
//! The state space is small, so most properties enumerate it exhaustively;
//! proptest drives random transition walks.

use std::collections::{HashSet, VecDeque};

use chartwell_shared::types::UserId;
use chrono::Utc;
use proptest::prelude::*;
use proptest::sample::Index;

use super::error::FiscalError;
use super::period_status::{FiscalPeriodStatus, TransitionRequest};
use super::status::FiscalPeriodStatusType;
use crate::ledger::OperationType;

#[test]
fn final_states_have_no_transitions() {
    for status in FiscalPeriodStatusType::ALL {
        assert_eq!(
            status.is_final(),
            status.allowed_transitions().is_empty(),
            "{status}"
        );
    }
}

#[test]
fn restricted_states_accept_adjustments_only() {
    for status in FiscalPeriodStatusType::ALL {
        if status.restrict_to_adjustments_only() {
            assert!(status.allows_adjustments(), "{status}");
            assert!(!status.allows_new_transactions(), "{status}");
            for op in OperationType::ALL {
                if status.is_transaction_allowed(op) {
                    assert!(op.is_adjustment(), "{status} accepted {op}");
                }
            }
        }
    }
}

#[test]
fn unrestricted_states_are_gated_by_new_transactions_flag() {
    for status in FiscalPeriodStatusType::ALL {
        if !status.restrict_to_adjustments_only() {
            for op in OperationType::ALL {
                assert_eq!(
                    status.is_transaction_allowed(op),
                    status.allows_new_transactions()
                );
            }
        }
    }
}

#[test]
fn no_state_transitions_to_itself() {
    for status in FiscalPeriodStatusType::ALL {
        assert!(!status.can_transition_to(status), "{status}");
    }
}

#[test]
fn every_state_is_reachable_from_planning() {
    let mut seen = HashSet::from([FiscalPeriodStatusType::Planning]);
    let mut queue = VecDeque::from([FiscalPeriodStatusType::Planning]);
    while let Some(status) = queue.pop_front() {
        for next in status.allowed_transitions() {
            if seen.insert(*next) {
                queue.push_back(*next);
            }
        }
    }
    assert_eq!(seen.len(), FiscalPeriodStatusType::ALL.len());
}

#[test]
fn transition_outcome_matches_tables() {
    let approver = UserId::new();
    for from in FiscalPeriodStatusType::ALL {
        let status = FiscalPeriodStatus::new(from);
        for to in FiscalPeriodStatusType::ALL {
            let approved = TransitionRequest::to(to).approved_by(approver);
            let result = status.transition_to(&approved, Utc::now());
            assert_eq!(result.is_ok(), from.can_transition_to(to), "{from} -> {to}");

            if from.can_transition_to(to) && to.requires_approval() {
                assert_eq!(
                    status.transition_to(&TransitionRequest::to(to), Utc::now()),
                    Err(FiscalError::ApprovalRequired(to))
                );
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_random_walk_stays_on_adjacency(
        steps in prop::collection::vec(any::<Index>(), 1..40)
    ) {
        let approver = UserId::new();
        let mut status = FiscalPeriodStatus::new(FiscalPeriodStatusType::Planning);

        for step in steps {
            let from = status.status();
            let options = from.allowed_transitions();
            if options.is_empty() {
                prop_assert!(from.is_final());
                break;
            }
            let target = *step.get(options);
            let next = status
                .transition_to(&TransitionRequest::to(target).approved_by(approver), Utc::now())
                .unwrap();
            prop_assert_eq!(next.previous(), Some(from));
            prop_assert_eq!(next.status(), target);
            status = next;
        }
    }

    #[test]
    fn prop_rejected_transition_leaves_status(
        from in any::<Index>(),
        to in any::<Index>(),
    ) {
        let from = *from.get(&FiscalPeriodStatusType::ALL);
        let to = *to.get(&FiscalPeriodStatusType::ALL);
        let status = FiscalPeriodStatus::new(from);
        let before = status.clone();
        if status.transition_to(&TransitionRequest::to(to), Utc::now()).is_err() {
            prop_assert_eq!(status, before);
        }
    }
}
