//! Property-based tests for the account hierarchy.
//!
//! - No sequence of accepted moves ever produces a cycle
//! - Depth from any root never exceeds the configured maximum
//! - A rejected move leaves every account untouched

use std::sync::Arc;

use chartwell_shared::types::{AccountId, CompanyId, Currency};
use proptest::prelude::*;
use proptest::sample::Index;

use super::account::{Account, NewAccount};
use super::config::HierarchyConfig;
use super::hierarchy::{AccountHierarchy, ProposedMove, walk_finds_cycle};
use super::types::AccountType;

const MAX_DEPTH: usize = 4;

/// Builds a random forest of current-asset accounts. Each account picks an
/// earlier account as parent, or becomes a root when the pick would be too deep.
fn build_forest(parents: &[Option<Index>]) -> (AccountHierarchy, Vec<AccountId>) {
    let config = Arc::new(HierarchyConfig::default().with_max_depth(MAX_DEPTH));
    let mut hierarchy = AccountHierarchy::new(config);
    let company = CompanyId::new();
    let mut ids: Vec<AccountId> = Vec::new();

    for (i, parent) in parents.iter().enumerate() {
        let parent_id = match parent {
            Some(index) if !ids.is_empty() => Some(*index.get(&ids)),
            _ => None,
        };
        let code = format!("1{:03}", 100 + i);
        let input = |parent_id| {
            NewAccount::new(
                company,
                code.clone(),
                format!("Account {i}"),
                AccountType::CurrentAsset,
                Currency::USD,
                parent_id,
            )
        };
        let id = match hierarchy.create(input(parent_id)) {
            Ok(id) => id,
            Err(_) => hierarchy.create(input(None)).unwrap(),
        };
        ids.push(id);
    }
    (hierarchy, ids)
}

fn forest_strategy() -> impl Strategy<Value = Vec<Option<Index>>> {
    prop::collection::vec(prop::option::of(any::<Index>()), 2..12)
}

fn moves_strategy() -> impl Strategy<Value = Vec<(Index, Option<Index>)>> {
    prop::collection::vec((any::<Index>(), prop::option::of(any::<Index>())), 1..16)
}

fn assert_structurally_sound(hierarchy: &AccountHierarchy) {
    for account in hierarchy.accounts() {
        let id = account.id();
        assert!(!walk_finds_cycle(id, account.parent_id(), |a| {
            hierarchy.get(a).and_then(Account::parent_id)
        }));
        let level = hierarchy.hierarchy_level(id).unwrap();
        assert!(level <= MAX_DEPTH, "level {level} exceeds {MAX_DEPTH}");
        for child in account.children() {
            assert_eq!(hierarchy.get(*child).unwrap().parent_id(), Some(id));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_moves_never_create_cycles_or_exceed_depth(
        parents in forest_strategy(),
        moves in moves_strategy(),
    ) {
        let (mut hierarchy, ids) = build_forest(&parents);
        assert_structurally_sound(&hierarchy);

        for (account, parent) in moves {
            let account = *account.get(&ids);
            let parent = parent.map(|p| *p.get(&ids));
            let _ = hierarchy.set_parent(account, parent);
            assert_structurally_sound(&hierarchy);
        }
    }

    #[test]
    fn prop_rejected_move_leaves_state_unchanged(
        parents in forest_strategy(),
        account in any::<Index>(),
        parent in any::<Index>(),
    ) {
        let (mut hierarchy, ids) = build_forest(&parents);
        let before = hierarchy.clone();
        let account = *account.get(&ids);
        let parent = *parent.get(&ids);

        if hierarchy.set_parent(account, Some(parent)).is_err() {
            for id in &ids {
                prop_assert_eq!(hierarchy.get(*id), before.get(*id));
            }
        }
    }

    #[test]
    fn prop_single_move_cycle_check_matches_plan_check(
        parents in forest_strategy(),
        account in any::<Index>(),
        parent in any::<Index>(),
    ) {
        let (hierarchy, ids) = build_forest(&parents);
        let account = *account.get(&ids);
        let parent = *parent.get(&ids);

        let single = hierarchy.would_create_cycle(account, parent);
        let plan = hierarchy.detect_plan_cycles(&[ProposedMove {
            account_id: account,
            new_parent_id: Some(parent),
        }]);
        prop_assert_eq!(single, plan.contains(&account));
    }
}
