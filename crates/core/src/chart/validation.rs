//! Report-style checks over a loaded chart.
//!
//! Nothing here fails: every finding becomes an entry in the returned
//! report or map.

use std::collections::{BTreeMap, HashSet};

use chartwell_shared::types::AccountId;

use super::types::{BatchItemError, HierarchyValidationReport, ReorganizationPlan};
use crate::accounts::{Account, AccountError, AccountHierarchy, NewAccount, ProposedMove};

fn push_error(report: &mut HierarchyValidationReport, err: &AccountError) {
    report.issue(err.error_code(), err.to_string());
}

/// Checks `input` against `chart`, collecting every finding.
///
/// With `existing` set, the input describes an account already in the
/// chart: its own code does not count as a duplicate and the parent is
/// checked for cycles and for the depth of the subtree it would carry.
#[must_use]
pub fn validate_account(
    chart: &AccountHierarchy,
    input: &NewAccount,
    existing: Option<AccountId>,
) -> HierarchyValidationReport {
    let mut report = HierarchyValidationReport::default();
    let config = chart.config();
    let code = input.code.trim();

    if let Err(err) = config.validate_code(code, input.account_type) {
        push_error(&mut report, &err);
    }
    if input.name.trim().is_empty() {
        push_error(&mut report, &AccountError::EmptyName);
    }
    if let Some(other) = chart.get_by_code(code)
        && Some(other.id()) != existing
    {
        push_error(&mut report, &AccountError::DuplicateCode(code.to_string()));
    }
    if let Some(id) = existing
        && chart.get(id).is_none()
    {
        push_error(&mut report, &AccountError::NotFound(id));
    }

    match input.parent_id {
        Some(parent_id) if existing == Some(parent_id) => {
            push_error(&mut report, &AccountError::SelfParent(parent_id));
        }
        Some(parent_id) => match chart.get(parent_id) {
            None => push_error(&mut report, &AccountError::ParentNotFound(parent_id)),
            Some(parent) => check_parent(chart, input, existing, parent, &mut report),
        },
        None => {
            if !input.account_type.is_header() {
                report.warnings.push(format!(
                    "Account {code} of type {} sits at the root of the chart",
                    input.account_type
                ));
                let category = input.account_type.category();
                let header = chart
                    .roots()
                    .into_iter()
                    .find(|r| r.account_type().is_header() && r.category() == category);
                report.recommendations.push(match header {
                    Some(header) => {
                        format!("Nest {code} under the {category} header {}", header.code())
                    }
                    None => format!("Create a {category} header and nest {code} under it"),
                });
            }
        }
    }

    report.finish()
}

fn check_parent(
    chart: &AccountHierarchy,
    input: &NewAccount,
    existing: Option<AccountId>,
    parent: &Account,
    report: &mut HierarchyValidationReport,
) {
    let code = input.code.trim();
    let category = input.account_type.category();

    if parent.is_archived() {
        push_error(report, &AccountError::Archived(parent.id()));
    }
    if category != parent.category() {
        push_error(
            report,
            &AccountError::CategoryMismatch {
                child: category,
                parent: parent.category(),
            },
        );
    } else if !input.account_type.can_be_child_of(parent.account_type()) {
        push_error(
            report,
            &AccountError::IncompatibleParentType {
                child: input.account_type,
                parent: parent.account_type(),
            },
        );
    }
    if input.currency != parent.currency() {
        push_error(
            report,
            &AccountError::CurrencyMismatch {
                child: input.currency,
                parent: parent.currency(),
            },
        );
    }
    if parent.is_control_account() {
        push_error(report, &AccountError::ControlAccountCannotHaveChildren(parent.id()));
    }
    if let Some(id) = existing
        && chart.would_create_cycle(id, parent.id())
    {
        push_error(
            report,
            &AccountError::CircularReference {
                account: id,
                parent: parent.id(),
            },
        );
    }

    match chart.hierarchy_level(parent.id()) {
        Ok(level) => {
            let max = chart.config().max_depth();
            let carried = existing.map_or(0, |id| chart.subtree_depth(id));
            let depth = level + 1 + carried;
            if depth > max {
                push_error(report, &AccountError::MaxDepthExceeded { depth, max });
            } else if level + 1 == max {
                report.warnings.push(format!(
                    "Account {code} would sit at the maximum depth of {max} and could not receive children"
                ));
            }
        }
        Err(err) => push_error(report, &err),
    }

    if !parent.is_active() {
        report
            .warnings
            .push(format!("Parent account {} is inactive", parent.code()));
    }
    if !parent.balance().is_zero() {
        report.warnings.push(format!(
            "Parent account {} carries a posted balance of {}",
            parent.code(),
            parent.balance()
        ));
        report.recommendations.push(format!(
            "Move the balance of {} into a leaf account before adding children",
            parent.code()
        ));
    }

    let prefix = parent.code().trim_end_matches('0');
    if !prefix.is_empty() && !code.starts_with(prefix) {
        report.recommendations.push(format!(
            "Use a code starting with '{prefix}' to keep numbering aligned with parent {}",
            parent.code()
        ));
    }
}

/// Finds moves of a plan that must not run, keyed by their index.
///
/// Flags unknown accounts, repeated accounts, repeated target codes and
/// moves that close a cycle once the whole plan is applied.
#[must_use]
pub fn validate_plan(
    chart: &AccountHierarchy,
    plan: &ReorganizationPlan,
) -> BTreeMap<usize, BatchItemError> {
    let mut flagged = BTreeMap::new();
    let mut seen_accounts = HashSet::new();
    let mut seen_codes = HashSet::new();

    for (index, m) in plan.moves.iter().enumerate() {
        if chart.get(m.account_id).is_none() {
            let err = AccountError::NotFound(m.account_id);
            flagged.insert(
                index,
                BatchItemError::new(m.account_id, err.error_code(), err.to_string()),
            );
            continue;
        }
        if !seen_accounts.insert(m.account_id) {
            flagged.insert(
                index,
                BatchItemError::new(
                    m.account_id,
                    "DUPLICATE_MOVE",
                    format!("Account {} appears more than once in the plan", m.account_id),
                ),
            );
            continue;
        }
        if let Some(code) = &m.new_code
            && !seen_codes.insert(code.trim().to_string())
        {
            flagged.insert(
                index,
                BatchItemError::new(
                    m.account_id,
                    "DUPLICATE_TARGET_CODE",
                    format!("Code '{}' is assigned more than once in the plan", code.trim()),
                ),
            );
        }
    }

    let proposed: Vec<ProposedMove> = plan
        .moves
        .iter()
        .enumerate()
        .filter(|(index, _)| !flagged.contains_key(index))
        .map(|(_, m)| ProposedMove {
            account_id: m.account_id,
            new_parent_id: m.new_parent_id,
        })
        .collect();
    let cyclic = chart.detect_plan_cycles(&proposed);

    for (index, m) in plan.moves.iter().enumerate() {
        if flagged.contains_key(&index) || !cyclic.contains(&m.account_id) {
            continue;
        }
        let parent = m.new_parent_id.unwrap_or(m.account_id);
        let err = AccountError::CircularReference {
            account: m.account_id,
            parent,
        };
        flagged.insert(
            index,
            BatchItemError::new(m.account_id, err.error_code(), err.to_string()),
        );
    }
    flagged
}
