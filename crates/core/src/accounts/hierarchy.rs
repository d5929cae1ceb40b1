//! Arena holding a chart of accounts.
//!
//! Accounts are stored in a table keyed by id; parent and child relations
//! are id references resolved through the table, so cycle checks are plain
//! walks over the map.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use chartwell_shared::types::{AccountId, Money, UserId};

use super::account::{Account, NewAccount, check_parent_compatibility};
use super::config::HierarchyConfig;
use super::error::AccountError;

/// Separator used when rendering a hierarchy path.
pub const PATH_SEPARATOR: &str = " > ";

/// Walks the parent chain starting at `start` and reports whether it
/// revisits `origin` or any id seen earlier in the same walk.
///
/// The visited set bounds the walk, so corrupt data that already contains
/// a loop terminates as well.
pub fn walk_finds_cycle<F>(origin: AccountId, start: Option<AccountId>, parent_of: F) -> bool
where
    F: Fn(AccountId) -> Option<AccountId>,
{
    let mut visited = HashSet::new();
    let mut current = start;
    while let Some(id) = current {
        if id == origin || !visited.insert(id) {
            return true;
        }
        current = parent_of(id);
    }
    false
}

/// A single proposed parent change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProposedMove {
    /// Account to move.
    pub account_id: AccountId,
    /// New parent, `None` to promote to root.
    pub new_parent_id: Option<AccountId>,
}

/// The chart of accounts as an id-indexed arena.
#[derive(Debug, Clone)]
pub struct AccountHierarchy {
    config: Arc<HierarchyConfig>,
    accounts: HashMap<AccountId, Account>,
    codes: HashMap<String, AccountId>,
}

impl AccountHierarchy {
    /// Creates an empty chart.
    #[must_use]
    pub fn new(config: Arc<HierarchyConfig>) -> Self {
        Self {
            config,
            accounts: HashMap::new(),
            codes: HashMap::new(),
        }
    }

    /// Loads persisted accounts. Child sets are rebuilt from parent ids so
    /// the two directions of the relation always agree.
    #[must_use]
    pub fn from_accounts<I>(config: Arc<HierarchyConfig>, accounts: I) -> Self
    where
        I: IntoIterator<Item = Account>,
    {
        let mut hierarchy = Self::new(config);
        for mut account in accounts {
            account.clear_children();
            hierarchy.codes.insert(account.code().to_string(), account.id());
            hierarchy.accounts.insert(account.id(), account);
        }
        let links: Vec<(AccountId, AccountId)> = hierarchy
            .accounts
            .values()
            .filter_map(|a| a.parent_id().map(|p| (p, a.id())))
            .collect();
        for (parent, child) in links {
            if let Some(parent) = hierarchy.accounts.get_mut(&parent) {
                parent.add_child(child);
            }
        }
        hierarchy
    }

    /// The config this chart validates against.
    #[must_use]
    pub fn config(&self) -> &HierarchyConfig {
        &self.config
    }

    /// Number of accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// True if the chart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Looks up an account by id.
    #[must_use]
    pub fn get(&self, id: AccountId) -> Option<&Account> {
        self.accounts.get(&id)
    }

    /// Looks up an account by code.
    #[must_use]
    pub fn get_by_code(&self, code: &str) -> Option<&Account> {
        self.codes.get(code).and_then(|id| self.accounts.get(id))
    }

    /// Iterates all accounts in no particular order.
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    /// Accounts sorted by code.
    #[must_use]
    pub fn accounts_by_code(&self) -> Vec<&Account> {
        let mut accounts: Vec<&Account> = self.accounts.values().collect();
        accounts.sort_by(|a, b| a.code().cmp(b.code()));
        accounts
    }

    /// Root accounts sorted by code.
    #[must_use]
    pub fn roots(&self) -> Vec<&Account> {
        let mut roots: Vec<&Account> = self
            .accounts
            .values()
            .filter(|a| a.parent_id().is_none())
            .collect();
        roots.sort_by(|a, b| a.code().cmp(b.code()));
        roots
    }

    /// Direct children of an account.
    #[must_use]
    pub fn children_of(&self, id: AccountId) -> Vec<&Account> {
        self.get(id)
            .map(|a| a.children().iter().filter_map(|c| self.get(*c)).collect())
            .unwrap_or_default()
    }

    /// Creates an account inside the chart.
    ///
    /// # Errors
    ///
    /// Fails if the parent is unknown, the code is taken, the depth limit
    /// would be exceeded, or any account-level invariant fails.
    pub fn create(&mut self, input: NewAccount) -> Result<AccountId, AccountError> {
        let parent = match input.parent_id {
            Some(parent_id) => Some(
                self.accounts
                    .get(&parent_id)
                    .ok_or(AccountError::ParentNotFound(parent_id))?,
            ),
            None => None,
        };

        let depth = match parent {
            Some(p) => self.hierarchy_level(p.id())? + 1,
            None => 0,
        };
        if depth > self.config.max_depth() {
            return Err(AccountError::MaxDepthExceeded {
                depth,
                max: self.config.max_depth(),
            });
        }

        let account = Account::create(input, parent, &self.config)?;
        if self.codes.contains_key(account.code()) {
            return Err(AccountError::DuplicateCode(account.code().to_string()));
        }

        let id = account.id();
        if let Some(parent_id) = account.parent_id()
            && let Some(parent) = self.accounts.get_mut(&parent_id)
        {
            parent.add_child(id);
        }
        self.codes.insert(account.code().to_string(), id);
        self.accounts.insert(id, account);
        Ok(id)
    }

    /// Ids from the direct parent up to the root.
    ///
    /// # Errors
    ///
    /// Returns `CircularReference` if stored data already contains a loop.
    pub fn ancestors(&self, id: AccountId) -> Result<Vec<AccountId>, AccountError> {
        let account = self.get(id).ok_or(AccountError::NotFound(id))?;
        let mut chain = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut current = account.parent_id();
        while let Some(parent) = current {
            if !seen.insert(parent) {
                return Err(AccountError::CircularReference {
                    account: id,
                    parent,
                });
            }
            chain.push(parent);
            current = self.get(parent).and_then(Account::parent_id);
        }
        Ok(chain)
    }

    /// All descendants, breadth first.
    #[must_use]
    pub fn descendants(&self, id: AccountId) -> Vec<AccountId> {
        let mut result = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut queue: Vec<AccountId> = self
            .get(id)
            .map(|a| a.children().iter().copied().collect())
            .unwrap_or_default();
        while !queue.is_empty() {
            let mut next = Vec::new();
            for child in queue {
                if seen.insert(child) {
                    result.push(child);
                    if let Some(account) = self.get(child) {
                        next.extend(account.children().iter().copied());
                    }
                }
            }
            queue = next;
        }
        result
    }

    /// Depth below the account: 0 for a leaf.
    #[must_use]
    pub fn subtree_depth(&self, id: AccountId) -> usize {
        fn height(h: &AccountHierarchy, id: AccountId, seen: &mut HashSet<AccountId>) -> usize {
            if !seen.insert(id) {
                return 0;
            }
            h.get(id)
                .map(|a| {
                    a.children()
                        .iter()
                        .map(|c| 1 + height(h, *c, seen))
                        .max()
                        .unwrap_or(0)
                })
                .unwrap_or(0)
        }
        height(self, id, &mut HashSet::new())
    }

    /// Level of the account, root = 0.
    pub fn hierarchy_level(&self, id: AccountId) -> Result<usize, AccountError> {
        Ok(self.ancestors(id)?.len())
    }

    /// Root-to-self code chain, e.g. `1000 > 1100 > 1110`.
    pub fn hierarchy_path(&self, id: AccountId) -> Result<String, AccountError> {
        let account = self.get(id).ok_or(AccountError::NotFound(id))?;
        let mut codes: Vec<&str> = self
            .ancestors(id)?
            .into_iter()
            .filter_map(|a| self.get(a).map(Account::code))
            .collect();
        codes.reverse();
        codes.push(account.code());
        Ok(codes.join(PATH_SEPARATOR))
    }

    /// Own balance plus the total balances of all children.
    pub fn calculate_total_balance(&self, id: AccountId) -> Result<Money, AccountError> {
        let account = self.get(id).ok_or(AccountError::NotFound(id))?;
        let mut total = account.balance();
        for child in self.descendants(id) {
            if let Some(child) = self.get(child) {
                total = total.checked_add(&child.balance())?;
            }
        }
        Ok(total)
    }

    /// True if giving `account_id` the parent `proposed_parent` would close a loop.
    #[must_use]
    pub fn would_create_cycle(&self, account_id: AccountId, proposed_parent: AccountId) -> bool {
        walk_finds_cycle(account_id, Some(proposed_parent), |id| {
            self.get(id).and_then(Account::parent_id)
        })
    }

    /// Checks a batch of moves for cycles that only appear once several of
    /// them are applied together.
    ///
    /// Parents are resolved through the proposed map first and fall back to
    /// the stored parent. Returns the ids of every flagged move.
    #[must_use]
    pub fn detect_plan_cycles(&self, moves: &[ProposedMove]) -> BTreeSet<AccountId> {
        let proposed: HashMap<AccountId, Option<AccountId>> = moves
            .iter()
            .map(|m| (m.account_id, m.new_parent_id))
            .collect();
        let parent_of = |id: AccountId| match proposed.get(&id) {
            Some(parent) => *parent,
            None => self.get(id).and_then(Account::parent_id),
        };

        moves
            .iter()
            .filter(|m| walk_finds_cycle(m.account_id, m.new_parent_id, parent_of))
            .map(|m| m.account_id)
            .collect()
    }

    /// Moves an account under a new parent (or to the root).
    ///
    /// Checks run in order: self-parenting, category, currency, cycle,
    /// depth, then the parent type table. Nothing changes on failure.
    /// Returns the previous parent.
    pub fn set_parent(
        &mut self,
        id: AccountId,
        new_parent: Option<AccountId>,
    ) -> Result<Option<AccountId>, AccountError> {
        let account = self.get(id).ok_or(AccountError::NotFound(id))?;
        if account.is_archived() {
            return Err(AccountError::Archived(id));
        }
        let previous = account.parent_id();

        if let Some(parent_id) = new_parent {
            if parent_id == id {
                return Err(AccountError::SelfParent(id));
            }
            let parent = self
                .get(parent_id)
                .ok_or(AccountError::ParentNotFound(parent_id))?;
            if account.category() != parent.category() {
                return Err(AccountError::CategoryMismatch {
                    child: account.category(),
                    parent: parent.category(),
                });
            }
            if account.currency() != parent.currency() {
                return Err(AccountError::CurrencyMismatch {
                    child: account.currency(),
                    parent: parent.currency(),
                });
            }
            if self.would_create_cycle(id, parent_id) {
                return Err(AccountError::CircularReference {
                    account: id,
                    parent: parent_id,
                });
            }
            let depth = self.hierarchy_level(parent_id)? + 1 + self.subtree_depth(id);
            if depth > self.config.max_depth() {
                return Err(AccountError::MaxDepthExceeded {
                    depth,
                    max: self.config.max_depth(),
                });
            }
            check_parent_compatibility(account.account_type(), account.currency(), parent)?;
        }

        if previous == new_parent {
            return Ok(previous);
        }
        if let Some(old) = previous
            && let Some(old_parent) = self.accounts.get_mut(&old)
        {
            old_parent.remove_child(id);
        }
        if let Some(parent_id) = new_parent
            && let Some(parent) = self.accounts.get_mut(&parent_id)
        {
            parent.add_child(id);
        }
        if let Some(account) = self.accounts.get_mut(&id) {
            account.set_parent_id(new_parent);
        }
        Ok(previous)
    }

    /// Renames an account code, keeping codes unique.
    pub fn change_code(&mut self, id: AccountId, code: &str) -> Result<String, AccountError> {
        let code = code.trim();
        if let Some(existing) = self.codes.get(code)
            && *existing != id
        {
            return Err(AccountError::DuplicateCode(code.to_string()));
        }
        let config = Arc::clone(&self.config);
        let account = self.accounts.get_mut(&id).ok_or(AccountError::NotFound(id))?;
        let previous = account.code().to_string();
        account.change_code(code, &config)?;
        self.codes.remove(&previous);
        self.codes.insert(code.to_string(), id);
        Ok(previous)
    }

    /// Activates an account. Returns false if it was already active.
    pub fn activate(&mut self, id: AccountId, actor: Option<UserId>) -> Result<bool, AccountError> {
        self.accounts
            .get_mut(&id)
            .ok_or(AccountError::NotFound(id))?
            .activate(actor)
    }

    /// Deactivates an account whose balance is zero and whose direct
    /// children are all inactive. Returns false if it was already inactive.
    pub fn deactivate(&mut self, id: AccountId, actor: Option<UserId>) -> Result<bool, AccountError> {
        let account = self.get(id).ok_or(AccountError::NotFound(id))?;
        account.ensure_can_deactivate(actor)?;
        let active_children = self
            .children_of(id)
            .into_iter()
            .filter(|c| c.is_active())
            .count();
        if active_children > 0 {
            return Err(AccountError::ActiveChildren {
                account: id,
                count: active_children,
            });
        }
        Ok(self
            .accounts
            .get_mut(&id)
            .ok_or(AccountError::NotFound(id))?
            .apply_deactivation())
    }

    /// Marks a leaf account as a control account.
    pub fn mark_as_control_account(&mut self, id: AccountId) -> Result<bool, AccountError> {
        self.accounts
            .get_mut(&id)
            .ok_or(AccountError::NotFound(id))?
            .mark_as_control_account()
    }

    /// Replaces an account's own balance.
    pub fn update_balance(&mut self, id: AccountId, balance: Money) -> Result<(), AccountError> {
        self.accounts
            .get_mut(&id)
            .ok_or(AccountError::NotFound(id))?
            .update_balance(balance)
    }

    /// Archives an account.
    pub fn archive(
        &mut self,
        id: AccountId,
        at: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), AccountError> {
        self.accounts
            .get_mut(&id)
            .ok_or(AccountError::NotFound(id))?
            .archive(at)
    }

    /// Stamps the version returned by a successful save.
    pub fn set_version(&mut self, id: AccountId, version: i64) -> Result<(), AccountError> {
        self.accounts
            .get_mut(&id)
            .ok_or(AccountError::NotFound(id))?
            .set_version(version);
        Ok(())
    }

    /// Consumes the chart, yielding its accounts.
    #[must_use]
    pub fn into_accounts(self) -> Vec<Account> {
        self.accounts.into_values().collect()
    }
}
