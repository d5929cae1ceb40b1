//! Account aggregate.
//!
//! An account is a node in the chart of accounts. Relations to other
//! accounts are stored as ids only; the [`AccountHierarchy`] arena resolves
//! them. State changes go through named operations that keep the
//! structural invariants intact.
//!
//! [`AccountHierarchy`]: super::hierarchy::AccountHierarchy

use std::collections::BTreeSet;

use chartwell_shared::types::{AccountId, CompanyId, Currency, Money, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::config::HierarchyConfig;
use super::error::AccountError;
use super::types::{AccountCategory, AccountType, NormalBalance};

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Company owning the chart.
    pub company_id: CompanyId,
    /// Account code (must be unique within the chart).
    pub code: String,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Account type.
    pub account_type: AccountType,
    /// Account currency.
    pub currency: Currency,
    /// Parent account, `None` for a root.
    pub parent_id: Option<AccountId>,
    /// System accounts need an explicit actor to change activation.
    pub is_system_account: bool,
}

impl NewAccount {
    /// Shorthand for a non-system account without description.
    #[must_use]
    pub fn new(
        company_id: CompanyId,
        code: impl Into<String>,
        name: impl Into<String>,
        account_type: AccountType,
        currency: Currency,
        parent_id: Option<AccountId>,
    ) -> Self {
        Self {
            company_id,
            code: code.into(),
            name: name.into(),
            description: None,
            account_type,
            currency,
            parent_id,
            is_system_account: false,
        }
    }

    /// Marks the account as a system account.
    #[must_use]
    pub fn system(mut self) -> Self {
        self.is_system_account = true;
        self
    }
}

/// A chart of accounts entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    id: AccountId,
    company_id: CompanyId,
    code: String,
    name: String,
    description: Option<String>,
    account_type: AccountType,
    currency: Currency,
    balance: Money,
    is_active: bool,
    is_control_account: bool,
    allows_direct_posting: bool,
    requires_subsidiary: bool,
    is_system_account: bool,
    parent_id: Option<AccountId>,
    children: BTreeSet<AccountId>,
    deactivated_at: Option<DateTime<Utc>>,
    archived_at: Option<DateTime<Utc>>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Account {
    /// Creates an account, validating every invariant that can be checked
    /// against the account itself and its direct parent.
    ///
    /// Depth and code uniqueness need the whole chart and are enforced by
    /// the hierarchy.
    ///
    /// # Errors
    ///
    /// Returns an error if the code does not match the category pattern, the
    /// name is blank, or the parent has a different category or currency or
    /// does not accept this type.
    pub fn create(
        input: NewAccount,
        parent: Option<&Account>,
        config: &HierarchyConfig,
    ) -> Result<Self, AccountError> {
        let code = input.code.trim().to_string();
        config.validate_code(&code, input.account_type)?;

        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(AccountError::EmptyName);
        }

        let id = AccountId::new();
        if let Some(parent) = parent {
            if parent.id == id {
                return Err(AccountError::SelfParent(id));
            }
            check_parent_compatibility(input.account_type, input.currency, parent)?;
        }

        let now = Utc::now();
        Ok(Self {
            id,
            company_id: input.company_id,
            code,
            name,
            description: input.description,
            account_type: input.account_type,
            currency: input.currency,
            balance: Money::zero(input.currency),
            is_active: true,
            is_control_account: false,
            allows_direct_posting: true,
            requires_subsidiary: false,
            is_system_account: input.is_system_account,
            parent_id: parent.map(|p| p.id),
            children: BTreeSet::new(),
            deactivated_at: None,
            archived_at: None,
            version: 0,
            created_at: now,
            updated_at: now,
        })
    }

    // ---- accessors ----

    /// Account id.
    #[must_use]
    pub fn id(&self) -> AccountId {
        self.id
    }

    /// Owning company.
    #[must_use]
    pub fn company_id(&self) -> CompanyId {
        self.company_id
    }

    /// Account code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Account type.
    #[must_use]
    pub fn account_type(&self) -> AccountType {
        self.account_type
    }

    /// Account category.
    #[must_use]
    pub fn category(&self) -> AccountCategory {
        self.account_type.category()
    }

    /// Normal balance side.
    #[must_use]
    pub fn normal_balance(&self) -> NormalBalance {
        self.account_type.normal_balance()
    }

    /// Account currency.
    #[must_use]
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Own balance, excluding children.
    #[must_use]
    pub fn balance(&self) -> Money {
        self.balance
    }

    /// Whether the account is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Whether the account aggregates a subsidiary ledger.
    #[must_use]
    pub fn is_control_account(&self) -> bool {
        self.is_control_account
    }

    /// Whether lines may be posted to the account directly.
    #[must_use]
    pub fn allows_direct_posting(&self) -> bool {
        self.allows_direct_posting
    }

    /// Whether postings must be routed through a subsidiary ledger.
    #[must_use]
    pub fn requires_subsidiary(&self) -> bool {
        self.requires_subsidiary
    }

    /// Whether this is a system account.
    #[must_use]
    pub fn is_system_account(&self) -> bool {
        self.is_system_account
    }

    /// Parent account id.
    #[must_use]
    pub fn parent_id(&self) -> Option<AccountId> {
        self.parent_id
    }

    /// Direct children.
    #[must_use]
    pub fn children(&self) -> &BTreeSet<AccountId> {
        &self.children
    }

    /// True if the account has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// When the account was last deactivated.
    #[must_use]
    pub fn deactivated_at(&self) -> Option<DateTime<Utc>> {
        self.deactivated_at
    }

    /// When the account was archived.
    #[must_use]
    pub fn archived_at(&self) -> Option<DateTime<Utc>> {
        self.archived_at
    }

    /// True once archived.
    #[must_use]
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    /// Optimistic concurrency version.
    #[must_use]
    pub fn version(&self) -> i64 {
        self.version
    }

    /// Creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last modification timestamp.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // ---- named operations ----

    /// Activates the account. Returns false if it was already active.
    ///
    /// # Errors
    ///
    /// Fails for archived accounts and for system accounts without an actor.
    pub fn activate(&mut self, actor: Option<UserId>) -> Result<bool, AccountError> {
        if self.is_archived() {
            return Err(AccountError::Archived(self.id));
        }
        self.require_actor_for_system(actor)?;
        if self.is_active {
            return Ok(false);
        }
        self.is_active = true;
        self.deactivated_at = None;
        self.touch();
        Ok(true)
    }

    /// Marks the account as a control account.
    ///
    /// Returns false if it already was one.
    ///
    /// # Errors
    ///
    /// Fails unless the account is currently a leaf.
    pub fn mark_as_control_account(&mut self) -> Result<bool, AccountError> {
        if !self.is_leaf() {
            return Err(AccountError::ControlAccountNotLeaf(self.id));
        }
        if self.is_control_account {
            return Ok(false);
        }
        self.is_control_account = true;
        self.allows_direct_posting = false;
        self.requires_subsidiary = true;
        self.touch();
        Ok(true)
    }

    /// Replaces the account's own balance.
    ///
    /// # Errors
    ///
    /// Fails on currency mismatch or a non-zero balance on an inactive account.
    pub fn update_balance(&mut self, balance: Money) -> Result<(), AccountError> {
        self.balance.ensure_same_currency(&balance)?;
        if !self.is_active && !balance.is_zero() {
            return Err(AccountError::InactiveBalance(self.id));
        }
        self.balance = balance;
        self.touch();
        Ok(())
    }

    /// Adds a signed change to the balance.
    ///
    /// # Errors
    ///
    /// Same as [`Account::update_balance`].
    pub fn apply_balance_change(&mut self, change: Money) -> Result<(), AccountError> {
        let next = self.balance.checked_add(&change)?;
        self.update_balance(next)
    }

    /// Archives an inactive, zero-balance account.
    ///
    /// # Errors
    ///
    /// Fails if the account is active, already archived, or carries a balance.
    pub fn archive(&mut self, at: DateTime<Utc>) -> Result<(), AccountError> {
        if self.is_archived() {
            return Err(AccountError::Archived(self.id));
        }
        if self.is_active {
            return Err(AccountError::StillActive(self.id));
        }
        if !self.balance.is_zero() {
            return Err(AccountError::NonZeroBalance {
                account: self.id,
                balance: self.balance,
            });
        }
        self.archived_at = Some(at);
        self.touch();
        Ok(())
    }

    /// Replaces the code after validating it against the type's pattern.
    ///
    /// Uniqueness is checked by the caller that owns the whole chart.
    pub fn change_code(&mut self, code: &str, config: &HierarchyConfig) -> Result<(), AccountError> {
        let code = code.trim();
        config.validate_code(code, self.account_type)?;
        code.clone_into(&mut self.code);
        self.touch();
        Ok(())
    }

    /// Sets the version after a successful optimistic save.
    pub fn set_version(&mut self, version: i64) {
        self.version = version;
    }

    // ---- crate-internal mutators used by the hierarchy ----

    pub(crate) fn ensure_can_deactivate(&self, actor: Option<UserId>) -> Result<(), AccountError> {
        if self.is_archived() {
            return Err(AccountError::Archived(self.id));
        }
        self.require_actor_for_system(actor)?;
        if !self.balance.is_zero() {
            return Err(AccountError::NonZeroBalance {
                account: self.id,
                balance: self.balance,
            });
        }
        Ok(())
    }

    pub(crate) fn apply_deactivation(&mut self) -> bool {
        if !self.is_active {
            return false;
        }
        self.is_active = false;
        self.deactivated_at = Some(Utc::now());
        self.touch();
        true
    }

    pub(crate) fn set_parent_id(&mut self, parent: Option<AccountId>) {
        self.parent_id = parent;
        self.touch();
    }

    pub(crate) fn add_child(&mut self, child: AccountId) {
        self.children.insert(child);
    }

    pub(crate) fn remove_child(&mut self, child: AccountId) {
        self.children.remove(&child);
    }

    pub(crate) fn clear_children(&mut self) {
        self.children.clear();
    }

    fn require_actor_for_system(&self, actor: Option<UserId>) -> Result<(), AccountError> {
        if self.is_system_account && actor.is_none() {
            return Err(AccountError::SystemAccountRequiresActor(self.id));
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Checks the category, currency, control-account and type table rules for
/// nesting an account of `child_type`/`child_currency` under `parent`.
pub(crate) fn check_parent_compatibility(
    child_type: AccountType,
    child_currency: Currency,
    parent: &Account,
) -> Result<(), AccountError> {
    if child_type.category() != parent.category() {
        return Err(AccountError::CategoryMismatch {
            child: child_type.category(),
            parent: parent.category(),
        });
    }
    if child_currency != parent.currency {
        return Err(AccountError::CurrencyMismatch {
            child: child_currency,
            parent: parent.currency,
        });
    }
    if parent.is_control_account {
        return Err(AccountError::ControlAccountCannotHaveChildren(parent.id));
    }
    if !child_type.can_be_child_of(parent.account_type) {
        return Err(AccountError::IncompatibleParentType {
            child: child_type,
            parent: parent.account_type,
        });
    }
    Ok(())
}
