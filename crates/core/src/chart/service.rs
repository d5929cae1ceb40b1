//! Chart of accounts service.
//!
//! The service holds no chart state of its own. Every operation loads the
//! chart from the repository, applies the change through the hierarchy
//! arena, saves the touched accounts with their versions and emits the
//! matching domain facts.
//!
//! Single-account operations fail fast. Reorganization and archival are
//! best-effort batches that report per-item errors. Merge either completes
//! or reports `success = false`, relying on the repository to keep the
//! line reassignment atomic.

use std::collections::BTreeMap;
use std::sync::Arc;

use chartwell_shared::types::{AccountId, CompanyId, Currency, Money, MoneyError, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::error::ChartError;
use super::standard::standard_accounts;
use super::types::{
    AccountMove, ArchiveCandidate, ArchiveResult, BatchItemError, HierarchyValidationReport,
    MergeResult, MovedAccount, ReorganizationPlan, ReorganizationResult, StandardChartResult,
    TrialBalance, TrialBalanceEntry, TrialBalanceTotals,
};
use super::validation::{validate_account, validate_plan};
use crate::accounts::{
    Account, AccountError, AccountHierarchy, HierarchyConfig, NewAccount, NormalBalance,
};
use crate::audit::{AuditRecord, AuditSink, DomainEvent};
use crate::repository::AccountRepository;

/// Chart of accounts service over a repository and an audit sink.
pub struct ChartOfAccountsService<R, A> {
    repo: Arc<R>,
    audit: Arc<A>,
    config: Arc<HierarchyConfig>,
}

impl<R, A> ChartOfAccountsService<R, A>
where
    R: AccountRepository,
    A: AuditSink,
{
    /// Create a new chart of accounts service.
    #[must_use]
    pub fn new(repo: Arc<R>, audit: Arc<A>, config: Arc<HierarchyConfig>) -> Self {
        Self {
            repo,
            audit,
            config,
        }
    }

    /// The structural limits the service validates against.
    #[must_use]
    pub fn config(&self) -> &HierarchyConfig {
        &self.config
    }

    /// Loads the whole chart into a hierarchy arena.
    ///
    /// # Errors
    ///
    /// Returns a repository error if the accounts cannot be read.
    pub async fn load_chart(&self) -> Result<AccountHierarchy, ChartError> {
        let accounts = self.repo.find_all().await?;
        Ok(AccountHierarchy::from_accounts(
            Arc::clone(&self.config),
            accounts,
        ))
    }

    /// Creates and persists an account.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule, or a repository error.
    pub async fn create_account(
        &self,
        input: NewAccount,
        actor: Option<UserId>,
    ) -> Result<Account, ChartError> {
        let mut chart = self.load_chart().await?;
        let id = chart.create(input)?;
        let account = self.save(&chart, id).await?;
        info!(account_id = %id, code = account.code(), "account created");

        self.emit(
            DomainEvent::AccountCreated {
                account_id: id,
                code: account.code().to_string(),
                account_type: account.account_type(),
                parent_id: account.parent_id(),
            },
            actor,
        )
        .await;
        Ok(account)
    }

    /// Moves an account under a new parent, or to the root with `None`.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule; the stored chart is unchanged.
    pub async fn set_parent(
        &self,
        account_id: AccountId,
        new_parent_id: Option<AccountId>,
        actor: Option<UserId>,
    ) -> Result<Account, ChartError> {
        let mut chart = self.load_chart().await?;
        let previous = chart.set_parent(account_id, new_parent_id)?;
        if previous == new_parent_id {
            return self.current(&chart, account_id);
        }

        let account = self.save(&chart, account_id).await?;
        info!(account_id = %account_id, ?previous, parent = ?new_parent_id, "account moved");
        self.emit(
            DomainEvent::ParentChanged {
                account_id,
                before: previous,
                after: new_parent_id,
            },
            actor,
        )
        .await;
        Ok(account)
    }

    /// Activates an account.
    ///
    /// # Errors
    ///
    /// Fails for archived accounts and for system accounts without `actor`.
    pub async fn activate_account(
        &self,
        account_id: AccountId,
        actor: Option<UserId>,
    ) -> Result<Account, ChartError> {
        let mut chart = self.load_chart().await?;
        if !chart.activate(account_id, actor)? {
            return self.current(&chart, account_id);
        }
        let account = self.save(&chart, account_id).await?;
        info!(account_id = %account_id, "account activated");
        self.emit_activation(account_id, true, actor).await;
        Ok(account)
    }

    /// Deactivates an account with a zero balance and no active children.
    ///
    /// # Errors
    ///
    /// Fails with `NonZeroBalance` or `ActiveChildren`; nothing is saved.
    pub async fn deactivate_account(
        &self,
        account_id: AccountId,
        actor: Option<UserId>,
    ) -> Result<Account, ChartError> {
        let mut chart = self.load_chart().await?;
        if !chart.deactivate(account_id, actor)? {
            return self.current(&chart, account_id);
        }
        let account = self.save(&chart, account_id).await?;
        info!(account_id = %account_id, "account deactivated");
        self.emit_activation(account_id, false, actor).await;
        Ok(account)
    }

    /// Turns a leaf account into a control account.
    ///
    /// # Errors
    ///
    /// Fails with `ControlAccountNotLeaf` if the account has children.
    pub async fn mark_as_control_account(
        &self,
        account_id: AccountId,
        actor: Option<UserId>,
    ) -> Result<Account, ChartError> {
        let mut chart = self.load_chart().await?;
        if !chart.mark_as_control_account(account_id)? {
            return self.current(&chart, account_id);
        }
        let account = self.save(&chart, account_id).await?;
        info!(account_id = %account_id, "account designated as control account");
        self.emit(DomainEvent::ControlAccountDesignated { account_id }, actor)
            .await;
        Ok(account)
    }

    /// Builds the standard chart: five headers and the catalogue below them.
    ///
    /// Codes that already exist are skipped, so running it twice creates
    /// nothing the second time. Headers are created as system accounts.
    ///
    /// # Errors
    ///
    /// Stops at the first account that cannot be created or saved.
    pub async fn create_standard_chart_of_accounts(
        &self,
        company_id: CompanyId,
        currency: Currency,
        detailed: bool,
        actor: Option<UserId>,
    ) -> Result<StandardChartResult, ChartError> {
        let mut chart = self.load_chart().await?;
        let mut result = StandardChartResult::default();

        for template in standard_accounts(detailed) {
            if chart.get_by_code(template.code).is_some() {
                debug!(code = template.code, "standard account already present");
                result.skipped.push(template.code.to_string());
                continue;
            }
            let parent_id = template
                .parent_code
                .and_then(|code| chart.get_by_code(code))
                .map(Account::id);
            let mut input = NewAccount::new(
                company_id,
                template.code,
                template.name,
                template.account_type,
                currency,
                parent_id,
            );
            if template.parent_code.is_none() {
                input = input.system();
            }

            let id = chart.create(input)?;
            let saved = self.save(&chart, id).await?;
            chart.set_version(id, saved.version())?;
            result.created.push(id);

            self.emit(
                DomainEvent::AccountCreated {
                    account_id: id,
                    code: saved.code().to_string(),
                    account_type: saved.account_type(),
                    parent_id,
                },
                actor,
            )
            .await;
        }

        info!(
            created = result.created.len(),
            skipped = result.skipped.len(),
            detailed,
            %currency,
            "standard chart of accounts created"
        );
        Ok(result)
    }

    /// Checks a proposed or existing account against the stored chart.
    ///
    /// Never fails: a chart that cannot be loaded shows up as an issue.
    pub async fn validate_account_hierarchy(
        &self,
        input: &NewAccount,
        existing: Option<AccountId>,
    ) -> HierarchyValidationReport {
        match self.load_chart().await {
            Ok(chart) => validate_account(&chart, input, existing),
            Err(err) => {
                warn!(error = %err, "hierarchy validation could not load the chart");
                let mut report = HierarchyValidationReport::default();
                report.issue(err.error_code(), err.to_string());
                report.finish()
            }
        }
    }

    /// Executes a reorganization plan move by move.
    ///
    /// The whole plan is checked first; flagged moves are reported and
    /// skipped. The remaining moves run in order, each one renumbering
    /// (if asked) and then re-parenting a single account. A move that fails
    /// leaves the chart as it was before that move and does not stop the
    /// moves after it.
    ///
    /// # Errors
    ///
    /// Returns an error only if the chart cannot be loaded.
    pub async fn reorganize_chart_structure(
        &self,
        plan: &ReorganizationPlan,
        actor: Option<UserId>,
    ) -> Result<ReorganizationResult, ChartError> {
        let mut chart = self.load_chart().await?;
        let mut flagged = validate_plan(&chart, plan);
        let mut result = ReorganizationResult::default();

        for (index, step) in plan.moves.iter().enumerate() {
            if let Some(err) = flagged.remove(&index) {
                warn!(account_id = %step.account_id, code = %err.code, "move rejected by plan check");
                result.errors.push(err);
                continue;
            }

            let mut next = chart.clone();
            match self.apply_move(&mut next, step).await {
                Ok((previous_code, previous_parent, saved)) => {
                    chart = next;

                    let moved = MovedAccount {
                        account_id: step.account_id,
                        previous_parent_id: previous_parent,
                        new_parent_id: step.new_parent_id,
                        previous_code: previous_code
                            .clone()
                            .unwrap_or_else(|| saved.code().to_string()),
                        new_code: saved.code().to_string(),
                    };
                    if let Some(before) = previous_code
                        && before != moved.new_code
                    {
                        self.emit(
                            DomainEvent::CodeChanged {
                                account_id: step.account_id,
                                before,
                                after: moved.new_code.clone(),
                            },
                            actor,
                        )
                        .await;
                    }
                    if previous_parent != step.new_parent_id {
                        self.emit(
                            DomainEvent::ParentChanged {
                                account_id: step.account_id,
                                before: previous_parent,
                                after: step.new_parent_id,
                            },
                            actor,
                        )
                        .await;
                    }
                    debug!(account_id = %step.account_id, "move applied");
                    result.moved_accounts.push(moved);
                }
                Err(err) => {
                    warn!(account_id = %step.account_id, error = %err, "move failed");
                    result.errors.push(BatchItemError::new(
                        step.account_id,
                        err.error_code(),
                        err.to_string(),
                    ));
                }
            }
        }

        result.success = result.errors.is_empty();
        info!(
            moved = result.moved_accounts.len(),
            failed = result.errors.len(),
            "chart reorganized"
        );
        self.emit(
            DomainEvent::ChartReorganized {
                moved: result.moved_accounts.len(),
                failed: result.errors.len(),
            },
            actor,
        )
        .await;
        Ok(result)
    }

    async fn apply_move(
        &self,
        chart: &mut AccountHierarchy,
        step: &AccountMove,
    ) -> Result<(Option<String>, Option<AccountId>, Account), ChartError> {
        let previous_code = match &step.new_code {
            Some(code) => Some(chart.change_code(step.account_id, code)?),
            None => None,
        };
        let previous_parent = chart.set_parent(step.account_id, step.new_parent_id)?;
        let saved = self.save(chart, step.account_id).await?;
        chart.set_version(step.account_id, saved.version())?;
        Ok((previous_code, previous_parent, saved))
    }

    /// Moves every ledger line of `source_id` to `target_id` and
    /// deactivates the source in one repository step.
    ///
    /// Preconditions are checked before anything is written. A repository
    /// failure after that point is reported as `success = false` and leaves
    /// both accounts as they were.
    ///
    /// # Errors
    ///
    /// Returns an error, with no side effects, if the accounts are the same,
    /// unknown, archived, of different type or currency, if the target is
    /// inactive, if the source has active children, or if a system source is
    /// merged without an actor.
    pub async fn merge_accounts(
        &self,
        source_id: AccountId,
        target_id: AccountId,
        effective_date: NaiveDate,
        reason: &str,
        actor: Option<UserId>,
    ) -> Result<MergeResult, ChartError> {
        if source_id == target_id {
            return Err(ChartError::MergeSameAccount(source_id));
        }
        let chart = self.load_chart().await?;
        let source = chart
            .get(source_id)
            .ok_or(ChartError::AccountNotFound(source_id))?;
        let target = chart
            .get(target_id)
            .ok_or(ChartError::AccountNotFound(target_id))?;

        if source.account_type() != target.account_type() {
            return Err(ChartError::MergeTypeMismatch {
                source_type: source.account_type(),
                target_type: target.account_type(),
            });
        }
        if source.currency() != target.currency() {
            return Err(ChartError::MergeCurrencyMismatch {
                source_currency: source.currency(),
                target_currency: target.currency(),
            });
        }
        for account in [source, target] {
            if account.is_archived() {
                return Err(AccountError::Archived(account.id()).into());
            }
        }
        if !target.is_active() {
            return Err(ChartError::MergeTargetInactive(target_id));
        }
        if source.is_system_account() && actor.is_none() {
            return Err(AccountError::SystemAccountRequiresActor(source_id).into());
        }
        let active_children = chart
            .children_of(source_id)
            .into_iter()
            .filter(|c| c.is_active())
            .count();
        if active_children > 0 {
            return Err(AccountError::ActiveChildren {
                account: source_id,
                count: active_children,
            }
            .into());
        }

        let source_balance_before = self.repo.calculate_balance(source_id, None).await?;
        let target_balance_before = self.repo.calculate_balance(target_id, None).await?;
        let mut result = MergeResult {
            success: false,
            source_id,
            target_id,
            source_balance_before,
            target_balance_before,
            target_balance_after: None,
            reassigned_count: 0,
            failure_reason: None,
        };

        match self.complete_merge(source_id, target_id, effective_date, actor).await {
            Ok((reassigned, target_after)) => {
                result.success = true;
                result.reassigned_count = reassigned;
                result.target_balance_after = target_after;
            }
            Err(err) => {
                warn!(
                    source = %source_id,
                    target = %target_id,
                    error = %err,
                    "account merge failed"
                );
                result.failure_reason = Some(err.to_string());
                return Ok(result);
            }
        }

        info!(
            source = %source_id,
            target = %target_id,
            reassigned = result.reassigned_count,
            "accounts merged"
        );
        self.emit_activation(source_id, false, actor).await;
        self.emit(
            DomainEvent::AccountsMerged {
                source_id,
                target_id,
                reassigned: result.reassigned_count,
                effective_date,
                reason: reason.to_string(),
            },
            actor,
        )
        .await;
        Ok(result)
    }

    async fn complete_merge(
        &self,
        source_id: AccountId,
        target_id: AccountId,
        effective_date: NaiveDate,
        actor: Option<UserId>,
    ) -> Result<(u64, Option<Money>), ChartError> {
        let mut chart = self.load_chart().await?;
        let currency = chart
            .get(source_id)
            .ok_or(ChartError::AccountNotFound(source_id))?
            .currency();
        chart.update_balance(source_id, Money::zero(currency))?;
        chart.deactivate(source_id, actor)?;
        let retired = chart
            .get(source_id)
            .cloned()
            .ok_or(ChartError::AccountNotFound(source_id))?;

        let reassigned = self
            .repo
            .reassign_transactions(retired, target_id, effective_date)
            .await?;

        let target_after = match self.repo.calculate_balance(target_id, None).await {
            Ok(balance) => Some(balance),
            Err(err) => {
                warn!(target = %target_id, error = %err, "merged balance unavailable");
                None
            }
        };
        Ok((reassigned, target_after))
    }

    /// Archives inactive, zero-balance accounts idle for at least
    /// `min_inactive_days`.
    ///
    /// A dry run only reports the candidates. Otherwise each candidate is
    /// re-checked for a zero balance right before it is archived; failures
    /// are collected and do not stop the run.
    ///
    /// # Errors
    ///
    /// Returns `InvalidThreshold` for a negative threshold, or a repository
    /// error if the inactive accounts cannot be listed.
    pub async fn archive_unused_accounts(
        &self,
        cutoff: NaiveDate,
        min_inactive_days: i64,
        dry_run: bool,
        actor: Option<UserId>,
    ) -> Result<ArchiveResult, ChartError> {
        if min_inactive_days < 0 {
            return Err(ChartError::InvalidThreshold(min_inactive_days));
        }

        let mut result = ArchiveResult {
            dry_run,
            candidates: Vec::new(),
            archived: Vec::new(),
            errors: Vec::new(),
        };

        let mut inactive = self.repo.find_inactive_accounts_since(cutoff).await?;
        inactive.sort_by(|a, b| a.code().cmp(b.code()));
        for account in inactive {
            if account.is_archived() || account.is_active() {
                continue;
            }
            match self.candidate(&account, min_inactive_days).await {
                Ok(Some(candidate)) => result.candidates.push(candidate),
                Ok(None) => {}
                Err(err) => result.errors.push(BatchItemError::new(
                    account.id(),
                    err.error_code(),
                    err.to_string(),
                )),
            }
        }

        if dry_run {
            info!(
                candidates = result.candidates.len(),
                %cutoff,
                "archive dry run"
            );
            return Ok(result);
        }

        for candidate in &result.candidates {
            match self.archive_one(candidate.account_id).await {
                Ok(archived_at) => {
                    result.archived.push(candidate.account_id);
                    self.emit(
                        DomainEvent::AccountArchived {
                            account_id: candidate.account_id,
                            archived_at,
                        },
                        actor,
                    )
                    .await;
                }
                Err(err) => {
                    warn!(account_id = %candidate.account_id, error = %err, "archive failed");
                    result.errors.push(BatchItemError::new(
                        candidate.account_id,
                        err.error_code(),
                        err.to_string(),
                    ));
                }
            }
        }

        info!(
            candidates = result.candidates.len(),
            archived = result.archived.len(),
            failed = result.errors.len(),
            "unused accounts archived"
        );
        Ok(result)
    }

    async fn candidate(
        &self,
        account: &Account,
        min_inactive_days: i64,
    ) -> Result<Option<ArchiveCandidate>, ChartError> {
        let balance = self.repo.calculate_balance(account.id(), None).await?;
        if !balance.is_zero() || !account.balance().is_zero() {
            return Ok(None);
        }
        let days_inactive = self.repo.get_days_since_last_activity(account.id()).await?;
        if days_inactive < min_inactive_days {
            return Ok(None);
        }
        Ok(Some(ArchiveCandidate {
            account_id: account.id(),
            code: account.code().to_string(),
            name: account.name().to_string(),
            days_inactive,
        }))
    }

    async fn archive_one(
        &self,
        account_id: AccountId,
    ) -> Result<DateTime<Utc>, ChartError> {
        let mut account = self
            .repo
            .find_by_id(account_id)
            .await?
            .ok_or(ChartError::AccountNotFound(account_id))?;
        let balance = self.repo.calculate_balance(account_id, None).await?;
        if !balance.is_zero() {
            return Err(AccountError::NonZeroBalance {
                account: account_id,
                balance,
            }
            .into());
        }
        let archived_at = Utc::now();
        account.archive(archived_at)?;
        self.repo.save(account).await?;
        Ok(archived_at)
    }

    /// Trial balance from posted lines dated on or before `as_of`.
    ///
    /// Each balance lands in the debit or the credit column according to
    /// the account's normal side and the sign of the balance. Totals are
    /// kept per currency.
    ///
    /// # Errors
    ///
    /// Returns a repository error or an arithmetic overflow.
    pub async fn calculate_trial_balance(
        &self,
        as_of: NaiveDate,
        currency: Option<Currency>,
        include_zero: bool,
    ) -> Result<TrialBalance, ChartError> {
        let mut accounts = match currency {
            Some(currency) => self.repo.find_by_currency(currency).await?,
            None => self.repo.find_all().await?,
        };
        accounts.sort_by(|a, b| a.code().cmp(b.code()));

        let mut entries = Vec::with_capacity(accounts.len());
        let mut columns: BTreeMap<Currency, (Decimal, Decimal)> = BTreeMap::new();
        for account in accounts {
            let balance = self.repo.calculate_balance(account.id(), Some(as_of)).await?;
            if balance.is_zero() && !include_zero {
                continue;
            }
            let (debit, credit) = classify(account.normal_balance(), balance.amount);

            let totals = columns
                .entry(account.currency())
                .or_insert((Decimal::ZERO, Decimal::ZERO));
            totals.0 = totals.0.checked_add(debit).ok_or(MoneyError::Overflow)?;
            totals.1 = totals.1.checked_add(credit).ok_or(MoneyError::Overflow)?;

            entries.push(TrialBalanceEntry {
                account_id: account.id(),
                code: account.code().to_string(),
                name: account.name().to_string(),
                account_type: account.account_type(),
                currency: account.currency(),
                debit,
                credit,
            });
        }

        let totals: Vec<TrialBalanceTotals> = columns
            .into_iter()
            .map(|(currency, (total_debits, total_credits))| TrialBalanceTotals {
                currency,
                total_debits,
                total_credits,
                is_balanced: total_debits == total_credits,
            })
            .collect();
        let is_balanced = totals.iter().all(|t| t.is_balanced);
        if !is_balanced {
            warn!(%as_of, "trial balance does not balance");
        }
        debug!(entries = entries.len(), %as_of, "trial balance calculated");

        Ok(TrialBalance {
            as_of,
            currency,
            entries,
            totals,
            is_balanced,
        })
    }

    fn current(&self, chart: &AccountHierarchy, id: AccountId) -> Result<Account, ChartError> {
        chart.get(id).cloned().ok_or(ChartError::AccountNotFound(id))
    }

    async fn save(&self, chart: &AccountHierarchy, id: AccountId) -> Result<Account, ChartError> {
        let account = self.current(chart, id)?;
        Ok(self.repo.save(account).await?)
    }

    async fn emit_activation(&self, account_id: AccountId, active: bool, actor: Option<UserId>) {
        self.emit(
            DomainEvent::ActivationChanged {
                account_id,
                before: !active,
                after: active,
            },
            actor,
        )
        .await;
    }

    async fn emit(&self, event: DomainEvent, actor: Option<UserId>) {
        let name = event.name();
        if let Err(err) = self.audit.record(AuditRecord::new(event, actor)).await {
            warn!(event = name, error = %err, "failed to record audit event");
        }
    }
}

/// Splits a balance signed by the normal side into debit and credit columns.
fn classify(normal: NormalBalance, amount: Decimal) -> (Decimal, Decimal) {
    match (normal, amount.is_sign_negative()) {
        (NormalBalance::Debit, false) => (amount, Decimal::ZERO),
        (NormalBalance::Debit, true) => (Decimal::ZERO, amount.abs()),
        (NormalBalance::Credit, false) => (Decimal::ZERO, amount),
        (NormalBalance::Credit, true) => (amount.abs(), Decimal::ZERO),
    }
}
