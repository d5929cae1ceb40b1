//! Transaction lines (debits and credits).

use chartwell_shared::types::{AccountId, Money, TransactionLineId};
use serde::{Deserialize, Serialize};

use super::error::LedgerError;

/// Side of a transaction line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySide {
    /// Debit line.
    Debit,
    /// Credit line.
    Credit,
}

impl EntrySide {
    /// The other side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Debit => Self::Credit,
            Self::Credit => Self::Debit,
        }
    }
}

/// A single line of a journal entry.
///
/// Exactly one of `debit` and `credit` is positive; the other is a zero in
/// the same currency. The factories are the only way to build a line, so
/// the invariant holds by construction. Lines are never edited; a
/// reversing line supersedes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionLine {
    id: TransactionLineId,
    line_number: u32,
    account_id: AccountId,
    debit: Money,
    credit: Money,
    description: Option<String>,
}

impl TransactionLine {
    /// Creates a debit line.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is zero or negative.
    pub fn create_debit(
        line_number: u32,
        account_id: AccountId,
        amount: Money,
        description: Option<String>,
    ) -> Result<Self, LedgerError> {
        Self::create(EntrySide::Debit, line_number, account_id, amount, description)
    }

    /// Creates a credit line.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is zero or negative.
    pub fn create_credit(
        line_number: u32,
        account_id: AccountId,
        amount: Money,
        description: Option<String>,
    ) -> Result<Self, LedgerError> {
        Self::create(EntrySide::Credit, line_number, account_id, amount, description)
    }

    fn create(
        side: EntrySide,
        line_number: u32,
        account_id: AccountId,
        amount: Money,
        description: Option<String>,
    ) -> Result<Self, LedgerError> {
        if amount.is_zero() {
            return Err(LedgerError::ZeroAmount);
        }
        if amount.is_negative() {
            return Err(LedgerError::NegativeAmount);
        }
        let zero = Money::zero(amount.currency);
        let (debit, credit) = match side {
            EntrySide::Debit => (amount, zero),
            EntrySide::Credit => (zero, amount),
        };
        Ok(Self {
            id: TransactionLineId::new(),
            line_number,
            account_id,
            debit,
            credit,
            description,
        })
    }

    /// Line id.
    #[must_use]
    pub fn id(&self) -> TransactionLineId {
        self.id
    }

    /// One-based position within the entry.
    #[must_use]
    pub fn line_number(&self) -> u32 {
        self.line_number
    }

    /// Target account.
    #[must_use]
    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    /// Debit amount, zero on credit lines.
    #[must_use]
    pub fn debit(&self) -> Money {
        self.debit
    }

    /// Credit amount, zero on debit lines.
    #[must_use]
    pub fn credit(&self) -> Money {
        self.credit
    }

    /// Optional memo.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Which side carries the amount.
    #[must_use]
    pub fn side(&self) -> EntrySide {
        if self.debit.is_zero() {
            EntrySide::Credit
        } else {
            EntrySide::Debit
        }
    }

    /// The positive amount on the populated side.
    #[must_use]
    pub fn amount(&self) -> Money {
        match self.side() {
            EntrySide::Debit => self.debit,
            EntrySide::Credit => self.credit,
        }
    }

    /// Debit minus credit.
    #[must_use]
    pub fn signed_amount(&self) -> Money {
        match self.side() {
            EntrySide::Debit => self.debit,
            EntrySide::Credit => self.credit.negate(),
        }
    }

    /// Builds the compensating line with the sides swapped.
    #[must_use]
    pub fn reversed(&self, line_number: u32) -> Self {
        Self {
            id: TransactionLineId::new(),
            line_number,
            account_id: self.account_id,
            debit: self.credit,
            credit: self.debit,
            description: self.description.clone(),
        }
    }

    /// Points the line at another account; used when accounts are merged.
    #[must_use]
    pub fn reassigned_to(mut self, account_id: AccountId) -> Self {
        self.account_id = account_id;
        self
    }
}
