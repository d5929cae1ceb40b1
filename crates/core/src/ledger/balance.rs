//! Account balance calculations.
//!
//! Balances follow the normal side of the account type:
//! - Asset/Expense: balance += debit - credit (debit-normal)
//! - Liability/Equity/Revenue: balance += credit - debit (credit-normal)

use chartwell_shared::types::{AccountId, Currency, Money, MoneyError};
use serde::{Deserialize, Serialize};

use super::line::TransactionLine;
use crate::accounts::NormalBalance;

/// Net change a posted entry applies to one account, already signed by the
/// account's normal side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceChange {
    /// The account.
    pub account_id: AccountId,
    /// Signed change in the account currency.
    pub change: Money,
    /// Account version the entry was validated against.
    pub account_version: i64,
}

/// Debit and credit totals of an account, accumulated line by line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// The account ID.
    pub account_id: AccountId,
    /// Total debit amount.
    pub debit_total: Money,
    /// Total credit amount.
    pub credit_total: Money,
}

impl AccountBalance {
    /// Creates an empty balance.
    #[must_use]
    pub fn new(account_id: AccountId, currency: Currency) -> Self {
        Self {
            account_id,
            debit_total: Money::zero(currency),
            credit_total: Money::zero(currency),
        }
    }

    /// Adds a line's debit and credit.
    ///
    /// # Errors
    ///
    /// Fails if the line uses a different currency.
    pub fn add_line(&mut self, line: &TransactionLine) -> Result<(), MoneyError> {
        self.debit_total = self.debit_total.checked_add(&line.debit())?;
        self.credit_total = self.credit_total.checked_add(&line.credit())?;
        Ok(())
    }

    /// Net balance on the given normal side.
    #[must_use]
    pub fn net(&self, side: NormalBalance) -> Money {
        Money::new(
            side.balance_change(self.debit_total.amount, self.credit_total.amount),
            self.debit_total.currency,
        )
    }
}

/// Running balance information for a ledger line.
///
/// - `account_version`: monotonically increasing counter
/// - `previous_balance`: balance before this line
/// - `current_balance`: balance after this line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningBalance {
    /// Account version (monotonically increasing).
    pub account_version: i64,
    /// Balance before this line.
    pub previous_balance: Money,
    /// Balance after this line.
    pub current_balance: Money,
}

impl RunningBalance {
    /// Running balance of the first change on an account.
    #[must_use]
    pub fn first_entry(balance_change: Money) -> Self {
        Self {
            account_version: 1,
            previous_balance: Money::zero(balance_change.currency),
            current_balance: balance_change,
        }
    }

    /// Running balance following `previous`.
    ///
    /// `current_balance[N] = previous_balance[N] + change` and
    /// `previous_balance[N] = current_balance[N-1]`.
    ///
    /// # Errors
    ///
    /// Fails on currency mismatch or overflow.
    pub fn next_entry(previous: &Self, balance_change: Money) -> Result<Self, MoneyError> {
        Ok(Self {
            account_version: previous.account_version + 1,
            previous_balance: previous.current_balance,
            current_balance: previous.current_balance.checked_add(&balance_change)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn usd(amount: Decimal) -> Money {
        Money::new(amount, Currency::USD)
    }

    #[test]
    fn test_account_balance_net_by_side() {
        let account = AccountId::new();
        let mut balance = AccountBalance::new(account, Currency::USD);
        balance
            .add_line(&TransactionLine::create_debit(1, account, usd(dec!(100)), None).unwrap())
            .unwrap();
        balance
            .add_line(&TransactionLine::create_credit(2, account, usd(dec!(30)), None).unwrap())
            .unwrap();
        assert_eq!(balance.net(NormalBalance::Debit), usd(dec!(70)));
        assert_eq!(balance.net(NormalBalance::Credit), usd(dec!(-70)));
    }

    #[test]
    fn test_account_balance_rejects_other_currency() {
        let account = AccountId::new();
        let mut balance = AccountBalance::new(account, Currency::USD);
        let line =
            TransactionLine::create_debit(1, account, Money::new(dec!(1), Currency::EUR), None)
                .unwrap();
        assert!(balance.add_line(&line).is_err());
    }

    #[test]
    fn test_running_balance_first_entry() {
        let rb = RunningBalance::first_entry(usd(dec!(100)));
        assert_eq!(rb.account_version, 1);
        assert!(rb.previous_balance.is_zero());
        assert_eq!(rb.current_balance, usd(dec!(100)));
    }

    fn balance_change_strategy() -> impl Strategy<Value = Decimal> {
        (-1_000_000i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_running_balance_chain_is_consistent(
            changes in prop::collection::vec(balance_change_strategy(), 1..30)
        ) {
            let mut current = RunningBalance::first_entry(usd(changes[0]));
            let mut expected = changes[0];

            for change in &changes[1..] {
                let next = RunningBalance::next_entry(&current, usd(*change)).unwrap();
                prop_assert_eq!(next.previous_balance, current.current_balance);
                prop_assert_eq!(next.account_version, current.account_version + 1);
                expected += *change;
                prop_assert_eq!(next.current_balance.amount, expected);
                current = next;
            }
        }
    }
}
