//! Account classification: categories, normal balance sides and the
//! finer account type catalogue with its parent compatibility table.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Side on which increases to an account are recorded.
///
/// - Asset/Expense: balance += debit - credit (debit-normal)
/// - Liability/Equity/Revenue: balance += credit - debit (credit-normal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalBalance {
    /// Debit-normal accounts (Asset, Expense).
    Debit,
    /// Credit-normal accounts (Liability, Equity, Revenue).
    Credit,
}

impl NormalBalance {
    /// Calculates the balance change for a debit/credit pair.
    #[must_use]
    pub fn balance_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Debit => debit - credit,
            Self::Credit => credit - debit,
        }
    }
}

/// Top-level accounting category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountCategory {
    /// Resources owned.
    Asset,
    /// Obligations owed.
    Liability,
    /// Owners' residual interest.
    Equity,
    /// Income earned.
    Revenue,
    /// Costs incurred.
    Expense,
}

impl AccountCategory {
    /// All categories in chart order.
    pub const ALL: [Self; 5] = [
        Self::Asset,
        Self::Liability,
        Self::Equity,
        Self::Revenue,
        Self::Expense,
    ];

    /// Returns the normal balance side for the category.
    #[must_use]
    pub const fn normal_balance(self) -> NormalBalance {
        match self {
            Self::Asset | Self::Expense => NormalBalance::Debit,
            Self::Liability | Self::Equity | Self::Revenue => NormalBalance::Credit,
        }
    }

    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for AccountCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fine-grained account type.
///
/// Each type belongs to exactly one [`AccountCategory`]. The header types
/// (`Assets`, `Liabilities`, `Equity`, `Revenue`, `Expenses`) are the only
/// ones allowed at the root of the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    // ---- Asset ----
    /// Asset header.
    Assets,
    /// Current assets group.
    CurrentAsset,
    /// Cash on hand.
    Cash,
    /// Bank accounts.
    Bank,
    /// Trade receivables.
    AccountsReceivable,
    /// Stock held for sale.
    Inventory,
    /// Prepayments.
    PrepaidExpense,
    /// Property, plant and equipment.
    FixedAsset,
    /// Contra-asset for depreciation.
    AccumulatedDepreciation,
    /// Intangible assets.
    IntangibleAsset,
    /// Other assets.
    OtherAsset,
    // ---- Liability ----
    /// Liability header.
    Liabilities,
    /// Current liabilities group.
    CurrentLiability,
    /// Trade payables.
    AccountsPayable,
    /// Accrued liabilities.
    AccruedLiability,
    /// Taxes payable.
    TaxPayable,
    /// Long-term liabilities.
    LongTermLiability,
    // ---- Equity ----
    /// Equity header.
    Equity,
    /// Share capital.
    ShareCapital,
    /// Retained earnings.
    RetainedEarnings,
    /// Other equity.
    OtherEquity,
    // ---- Revenue ----
    /// Revenue header.
    Revenue,
    /// Operating revenue.
    OperatingRevenue,
    /// Non-operating income.
    OtherIncome,
    // ---- Expense ----
    /// Expense header.
    Expenses,
    /// Cost of goods sold.
    CostOfGoodsSold,
    /// Operating expenses.
    OperatingExpense,
    /// Payroll.
    PayrollExpense,
    /// Depreciation expense.
    DepreciationExpense,
    /// Other expenses.
    OtherExpense,
}

impl AccountType {
    /// Every account type, grouped by category.
    pub const ALL: [Self; 30] = [
        Self::Assets,
        Self::CurrentAsset,
        Self::Cash,
        Self::Bank,
        Self::AccountsReceivable,
        Self::Inventory,
        Self::PrepaidExpense,
        Self::FixedAsset,
        Self::AccumulatedDepreciation,
        Self::IntangibleAsset,
        Self::OtherAsset,
        Self::Liabilities,
        Self::CurrentLiability,
        Self::AccountsPayable,
        Self::AccruedLiability,
        Self::TaxPayable,
        Self::LongTermLiability,
        Self::Equity,
        Self::ShareCapital,
        Self::RetainedEarnings,
        Self::OtherEquity,
        Self::Revenue,
        Self::OperatingRevenue,
        Self::OtherIncome,
        Self::Expenses,
        Self::CostOfGoodsSold,
        Self::OperatingExpense,
        Self::PayrollExpense,
        Self::DepreciationExpense,
        Self::OtherExpense,
    ];

    /// Returns the snake_case name, matching the serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Assets => "assets",
            Self::CurrentAsset => "current_asset",
            Self::Cash => "cash",
            Self::Bank => "bank",
            Self::AccountsReceivable => "accounts_receivable",
            Self::Inventory => "inventory",
            Self::PrepaidExpense => "prepaid_expense",
            Self::FixedAsset => "fixed_asset",
            Self::AccumulatedDepreciation => "accumulated_depreciation",
            Self::IntangibleAsset => "intangible_asset",
            Self::OtherAsset => "other_asset",
            Self::Liabilities => "liabilities",
            Self::CurrentLiability => "current_liability",
            Self::AccountsPayable => "accounts_payable",
            Self::AccruedLiability => "accrued_liability",
            Self::TaxPayable => "tax_payable",
            Self::LongTermLiability => "long_term_liability",
            Self::Equity => "equity",
            Self::ShareCapital => "share_capital",
            Self::RetainedEarnings => "retained_earnings",
            Self::OtherEquity => "other_equity",
            Self::Revenue => "revenue",
            Self::OperatingRevenue => "operating_revenue",
            Self::OtherIncome => "other_income",
            Self::Expenses => "expenses",
            Self::CostOfGoodsSold => "cost_of_goods_sold",
            Self::OperatingExpense => "operating_expense",
            Self::PayrollExpense => "payroll_expense",
            Self::DepreciationExpense => "depreciation_expense",
            Self::OtherExpense => "other_expense",
        }
    }

    /// Returns the category this type belongs to.
    #[must_use]
    pub const fn category(self) -> AccountCategory {
        match self {
            Self::Assets
            | Self::CurrentAsset
            | Self::Cash
            | Self::Bank
            | Self::AccountsReceivable
            | Self::Inventory
            | Self::PrepaidExpense
            | Self::FixedAsset
            | Self::AccumulatedDepreciation
            | Self::IntangibleAsset
            | Self::OtherAsset => AccountCategory::Asset,
            Self::Liabilities
            | Self::CurrentLiability
            | Self::AccountsPayable
            | Self::AccruedLiability
            | Self::TaxPayable
            | Self::LongTermLiability => AccountCategory::Liability,
            Self::Equity | Self::ShareCapital | Self::RetainedEarnings | Self::OtherEquity => {
                AccountCategory::Equity
            }
            Self::Revenue | Self::OperatingRevenue | Self::OtherIncome => AccountCategory::Revenue,
            Self::Expenses
            | Self::CostOfGoodsSold
            | Self::OperatingExpense
            | Self::PayrollExpense
            | Self::DepreciationExpense
            | Self::OtherExpense => AccountCategory::Expense,
        }
    }

    /// Returns the normal balance side of the type's category.
    #[must_use]
    pub const fn normal_balance(self) -> NormalBalance {
        self.category().normal_balance()
    }

    /// Returns true for the five category header types.
    #[must_use]
    pub const fn is_header(self) -> bool {
        matches!(
            self,
            Self::Assets | Self::Liabilities | Self::Equity | Self::Revenue | Self::Expenses
        )
    }

    /// Parent types this type may be nested under.
    ///
    /// Anything not listed here is rejected; headers only live at the root.
    #[must_use]
    pub const fn allowed_parents(self) -> &'static [Self] {
        match self {
            Self::Assets
            | Self::Liabilities
            | Self::Equity
            | Self::Revenue
            | Self::Expenses => &[],
            Self::CurrentAsset => &[Self::Assets, Self::CurrentAsset],
            Self::Cash => &[Self::Assets, Self::CurrentAsset, Self::Cash],
            Self::Bank => &[Self::CurrentAsset, Self::Cash, Self::Bank],
            Self::AccountsReceivable => &[Self::CurrentAsset, Self::AccountsReceivable],
            Self::Inventory => &[Self::CurrentAsset, Self::Inventory],
            Self::PrepaidExpense => &[Self::CurrentAsset, Self::PrepaidExpense],
            Self::FixedAsset => &[Self::Assets, Self::FixedAsset],
            Self::AccumulatedDepreciation => &[Self::FixedAsset, Self::AccumulatedDepreciation],
            Self::IntangibleAsset => &[Self::Assets, Self::IntangibleAsset],
            Self::OtherAsset => &[Self::Assets, Self::OtherAsset],
            Self::CurrentLiability => &[Self::Liabilities, Self::CurrentLiability],
            Self::AccountsPayable => &[Self::CurrentLiability, Self::AccountsPayable],
            Self::AccruedLiability => &[Self::CurrentLiability, Self::AccruedLiability],
            Self::TaxPayable => &[Self::CurrentLiability, Self::TaxPayable],
            Self::LongTermLiability => &[Self::Liabilities, Self::LongTermLiability],
            Self::ShareCapital => &[Self::Equity, Self::ShareCapital],
            Self::RetainedEarnings => &[Self::Equity],
            Self::OtherEquity => &[Self::Equity, Self::OtherEquity],
            Self::OperatingRevenue => &[Self::Revenue, Self::OperatingRevenue],
            Self::OtherIncome => &[Self::Revenue, Self::OtherIncome],
            Self::CostOfGoodsSold => &[Self::Expenses, Self::CostOfGoodsSold],
            Self::OperatingExpense => &[Self::Expenses, Self::OperatingExpense],
            Self::PayrollExpense => &[Self::Expenses, Self::OperatingExpense, Self::PayrollExpense],
            Self::DepreciationExpense => &[
                Self::Expenses,
                Self::OperatingExpense,
                Self::DepreciationExpense,
            ],
            Self::OtherExpense => &[Self::Expenses, Self::OtherExpense],
        }
    }

    /// Returns true if an account of this type may have `parent` as its parent.
    #[must_use]
    pub fn can_be_child_of(self, parent: Self) -> bool {
        self.allowed_parents().contains(&parent)
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(AccountCategory::Asset, NormalBalance::Debit)]
    #[case(AccountCategory::Expense, NormalBalance::Debit)]
    #[case(AccountCategory::Liability, NormalBalance::Credit)]
    #[case(AccountCategory::Equity, NormalBalance::Credit)]
    #[case(AccountCategory::Revenue, NormalBalance::Credit)]
    fn test_normal_balance_by_category(
        #[case] category: AccountCategory,
        #[case] expected: NormalBalance,
    ) {
        assert_eq!(category.normal_balance(), expected);
    }

    #[test]
    fn test_balance_change_by_side() {
        assert_eq!(NormalBalance::Debit.balance_change(dec!(100), dec!(30)), dec!(70));
        assert_eq!(NormalBalance::Credit.balance_change(dec!(100), dec!(30)), dec!(-70));
    }

    #[test]
    fn test_allowed_parents_stay_within_category() {
        for child in AccountType::ALL {
            for parent in child.allowed_parents() {
                assert_eq!(
                    child.category(),
                    parent.category(),
                    "{child:?} lists cross-category parent {parent:?}"
                );
            }
        }
    }

    #[test]
    fn test_headers_are_root_only() {
        for ty in AccountType::ALL.into_iter().filter(|t| t.is_header()) {
            assert!(ty.allowed_parents().is_empty());
            for parent in AccountType::ALL {
                assert!(!ty.can_be_child_of(parent));
            }
        }
    }

    #[test]
    fn test_every_non_header_has_a_parent_entry() {
        for ty in AccountType::ALL.into_iter().filter(|t| !t.is_header()) {
            assert!(!ty.allowed_parents().is_empty(), "{ty:?} has no parents");
        }
    }

    #[test]
    fn test_unlisted_combination_is_rejected() {
        assert!(AccountType::Cash.can_be_child_of(AccountType::CurrentAsset));
        assert!(!AccountType::Cash.can_be_child_of(AccountType::FixedAsset));
        assert!(!AccountType::Cash.can_be_child_of(AccountType::Liabilities));
    }

    #[test]
    fn test_display_uses_snake_case() {
        assert_eq!(AccountType::AccountsReceivable.to_string(), "accounts_receivable");
        assert_eq!(AccountCategory::Revenue.to_string(), "revenue");
    }

    #[test]
    fn test_names_match_serialized_form() {
        for account_type in AccountType::ALL {
            let json = serde_json::to_string(&account_type).unwrap();
            assert_eq!(json, format!("\"{}\"", account_type.as_str()));
        }
    }
}
