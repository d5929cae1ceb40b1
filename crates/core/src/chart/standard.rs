//! Standard chart of accounts catalogue.
//!
//! Entries are listed parents first, so creating them in order always
//! finds the parent already in place.

use crate::accounts::AccountType;
use crate::accounts::AccountType as T;

/// One catalogue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardAccount {
    /// Account code.
    pub code: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Account type.
    pub account_type: AccountType,
    /// Parent code, `None` for the five headers.
    pub parent_code: Option<&'static str>,
    /// Created only for the detailed tier.
    pub detailed_only: bool,
}

const fn entry(
    code: &'static str,
    name: &'static str,
    account_type: AccountType,
    parent_code: Option<&'static str>,
    detailed_only: bool,
) -> StandardAccount {
    StandardAccount {
        code,
        name,
        account_type,
        parent_code,
        detailed_only,
    }
}

/// The full catalogue.
pub const STANDARD_CHART: &[StandardAccount] = &[
    // Headers
    entry("1000", "Assets", T::Assets, None, false),
    entry("2000", "Liabilities", T::Liabilities, None, false),
    entry("3000", "Equity", T::Equity, None, false),
    entry("4000", "Revenue", T::Revenue, None, false),
    entry("5000", "Expenses", T::Expenses, None, false),
    // Assets
    entry("1100", "Current Assets", T::CurrentAsset, Some("1000"), false),
    entry("1110", "Cash", T::Cash, Some("1100"), false),
    entry("1120", "Bank", T::Bank, Some("1100"), false),
    entry("1130", "Accounts Receivable", T::AccountsReceivable, Some("1100"), false),
    entry("1140", "Inventory", T::Inventory, Some("1100"), false),
    entry("1150", "Prepaid Expenses", T::PrepaidExpense, Some("1100"), false),
    entry("1500", "Fixed Assets", T::FixedAsset, Some("1000"), false),
    entry("1510", "Equipment", T::FixedAsset, Some("1500"), true),
    entry("1520", "Buildings", T::FixedAsset, Some("1500"), true),
    entry("1590", "Accumulated Depreciation", T::AccumulatedDepreciation, Some("1500"), false),
    entry("1800", "Intangible Assets", T::IntangibleAsset, Some("1000"), true),
    // Liabilities
    entry("2100", "Current Liabilities", T::CurrentLiability, Some("2000"), false),
    entry("2110", "Accounts Payable", T::AccountsPayable, Some("2100"), false),
    entry("2120", "Accrued Liabilities", T::AccruedLiability, Some("2100"), false),
    entry("2130", "Taxes Payable", T::TaxPayable, Some("2100"), false),
    entry("2500", "Long-term Liabilities", T::LongTermLiability, Some("2000"), false),
    entry("2510", "Bank Loans", T::LongTermLiability, Some("2500"), true),
    // Equity
    entry("3100", "Share Capital", T::ShareCapital, Some("3000"), false),
    entry("3200", "Retained Earnings", T::RetainedEarnings, Some("3000"), false),
    entry("3300", "Other Equity", T::OtherEquity, Some("3000"), true),
    // Revenue
    entry("4100", "Operating Revenue", T::OperatingRevenue, Some("4000"), false),
    entry("4110", "Product Sales", T::OperatingRevenue, Some("4100"), true),
    entry("4120", "Service Revenue", T::OperatingRevenue, Some("4100"), true),
    entry("4900", "Other Income", T::OtherIncome, Some("4000"), false),
    // Expenses
    entry("5100", "Cost of Goods Sold", T::CostOfGoodsSold, Some("5000"), false),
    entry("5200", "Operating Expenses", T::OperatingExpense, Some("5000"), false),
    entry("5210", "Salaries and Wages", T::PayrollExpense, Some("5200"), false),
    entry("5220", "Rent", T::OperatingExpense, Some("5200"), true),
    entry("5230", "Utilities", T::OperatingExpense, Some("5200"), true),
    entry("5240", "Depreciation", T::DepreciationExpense, Some("5200"), false),
    entry("5900", "Other Expenses", T::OtherExpense, Some("5000"), false),
];

/// Catalogue entries for the requested tier, parents first.
pub fn standard_accounts(detailed: bool) -> impl Iterator<Item = &'static StandardAccount> {
    STANDARD_CHART
        .iter()
        .filter(move |a| detailed || !a.detailed_only)
}
