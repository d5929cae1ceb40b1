//! Operation types carried by journal entries.
//!
//! Fiscal period states gate postings by the class of the operation, not by
//! the concrete type, so new operation types only need a class assignment.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse classification used by period posting rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationClass {
    /// Day-to-day business transactions.
    Regular,
    /// Corrections and accruals allowed under soft or hard close.
    Adjustment,
    /// Entries booked on request of the auditors.
    Audit,
    /// Year-end closing entries.
    YearEnd,
    /// Corrections of an earlier, already closed period.
    PriorPeriod,
}

/// Business operation that produced a journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    /// General journal entry.
    Journal,
    /// Sales invoice.
    Invoice,
    /// Vendor bill.
    Bill,
    /// Payment (incoming or outgoing).
    Payment,
    /// Transfer between accounts.
    Transfer,
    /// Expense claim.
    Expense,
    /// Opening balance entry.
    OpeningBalance,
    /// Manual adjustment.
    Adjustment,
    /// Period-end accrual.
    Accrual,
    /// Reclassification between accounts.
    Reclassification,
    /// Adjustment requested by auditors.
    AuditAdjustment,
    /// Year-end closing entry.
    YearEndClosing,
    /// Correction of a prior period.
    PriorPeriodCorrection,
    /// Reversal of a posted entry.
    Reversal,
}

impl OperationType {
    /// Every operation type.
    pub const ALL: [Self; 14] = [
        Self::Journal,
        Self::Invoice,
        Self::Bill,
        Self::Payment,
        Self::Transfer,
        Self::Expense,
        Self::OpeningBalance,
        Self::Adjustment,
        Self::Accrual,
        Self::Reclassification,
        Self::AuditAdjustment,
        Self::YearEndClosing,
        Self::PriorPeriodCorrection,
        Self::Reversal,
    ];

    /// Class used by fiscal period posting rules.
    #[must_use]
    pub const fn class(self) -> OperationClass {
        match self {
            Self::Journal
            | Self::Invoice
            | Self::Bill
            | Self::Payment
            | Self::Transfer
            | Self::Expense
            | Self::OpeningBalance => OperationClass::Regular,
            Self::Adjustment | Self::Accrual | Self::Reclassification | Self::Reversal => {
                OperationClass::Adjustment
            }
            Self::AuditAdjustment => OperationClass::Audit,
            Self::YearEndClosing => OperationClass::YearEnd,
            Self::PriorPeriodCorrection => OperationClass::PriorPeriod,
        }
    }

    /// True for anything that is not a regular business transaction.
    #[must_use]
    pub const fn is_adjustment(self) -> bool {
        !matches!(self.class(), OperationClass::Regular)
    }

    /// Snake-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Journal => "journal",
            Self::Invoice => "invoice",
            Self::Bill => "bill",
            Self::Payment => "payment",
            Self::Transfer => "transfer",
            Self::Expense => "expense",
            Self::OpeningBalance => "opening_balance",
            Self::Adjustment => "adjustment",
            Self::Accrual => "accrual",
            Self::Reclassification => "reclassification",
            Self::AuditAdjustment => "audit_adjustment",
            Self::YearEndClosing => "year_end_closing",
            Self::PriorPeriodCorrection => "prior_period_correction",
            Self::Reversal => "reversal",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(OperationType::Invoice, OperationClass::Regular)]
    #[case(OperationType::OpeningBalance, OperationClass::Regular)]
    #[case(OperationType::Accrual, OperationClass::Adjustment)]
    #[case(OperationType::Reversal, OperationClass::Adjustment)]
    #[case(OperationType::AuditAdjustment, OperationClass::Audit)]
    #[case(OperationType::YearEndClosing, OperationClass::YearEnd)]
    #[case(OperationType::PriorPeriodCorrection, OperationClass::PriorPeriod)]
    fn test_operation_class(#[case] op: OperationType, #[case] class: OperationClass) {
        assert_eq!(op.class(), class);
    }

    #[test]
    fn test_labels_match_serde() {
        for op in OperationType::ALL {
            let json = serde_json::to_string(&op).unwrap();
            assert_eq!(json, format!("\"{}\"", op.as_str()));
        }
    }

    #[test]
    fn test_is_adjustment() {
        assert!(!OperationType::Payment.is_adjustment());
        assert!(OperationType::Reclassification.is_adjustment());
        assert!(OperationType::YearEndClosing.is_adjustment());
    }
}
