//! Double-entry bookkeeping logic.
//!
//! This module implements the core ledger functionality:
//! - Operation types and their posting classes
//! - Transaction lines (debits and credits)
//! - Journal entries with per-currency balance checks and reversal
//! - Balance calculations
//! - Error types for ledger operations
//! - Ledger service for atomic posting

pub mod balance;
pub mod error;
pub mod journal;
pub mod line;
pub mod operation;
pub mod service;

#[cfg(test)]
mod journal_props;

pub use balance::{AccountBalance, BalanceChange, RunningBalance};
pub use error::LedgerError;
pub use journal::{CurrencyTotals, JournalEntry, JournalEntryStatus};
pub use line::{EntrySide, TransactionLine};
pub use operation::{OperationClass, OperationType};
pub use service::LedgerService;
