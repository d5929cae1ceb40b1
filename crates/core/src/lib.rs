//! Core business logic for Chartwell.
//!
//! This crate contains pure accounting logic with no storage or transport
//! dependencies. Persistence and audit are reached through collaborator
//! traits implemented elsewhere.
//!
//! # Modules
//!
//! - `accounts` - Account taxonomy, account aggregate and hierarchy arena
//! - `ledger` - Double-entry journal entries, posting and reversal
//! - `fiscal` - Fiscal calendar and period status state machine
//! - `chart` - Chart of accounts orchestration service
//! - `audit` - Domain facts and the audit sink contract
//! - `repository` - Persistence collaborator contracts
//! - `error` - Error taxonomy shared by the modules above

pub mod accounts;
pub mod audit;
pub mod chart;
pub mod error;
pub mod fiscal;
pub mod ledger;
pub mod repository;

pub use error::ErrorKind;
