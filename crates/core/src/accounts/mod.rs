//! Chart of accounts: taxonomy, the account aggregate and the hierarchy arena.
//!
//! - `types` - categories, account types and their allowed parents
//! - `config` - compiled hierarchy limits and code patterns
//! - `account` - the account aggregate and its named mutations
//! - `hierarchy` - id-indexed arena with cycle, depth and balance queries

pub mod account;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod types;

#[cfg(test)]
mod hierarchy_props;

pub use account::{Account, NewAccount};
pub use config::HierarchyConfig;
pub use error::AccountError;
pub use hierarchy::{AccountHierarchy, PATH_SEPARATOR, ProposedMove, walk_finds_cycle};
pub use types::{AccountCategory, AccountType, NormalBalance};
