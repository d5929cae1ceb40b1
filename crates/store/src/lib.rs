//! In-memory collaborators for Chartwell.
//!
//! Implements the account, journal and fiscal period repositories over a
//! single locked state, with optimistic version checks on every save and
//! all-or-nothing journal posting. Also provides an audit log that keeps
//! every recorded fact.

pub mod audit;
pub mod memory;

pub use audit::InMemoryAuditLog;
pub use memory::{InMemoryStore, Posting};
