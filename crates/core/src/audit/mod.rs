//! Audit facts and the sink they are emitted to.

pub mod event;
pub mod sink;

pub use event::{AuditRecord, DomainEvent};
pub use sink::{AuditSink, TracingAuditSink};
