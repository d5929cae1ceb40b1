//! Audit collaborator contract and the tracing-backed sink.

use std::future::Future;

use tracing::info;

use super::event::AuditRecord;
use crate::repository::RepositoryError;

/// Receives domain facts. Storage and formatting belong to the implementor.
pub trait AuditSink: Send + Sync {
    /// Records one fact.
    fn record(&self, record: AuditRecord)
    -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// Writes every fact as a structured `tracing` event on the `audit` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    async fn record(&self, record: AuditRecord) -> Result<(), RepositoryError> {
        let payload = serde_json::to_string(&record.event)
            .map_err(|e| RepositoryError::Storage(e.to_string()))?;
        info!(
            target: "audit",
            record_id = %record.id,
            event = record.event.name(),
            actor = ?record.actor,
            occurred_at = %record.occurred_at,
            payload = %payload,
            "domain event"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::DomainEvent;

    #[tokio::test]
    async fn test_tracing_sink_accepts_records() {
        let sink = TracingAuditSink;
        let record = AuditRecord::new(DomainEvent::ChartReorganized { moved: 0, failed: 0 }, None);
        assert!(sink.record(record).await.is_ok());
    }
}
