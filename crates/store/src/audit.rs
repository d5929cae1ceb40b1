//! Audit log that keeps every record in memory.

use chartwell_core::audit::{AuditRecord, AuditSink, DomainEvent};
use chartwell_core::repository::RepositoryError;
use tokio::sync::Mutex;
use tracing::debug;

/// Collects audit records in emission order.
#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    records: Mutex<Vec<AuditRecord>>,
}

impl InMemoryAuditLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record so far.
    pub async fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().await.clone()
    }

    /// Events only, without the envelope.
    pub async fn events(&self) -> Vec<DomainEvent> {
        self.records
            .lock()
            .await
            .iter()
            .map(|r| r.event.clone())
            .collect()
    }

    /// Names of the recorded events.
    pub async fn event_names(&self) -> Vec<&'static str> {
        self.records
            .lock()
            .await
            .iter()
            .map(|r| r.event.name())
            .collect()
    }
}

impl AuditSink for InMemoryAuditLog {
    async fn record(&self, record: AuditRecord) -> Result<(), RepositoryError> {
        debug!(event = record.event.name(), actor = ?record.actor, "audit record kept");
        self.records.lock().await.push(record);
        Ok(())
    }
}
