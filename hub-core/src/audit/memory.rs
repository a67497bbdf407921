//! In-memory audit sink

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{AuditEvent, AuditFilter, AuditSink};
use crate::error::HubResult;

#[derive(Default)]
pub struct MemoryAuditSink {
    events: RwLock<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything logged so far
    pub async fn entries(&self) -> Vec<AuditEvent> {
        self.events.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn log(&self, event: AuditEvent) -> HubResult<()> {
        self.events.write().await.push(event);
        Ok(())
    }

    async fn query(&self, filter: AuditFilter) -> HubResult<Vec<AuditEvent>> {
        let events = self.events.read().await;
        let mut matching: Vec<AuditEvent> = events
            .iter()
            .filter(|event| filter.matches(event))
            .cloned()
            .collect();
        if let Some(limit) = filter.limit {
            let skip = matching.len().saturating_sub(limit);
            matching.drain(..skip);
        }
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{ActionOutcome, ActorId, AuditAction, ResourceRef};

    #[tokio::test]
    async fn test_memory_sink_records_in_order() {
        let sink = MemoryAuditSink::new();
        for action in [AuditAction::Search, AuditAction::DocumentViewed] {
            sink.log(AuditEvent::new(
                ActorId::System,
                action,
                ResourceRef::Document("d".into()),
                ActionOutcome::Success,
            ))
            .await
            .unwrap();
        }

        let entries = sink.entries().await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, AuditAction::Search);
        assert_eq!(entries[1].action, AuditAction::DocumentViewed);
    }

    #[tokio::test]
    async fn test_memory_sink_query_limit() {
        let sink = MemoryAuditSink::new();
        for i in 0..5 {
            sink.log(AuditEvent::new(
                ActorId::System,
                AuditAction::Search,
                ResourceRef::Query(format!("q{}", i)),
                ActionOutcome::Success,
            ))
            .await
            .unwrap();
        }

        let limited = sink
            .query(AuditFilter {
                limit: Some(3),
                ..Default::default()
            })
            .await
            .unwrap();
        let queries: Vec<_> = limited.iter().map(|event| event.resource.clone()).collect();
        assert_eq!(
            queries,
            vec![
                ResourceRef::Query("q2".into()),
                ResourceRef::Query("q3".into()),
                ResourceRef::Query("q4".into()),
            ]
        );
        assert!(!sink.is_empty().await);
    }
}
