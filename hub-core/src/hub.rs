//! The knowledge hub facade
//!
//! Every public operation takes the caller's [`Identity`] explicitly, turns it
//! into cached entitlements, and hands off to the component that owns the
//! operation.

use std::sync::Arc;

use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::audit::{
    ActionOutcome, ActorId, AuditAction, AuditEvent, AuditFilter, AuditSink, JsonlAuditSink,
    MemoryAuditSink, ResourceRef,
};
use crate::backend::SearchBackend;
use crate::clock::{Clock, SystemClock};
use crate::config::HubConfig;
use crate::crossref::{CrossReferenceOutcome, CrossReferenceQuery, CrossReferenceResolver};
use crate::document::IndexedDocument;
use crate::entitlements::{Identity, PermissionCache, PermissionResolver, UserEntitlements};
use crate::error::{HubError, HubResult};
use crate::review::{
    MemoryReviewStore, ReviewDecision, ReviewFlag, ReviewGate, ReviewStats, ReviewStatus,
    ReviewStore, ReviewView,
};
use crate::search::{SearchOrchestrator, SearchOutcome, SearchRequest};

/// Assembles a [`KnowledgeHub`] from its collaborators
pub struct HubBuilder {
    config: HubConfig,
    backend: Arc<dyn SearchBackend>,
    audit: Option<Arc<dyn AuditSink>>,
    review_store: Option<Arc<dyn ReviewStore>>,
    clock: Arc<dyn Clock>,
}

impl HubBuilder {
    pub fn new(config: HubConfig, backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            config,
            backend,
            audit: None,
            review_store: None,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn review_store(mut self, store: Arc<dyn ReviewStore>) -> Self {
        self.review_store = Some(store);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Validate the configuration and wire the components together
    ///
    /// Without an explicit audit sink, `audit.path` selects a JSONL file and
    /// its absence an in-memory sink.
    pub fn build(self) -> HubResult<KnowledgeHub> {
        self.config.validate()?;

        let audit: Arc<dyn AuditSink> = match (self.audit, &self.config.audit.path) {
            (Some(audit), _) => audit,
            (None, Some(path)) => Arc::new(JsonlAuditSink::new(path)),
            (None, None) => Arc::new(MemoryAuditSink::new()),
        };
        let review_store: Arc<dyn ReviewStore> = match self.review_store {
            Some(store) => store,
            None => Arc::new(MemoryReviewStore::new()),
        };

        let gate = Arc::new(ReviewGate::with_clock(
            self.config.review.clone(),
            review_store,
            audit.clone(),
            self.clock.clone(),
        ));
        let orchestrator = Arc::new(SearchOrchestrator::new(
            self.backend,
            gate.clone(),
            audit.clone(),
            self.config.search.clone(),
        ));
        let crossref = CrossReferenceResolver::new(
            orchestrator.clone(),
            audit.clone(),
            self.config.crossref.clone(),
        )?;

        Ok(KnowledgeHub {
            resolver: PermissionResolver::with_clock(self.clock.clone()),
            cache: PermissionCache::with_clock(&self.config.cache, self.clock),
            orchestrator,
            crossref,
            gate,
            audit,
            config: self.config,
        })
    }
}

pub struct KnowledgeHub {
    config: HubConfig,
    resolver: PermissionResolver,
    cache: PermissionCache,
    orchestrator: Arc<SearchOrchestrator>,
    crossref: CrossReferenceResolver,
    gate: Arc<ReviewGate>,
    audit: Arc<dyn AuditSink>,
}

impl KnowledgeHub {
    pub fn builder(config: HubConfig, backend: Arc<dyn SearchBackend>) -> HubBuilder {
        HubBuilder::new(config, backend)
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    pub fn audit_sink(&self) -> &Arc<dyn AuditSink> {
        &self.audit
    }

    pub fn cache(&self) -> &PermissionCache {
        &self.cache
    }

    /// Cached entitlements for the caller, resolving on a miss
    pub async fn entitlements(&self, identity: &Identity) -> HubResult<Arc<UserEntitlements>> {
        if let Some(cached) = self.cache.get(&identity.user_id).await {
            return Ok(cached);
        }
        self.resolve_and_cache(identity).await
    }

    /// Drop any cached entitlements and resolve again
    pub async fn refresh_entitlements(
        &self,
        identity: &Identity,
    ) -> HubResult<Arc<UserEntitlements>> {
        self.cache.invalidate(&identity.user_id).await;
        self.resolve_and_cache(identity).await
    }

    async fn resolve_and_cache(&self, identity: &Identity) -> HubResult<Arc<UserEntitlements>> {
        let resolved = self.resolver.resolve_identity(identity);
        let entitlements = self.cache.put(&identity.user_id, resolved).await;

        self.audit
            .log(
                AuditEvent::new(
                    ActorId::System,
                    AuditAction::PermissionsResolved,
                    ResourceRef::User(identity.user_id.clone()),
                    ActionOutcome::Success,
                )
                .with_details(json!({
                    "agencies": entitlements.agencies,
                    "max_classification": entitlements.max_classification,
                    "is_admin": entitlements.is_admin,
                    "is_reviewer": entitlements.is_reviewer,
                })),
            )
            .await?;

        info!(
            user_id = %identity.user_id,
            agencies = entitlements.agencies.len(),
            max_classification = %entitlements.max_classification,
            "Entitlements resolved"
        );
        Ok(entitlements)
    }

    pub async fn search(
        &self,
        identity: &Identity,
        request: &SearchRequest,
    ) -> HubResult<SearchOutcome> {
        let entitlements = self.entitlements(identity).await?;
        self.orchestrator.search(request, &entitlements).await
    }

    pub async fn get_document(
        &self,
        identity: &Identity,
        document_id: &str,
    ) -> HubResult<IndexedDocument> {
        let entitlements = self.entitlements(identity).await?;
        self.orchestrator.get_document(document_id, &entitlements).await
    }

    pub async fn find_related(
        &self,
        identity: &Identity,
        query: &CrossReferenceQuery,
    ) -> HubResult<CrossReferenceOutcome> {
        let entitlements = self.entitlements(identity).await?;
        self.crossref.find_related(query, &entitlements).await
    }

    pub async fn review(&self, identity: &Identity, id: Uuid) -> HubResult<ReviewView> {
        let entitlements = self.entitlements(identity).await?;
        self.gate.view(id, &entitlements).await
    }

    pub async fn update_review(
        &self,
        identity: &Identity,
        id: Uuid,
        decision: ReviewDecision,
    ) -> HubResult<ReviewFlag> {
        let entitlements = self.entitlements(identity).await?;
        self.gate.update(id, decision, &entitlements).await
    }

    pub async fn list_reviews(
        &self,
        identity: &Identity,
        status: Option<ReviewStatus>,
    ) -> HubResult<Vec<ReviewFlag>> {
        let entitlements = self.entitlements(identity).await?;
        self.gate.list(status, &entitlements).await
    }

    pub async fn review_stats(&self, identity: &Identity) -> HubResult<ReviewStats> {
        let entitlements = self.entitlements(identity).await?;
        self.gate.stats(&entitlements).await
    }

    /// Audit trail query; admins only
    pub async fn audit_events(
        &self,
        identity: &Identity,
        filter: AuditFilter,
    ) -> HubResult<Vec<AuditEvent>> {
        let entitlements = self.entitlements(identity).await?;
        if !entitlements.is_admin {
            return Err(HubError::AccessDenied(
                "the audit trail is restricted to administrators".to_string(),
            ));
        }
        self.audit.query(filter).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::agency::{Agency, ClassificationLevel};
    use crate::backend::MemorySearchBackend;
    use crate::clock::ManualClock;

    fn hub_with_clock(clock: Arc<ManualClock>) -> (KnowledgeHub, Arc<MemoryAuditSink>) {
        let audit = Arc::new(MemoryAuditSink::new());
        let backend = Arc::new(MemorySearchBackend::with_documents([IndexedDocument::new(
            "dmv-1",
            Agency::Dmv,
            ClassificationLevel::Public,
            "Permit guide",
        )]));
        let hub = KnowledgeHub::builder(HubConfig::default(), backend)
            .audit_sink(audit.clone())
            .clock(clock)
            .build()
            .unwrap();
        (hub, audit)
    }

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap(),
        ))
    }

    #[tokio::test]
    async fn test_entitlements_are_cached() {
        let (hub, audit) = hub_with_clock(clock());
        let identity = Identity::new("alice", "alice@example.gov").with_group("DMV_Staff");

        let first = hub.entitlements(&identity).await.unwrap();
        let second = hub.entitlements(&identity).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(audit.len().await, 1);
    }

    #[tokio::test]
    async fn test_entitlements_expire() {
        let clock = clock();
        let (hub, audit) = hub_with_clock(clock.clone());
        let identity = Identity::new("alice", "alice@example.gov").with_group("DMV_Staff");

        hub.entitlements(&identity).await.unwrap();
        clock.advance(Duration::seconds(301));
        hub.entitlements(&identity).await.unwrap();
        assert_eq!(audit.len().await, 2);
    }

    #[tokio::test]
    async fn test_refresh_picks_up_new_groups() {
        let (hub, _) = hub_with_clock(clock());
        let before = Identity::new("alice", "alice@example.gov").with_group("DMV_Staff");
        let after = before.clone().with_group("DOL_Managers");

        hub.entitlements(&before).await.unwrap();
        let stale = hub.entitlements(&after).await.unwrap();
        assert!(!stale.agencies.contains(&Agency::Dol));

        let fresh = hub.refresh_entitlements(&after).await.unwrap();
        assert!(fresh.agencies.contains(&Agency::Dol));
        assert_eq!(fresh.max_classification, ClassificationLevel::Restricted);
    }

    #[tokio::test]
    async fn test_audit_events_admin_only() {
        let (hub, _) = hub_with_clock(clock());
        let staff = Identity::new("alice", "alice@example.gov").with_group("DMV_Staff");
        let admin = Identity::new("root", "root@example.gov").with_group("AllAgencies_Admin");

        let err = hub.audit_events(&staff, AuditFilter::default()).await.unwrap_err();
        assert!(matches!(err, HubError::AccessDenied(_)));
        assert!(!hub.audit_events(&admin, AuditFilter::default()).await.unwrap().is_empty());
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let mut config = HubConfig::default();
        config.cache.ttl_seconds = 0;
        let result = KnowledgeHub::builder(config, Arc::new(MemorySearchBackend::new())).build();
        assert!(matches!(result, Err(HubError::Config(_))));
    }
}
