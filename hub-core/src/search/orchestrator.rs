//! Search orchestration
//!
//! Wraps every backend call in the security filter on both sides: the
//! advisory predicate on the way in, the authoritative visibility check and
//! redaction on the way out. Released responses pass through the review gate.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use super::{NO_AGENCY_ACCESS, SearchOutcome, SearchRequest, SearchResponse};
use crate::agency::Agency;
use crate::audit::{ActionOutcome, ActorId, AuditAction, AuditEvent, AuditSink, ResourceRef};
use crate::backend::{BackendQuery, SearchBackend};
use crate::config::SearchConfig;
use crate::document::{IndexedDocument, SearchResult};
use crate::entitlements::UserEntitlements;
use crate::error::{HubError, HubResult};
use crate::review::{PendingReviewNotice, ReviewFlag, ReviewGate};
use crate::security::{SecurityFilter, redact};

pub struct SearchOrchestrator {
    backend: Arc<dyn SearchBackend>,
    gate: Arc<ReviewGate>,
    audit: Arc<dyn AuditSink>,
    filter: SecurityFilter,
    config: SearchConfig,
}

impl SearchOrchestrator {
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        gate: Arc<ReviewGate>,
        audit: Arc<dyn AuditSink>,
        config: SearchConfig,
    ) -> Self {
        Self {
            backend,
            gate,
            audit,
            filter: SecurityFilter::new(),
            config,
        }
    }

    /// Requested agencies narrowed to what the caller may reach
    pub fn agencies_to_search(
        &self,
        requested: Option<BTreeSet<Agency>>,
        entitlements: &UserEntitlements,
    ) -> BTreeSet<Agency> {
        let accessible = entitlements.accessible_agencies();
        match requested {
            Some(requested) => requested.intersection(&accessible).copied().collect(),
            None => accessible,
        }
    }

    /// Run a search on behalf of a caller
    pub async fn search(
        &self,
        request: &SearchRequest,
        entitlements: &UserEntitlements,
    ) -> HubResult<SearchOutcome> {
        request.validate()?;
        let page_size = request.effective_page_size(&self.config);
        let requested = request.requested_agencies();
        let agencies = self.agencies_to_search(requested.clone(), entitlements);

        if agencies.is_empty() {
            warn!(
                user_id = %entitlements.user_id,
                requested = ?requested,
                "Search denied: no accessible agencies requested"
            );
            self.audit
                .log(
                    AuditEvent::new(
                        ActorId::user(&entitlements.user_id),
                        AuditAction::SearchDenied,
                        ResourceRef::Query(request.query.clone()),
                        ActionOutcome::Denied {
                            reason: NO_AGENCY_ACCESS.to_string(),
                        },
                    )
                    .with_details(json!({ "requested_agencies": requested })),
                )
                .await?;

            let mut response = SearchResponse::empty(&request.query, request.page, page_size);
            response.suggestions.push(NO_AGENCY_ACCESS.to_string());
            return Ok(SearchOutcome::Released(response));
        }

        let visible = match self.trusted_search(&request.query, &agencies, entitlements).await {
            Ok(visible) => visible,
            Err(error) => {
                self.audit
                    .log(
                        AuditEvent::new(
                            ActorId::user(&entitlements.user_id),
                            AuditAction::Search,
                            ResourceRef::Query(request.query.clone()),
                            ActionOutcome::Failed {
                                error: error.to_string(),
                            },
                        )
                        .with_details(json!({ "agencies": agencies })),
                    )
                    .await?;
                return Err(error);
            }
        };

        let total_results = visible.len();
        let offset = (request.page - 1).saturating_mul(page_size);
        let results: Vec<SearchResult> = visible.into_iter().skip(offset).take(page_size).collect();

        let response = SearchResponse {
            query: request.query.clone(),
            results,
            total_results,
            requested_agencies: requested.unwrap_or_default(),
            agencies_searched: agencies,
            suggestions: Vec::new(),
            page: request.page,
            page_size,
        };

        if let Some(flag) = self
            .hold_if_flagged(&request.query, &response, entitlements)
            .await?
        {
            self.record_search(entitlements, &response, 0, Some(flag.id.to_string()))
                .await?;
            return Ok(SearchOutcome::PendingReview(self.gate.notice(&flag)));
        }

        self.record_search(entitlements, &response, response.results.len(), None)
            .await?;
        info!(
            user_id = %entitlements.user_id,
            agencies = response.agencies_searched.len(),
            returned = response.results.len(),
            total = response.total_results,
            "Search completed"
        );
        Ok(SearchOutcome::Released(response))
    }

    /// Run the review criteria over a response and withhold it when any match
    pub(crate) async fn hold_if_flagged(
        &self,
        query: &str,
        response: &SearchResponse,
        entitlements: &UserEntitlements,
    ) -> HubResult<Option<ReviewFlag>> {
        let decision = self.gate.should_flag(query, response, entitlements);
        if !decision.flagged {
            return Ok(None);
        }
        let flag = self
            .gate
            .flag(query, response, entitlements, decision.criteria)
            .await?;
        Ok(Some(flag))
    }

    pub(crate) fn notice(&self, flag: &ReviewFlag) -> PendingReviewNotice {
        self.gate.notice(flag)
    }

    /// Backend search plus result filtering and redaction, without paging or
    /// review
    pub(crate) async fn trusted_search(
        &self,
        query: &str,
        agencies: &BTreeSet<Agency>,
        entitlements: &UserEntitlements,
    ) -> HubResult<Vec<SearchResult>> {
        let predicate = self.filter.build_predicate(entitlements);
        let backend_query = BackendQuery::new(query, agencies.clone());
        let raw = self.backend.search(&backend_query, &predicate).await?;

        let in_scope: Vec<SearchResult> = raw
            .into_iter()
            .filter(|result| agencies.contains(&result.agency()))
            .collect();
        let visible = self.filter.filter_results(in_scope, entitlements);

        Ok(visible
            .into_iter()
            .map(|result| redact(result, entitlements))
            .collect())
    }

    /// Fetch one document
    ///
    /// A document the caller may not see is reported exactly like a missing one.
    pub async fn get_document(
        &self,
        document_id: &str,
        entitlements: &UserEntitlements,
    ) -> HubResult<IndexedDocument> {
        let document = self.backend.get_document(document_id).await?;

        let denial = match &document {
            None => Some("not found"),
            Some(doc) if !self.filter.is_visible(&doc.label, entitlements) => {
                Some("access denied")
            }
            Some(_) => None,
        };

        if let Some(reason) = denial {
            debug!(user_id = %entitlements.user_id, document_id, reason, "Document read denied");
            self.audit
                .log(AuditEvent::new(
                    ActorId::user(&entitlements.user_id),
                    AuditAction::DocumentDenied,
                    ResourceRef::Document(document_id.to_string()),
                    ActionOutcome::Denied {
                        reason: reason.to_string(),
                    },
                ))
                .await?;
            return Err(HubError::NotFound);
        }

        let document = document.ok_or(HubError::NotFound)?;
        self.audit
            .log(
                AuditEvent::new(
                    ActorId::user(&entitlements.user_id),
                    AuditAction::DocumentViewed,
                    ResourceRef::Document(document.id.clone()),
                    ActionOutcome::Success,
                )
                .with_details(json!({
                    "agency": document.agency(),
                    "classification": document.classification(),
                })),
            )
            .await?;

        Ok(redact(document, entitlements))
    }

    async fn record_search(
        &self,
        entitlements: &UserEntitlements,
        response: &SearchResponse,
        returned: usize,
        review_id: Option<String>,
    ) -> HubResult<()> {
        self.audit
            .log(
                AuditEvent::new(
                    ActorId::user(&entitlements.user_id),
                    AuditAction::Search,
                    ResourceRef::Query(response.query.clone()),
                    ActionOutcome::Success,
                )
                .with_details(json!({
                    "agencies": response.agencies_searched,
                    "returned": returned,
                    "review_id": review_id,
                })),
            )
            .await
    }
}
