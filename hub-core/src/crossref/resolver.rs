//! Related-document discovery across agency boundaries

use std::collections::BTreeSet;
use std::sync::Arc;

use regex::Regex;
use serde_json::json;
use tracing::{debug, info};

use super::{
    CrossReference, CrossReferenceOutcome, CrossReferenceQuery, CrossReferenceResponse,
    RelationshipType,
};
use crate::audit::{ActionOutcome, ActorId, AuditAction, AuditEvent, AuditSink, ResourceRef};
use crate::config::CrossRefConfig;
use crate::document::{IndexedDocument, SearchResult};
use crate::entitlements::UserEntitlements;
use crate::error::{HubError, HubResult};
use crate::search::{SearchOrchestrator, SearchResponse};

const VERSION_TOKEN_PATTERN: &str = r"(?i)\b(?:v|ver|version|rev|revision)\s*\.?\s*\d+(?:\.\d+)*\b";

/// Keyword overlap at which two documents count as the same topic
const SIMILAR_KEYWORD_OVERLAP: usize = 3;
/// Relevance above which two documents count as the same topic
const SIMILAR_RELEVANCE: f64 = 0.8;

pub struct CrossReferenceResolver {
    orchestrator: Arc<SearchOrchestrator>,
    audit: Arc<dyn AuditSink>,
    config: CrossRefConfig,
    version_tokens: Regex,
}

impl CrossReferenceResolver {
    pub fn new(
        orchestrator: Arc<SearchOrchestrator>,
        audit: Arc<dyn AuditSink>,
        config: CrossRefConfig,
    ) -> HubResult<Self> {
        let version_tokens = Regex::new(VERSION_TOKEN_PATTERN)
            .map_err(|e| HubError::Config(format!("invalid version pattern: {}", e)))?;
        Ok(Self {
            orchestrator,
            audit,
            config,
            version_tokens,
        })
    }

    /// Find and classify documents related to one the caller can already see
    pub async fn find_related(
        &self,
        query: &CrossReferenceQuery,
        entitlements: &UserEntitlements,
    ) -> HubResult<CrossReferenceOutcome> {
        let min_confidence = query.min_confidence.unwrap_or(self.config.min_confidence);
        if !(0.0..=1.0).contains(&min_confidence) {
            return Err(HubError::Validation(
                "min_confidence must be between 0 and 1".to_string(),
            ));
        }
        let max_results = query.max_results.unwrap_or(self.config.max_results);

        let source = self
            .orchestrator
            .get_document(&query.document_id, entitlements)
            .await?;

        let mut agencies = entitlements.accessible_agencies();
        if !query.include_same_agency {
            agencies.remove(&source.agency());
        }

        let seed = self.seed(&source);
        let candidates = if agencies.is_empty() || seed.is_empty() {
            Vec::new()
        } else {
            self.orchestrator
                .trusted_search(&seed, &agencies, entitlements)
                .await?
        };
        debug!(
            document_id = %source.id,
            candidates = candidates.len(),
            "Cross-reference candidates retrieved"
        );

        let kept: Vec<(RelationshipType, SearchResult)> = candidates
            .into_iter()
            .filter(|candidate| candidate.document_id != source.id)
            .filter(|candidate| candidate.relevance_score >= min_confidence)
            .map(|candidate| (self.classify(&source, &candidate), candidate))
            .filter(|(kind, _)| {
                query
                    .relationship_types
                    .as_ref()
                    .is_none_or(|types| types.contains(kind))
            })
            .take(max_results)
            .collect();

        // Related documents pass the same review criteria as a direct search
        // for the seed text would
        let snapshot = SearchResponse {
            query: seed.clone(),
            total_results: kept.len(),
            results: kept.iter().map(|(_, candidate)| candidate.clone()).collect(),
            requested_agencies: BTreeSet::new(),
            agencies_searched: agencies.clone(),
            suggestions: Vec::new(),
            page: 1,
            page_size: max_results,
        };
        if let Some(flag) = self
            .orchestrator
            .hold_if_flagged(&seed, &snapshot, entitlements)
            .await?
        {
            self.audit
                .log(
                    AuditEvent::new(
                        ActorId::user(&entitlements.user_id),
                        AuditAction::CrossReference,
                        ResourceRef::Document(source.id.clone()),
                        ActionOutcome::Success,
                    )
                    .with_details(json!({
                        "related_documents": [],
                        "withheld": snapshot.results.len(),
                        "review_id": flag.id,
                    })),
                )
                .await?;
            info!(
                user_id = %entitlements.user_id,
                document_id = %source.id,
                review_id = %flag.id,
                "Cross-references withheld for review"
            );
            return Ok(CrossReferenceOutcome::PendingReview(
                self.orchestrator.notice(&flag),
            ));
        }

        let references: Vec<CrossReference> = kept
            .into_iter()
            .map(|(kind, candidate)| CrossReference {
                source_document_id: source.id.clone(),
                source_agency: source.agency(),
                related_agency: candidate.agency(),
                related_document_id: candidate.document_id,
                related_title: candidate.title,
                relationship_type: kind,
                confidence_score: candidate.relevance_score,
                citation: candidate.citation,
            })
            .collect();

        let mut agencies_involved: BTreeSet<_> =
            references.iter().map(|r| r.related_agency).collect();
        agencies_involved.insert(source.agency());

        let related_ids: Vec<&str> = references
            .iter()
            .map(|r| r.related_document_id.as_str())
            .collect();
        self.audit
            .log(
                AuditEvent::new(
                    ActorId::user(&entitlements.user_id),
                    AuditAction::CrossReference,
                    ResourceRef::Document(source.id.clone()),
                    ActionOutcome::Success,
                )
                .with_details(json!({
                    "related_documents": related_ids,
                    "agencies": agencies_involved,
                })),
            )
            .await?;

        Ok(CrossReferenceOutcome::Released(CrossReferenceResponse {
            source_document_id: source.id.clone(),
            source_agency: source.agency(),
            references,
            agencies_involved,
        }))
    }

    /// Search text built from the leading keywords, or the title without any
    fn seed(&self, source: &IndexedDocument) -> String {
        let keywords: Vec<&str> = source
            .keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .take(self.config.keyword_seed_count)
            .collect();

        if keywords.is_empty() {
            source.title.clone()
        } else {
            keywords.join(" ")
        }
    }

    /// First matching rule wins: supersedes, similar topic, dependency, related
    pub fn classify(&self, source: &IndexedDocument, candidate: &SearchResult) -> RelationshipType {
        let source_title = self.normalized_title(&source.title);
        if !source_title.is_empty() && source_title == self.normalized_title(&candidate.title) {
            return RelationshipType::Supersedes;
        }

        let source_keywords: BTreeSet<String> =
            source.keywords.iter().map(|k| k.to_lowercase()).collect();
        let overlap = candidate
            .keywords
            .iter()
            .map(|k| k.to_lowercase())
            .collect::<BTreeSet<_>>()
            .intersection(&source_keywords)
            .count();
        if overlap >= SIMILAR_KEYWORD_OVERLAP || candidate.relevance_score > SIMILAR_RELEVANCE {
            return RelationshipType::SimilarTopic;
        }

        if !candidate.document_id.is_empty() && source.content.contains(&candidate.document_id) {
            return RelationshipType::Dependency;
        }

        RelationshipType::Related
    }

    /// Lowercased title words with version tokens removed
    fn normalized_title(&self, title: &str) -> String {
        let stripped = self.version_tokens.replace_all(title, " ");
        stripped
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" ")
    }
}
