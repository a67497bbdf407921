//! End-to-end access and review scenarios through the KnowledgeHub facade

use std::sync::Arc;

use async_trait::async_trait;
use hub_core::{
    Agency, AuditAction, AuditSink, BackendQuery, ClassificationLevel, HubConfig, HubError,
    HubResult, Identity, IndexedDocument, KnowledgeHub, MemoryAuditSink, MemorySearchBackend,
    PermissionResolver, Predicate, ReviewDecision, ReviewStatus, ReviewView, SearchBackend,
    SearchOutcome, SearchRequest, SearchResult, SecurityFilter,
};

fn corpus() -> Vec<IndexedDocument> {
    vec![
        IndexedDocument::new(
            "dmv-100",
            Agency::Dmv,
            ClassificationLevel::Public,
            "Licensing requirements",
        )
        .with_keywords(["licensing", "requirements"])
        .with_content("General licensing requirements for drivers."),
        IndexedDocument::new(
            "dmv-200",
            Agency::Dmv,
            ClassificationLevel::Internal,
            "Licensing backlog",
        )
        .with_group("DMV_Staff")
        .with_content("Internal licensing backlog report."),
        IndexedDocument::new(
            "dol-100",
            Agency::Dol,
            ClassificationLevel::Public,
            "Licensing for contractors",
        )
        .with_content("Contractor licensing at the labor department."),
        IndexedDocument::new(
            "doh-100",
            Agency::Doh,
            ClassificationLevel::Public,
            "Clinic licensing",
        )
        .with_content("Health clinic licensing rules."),
    ]
}

fn hub_with(backend: Arc<dyn SearchBackend>) -> (KnowledgeHub, Arc<MemoryAuditSink>) {
    let audit = Arc::new(MemoryAuditSink::new());
    let hub = KnowledgeHub::builder(HubConfig::default(), backend)
        .audit_sink(audit.clone())
        .build()
        .unwrap();
    (hub, audit)
}

fn hub() -> (KnowledgeHub, Arc<MemoryAuditSink>) {
    hub_with(Arc::new(MemorySearchBackend::with_documents(corpus())))
}

fn dmv_staff() -> Identity {
    Identity::new("alice", "alice@example.gov").with_group("DMV_Staff")
}

fn all_agency_staff() -> Identity {
    Identity::new("carol", "carol@example.gov").with_group("AllAgencies_Staff")
}

fn reviewer() -> Identity {
    Identity::new("rita", "rita@example.gov")
        .with_group("Compliance_Reviewers")
        .with_group("AllAgencies_Staff")
}

/// Ignores the predicate entirely and returns every stored document
struct PermissiveBackend {
    documents: Vec<IndexedDocument>,
}

#[async_trait]
impl SearchBackend for PermissiveBackend {
    async fn search(&self, _: &BackendQuery, _: &Predicate) -> HubResult<Vec<SearchResult>> {
        Ok(self
            .documents
            .iter()
            .map(|doc| SearchResult::from_document(doc, 0.9, doc.content.clone()))
            .collect())
    }

    async fn get_document(&self, id: &str) -> HubResult<Option<IndexedDocument>> {
        Ok(self.documents.iter().find(|doc| doc.id == id).cloned())
    }
}

#[test]
fn scenario_a_other_agency_documents_are_inaccessible() {
    let resolver = PermissionResolver::new();
    let entitlements =
        resolver.resolve("alice", "alice@example.gov", &["DMV_Staff".to_string()], None);

    assert_eq!(entitlements.agencies.iter().copied().collect::<Vec<_>>(), vec![Agency::Dmv]);
    assert_eq!(entitlements.max_classification, ClassificationLevel::Internal);

    let filter = SecurityFilter::new();
    for level in ClassificationLevel::ALL {
        let doc = IndexedDocument::new("dol-x", Agency::Dol, level, "Labor").with_group("DMV_Staff");
        assert!(!filter.is_visible(&doc.label, &entitlements), "{:?} leaked", level);
        assert!(!filter.build_predicate(&entitlements).matches(&doc.label));
    }
}

#[tokio::test]
async fn scenario_a_search_never_returns_other_agencies() {
    let (hub, _) = hub();
    let response = hub
        .search(&dmv_staff(), &SearchRequest::new("licensing"))
        .await
        .unwrap()
        .released()
        .unwrap();

    assert_eq!(response.total_results, 2);
    assert!(response.results.iter().all(|r| r.agency() == Agency::Dmv));
}

#[tokio::test]
async fn scenario_b_three_agency_search_is_flagged() {
    let (hub, _) = hub();
    let outcome = hub
        .search(
            &all_agency_staff(),
            &SearchRequest::new("licensing").with_agencies([Agency::Dmv, Agency::Dol, Agency::Doh]),
        )
        .await
        .unwrap();

    let notice = match outcome {
        SearchOutcome::PendingReview(notice) => notice,
        SearchOutcome::Released(_) => panic!("three-agency search was released"),
    };
    assert_eq!(notice.status, "pending_review");

    match hub.review(&reviewer(), notice.review_id).await.unwrap() {
        ReviewView::Full(flag) => {
            assert!(
                flag.flag_criteria
                    .contains(&"multi_agency: 3 agencies".to_string())
            );
            assert_eq!(flag.status, ReviewStatus::Pending);
        }
        other => panic!("reviewer got {:?}", other),
    }
}

#[tokio::test]
async fn scenario_b_counts_requested_agencies_beyond_entitlements() {
    let (hub, _) = hub();
    let outcome = hub
        .search(
            &dmv_staff(),
            &SearchRequest::new("licensing").with_agencies([Agency::Dmv, Agency::Dol, Agency::Doh]),
        )
        .await
        .unwrap();

    let SearchOutcome::PendingReview(notice) = outcome else {
        panic!("three-agency request was released");
    };
    match hub.review(&reviewer(), notice.review_id).await.unwrap() {
        ReviewView::Full(flag) => {
            assert_eq!(flag.flag_criteria, vec!["multi_agency: 3 agencies".to_string()]);
            assert_eq!(flag.agencies.iter().copied().collect::<Vec<_>>(), vec![Agency::Dmv]);
        }
        other => panic!("reviewer got {:?}", other),
    }
}

#[tokio::test]
async fn search_naming_no_agencies_is_not_multi_agency() {
    let (hub, _) = hub();
    let response = hub
        .search(&all_agency_staff(), &SearchRequest::new("licensing"))
        .await
        .unwrap()
        .released()
        .expect("search over every entitled agency was withheld");

    assert_eq!(response.agencies_searched.len(), Agency::ALL.len());
    assert!(response.requested_agencies.is_empty());
}

#[tokio::test]
async fn scenario_c_modified_without_response_keeps_flag_pending() {
    let (hub, _) = hub();
    let outcome = hub
        .search(
            &all_agency_staff(),
            &SearchRequest::new("licensing").with_agencies([Agency::Dmv, Agency::Dol, Agency::Doh]),
        )
        .await
        .unwrap();
    let SearchOutcome::PendingReview(notice) = outcome else {
        panic!("search was not withheld");
    };

    let err = hub
        .update_review(
            &reviewer(),
            notice.review_id,
            ReviewDecision::new(ReviewStatus::Modified),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, HubError::Validation(_)));

    let flags = hub
        .list_reviews(&reviewer(), Some(ReviewStatus::Pending))
        .await
        .unwrap();
    assert_eq!(flags.len(), 1);
    assert_eq!(flags[0].id, notice.review_id);
}

#[tokio::test]
async fn scenario_d_denied_and_missing_documents_are_indistinguishable() {
    let (hub, audit) = hub();

    let denied = hub.get_document(&dmv_staff(), "dol-100").await.unwrap_err();
    let missing = hub
        .get_document(&dmv_staff(), "no-such-document")
        .await
        .unwrap_err();

    assert!(matches!(denied, HubError::NotFound));
    assert!(matches!(missing, HubError::NotFound));
    assert_eq!(denied.code(), missing.code());
    assert_eq!(denied.to_string(), missing.to_string());

    let denials = audit
        .entries()
        .await
        .into_iter()
        .filter(|event| event.action == AuditAction::DocumentDenied)
        .count();
    assert_eq!(denials, 2);
}

#[tokio::test]
async fn result_filter_is_authoritative_over_a_permissive_backend() {
    let backend = Arc::new(PermissiveBackend {
        documents: corpus(),
    });
    let (hub, _) = hub_with(backend);

    let public_dmv = Identity::new("pat", "pat@example.gov").with_group("DMV_Public");
    let response = hub
        .search(&public_dmv, &SearchRequest::new("anything"))
        .await
        .unwrap()
        .released()
        .unwrap();

    let ids: Vec<&str> = response
        .results
        .iter()
        .map(|r| r.document_id.as_str())
        .collect();
    assert_eq!(ids, vec!["dmv-100"]);
    assert_eq!(response.total_results, 1);
}

#[tokio::test]
async fn approved_results_are_released_to_submitter() {
    let (hub, _) = hub();
    let submitter = all_agency_staff();
    let SearchOutcome::PendingReview(notice) = hub
        .search(
            &submitter,
            &SearchRequest::new("licensing").with_agencies([Agency::Dmv, Agency::Dol, Agency::Doh]),
        )
        .await
        .unwrap()
    else {
        panic!("search was not withheld");
    };

    hub.update_review(
        &reviewer(),
        notice.review_id,
        ReviewDecision::new(ReviewStatus::Approved).with_notes("fine"),
    )
    .await
    .unwrap();

    match hub.review(&submitter, notice.review_id).await.unwrap() {
        ReviewView::Submitter(status) => {
            assert_eq!(status.message, "approved, results now available");
            assert!(!status.results.unwrap_or_default().is_empty());
        }
        other => panic!("submitter got {:?}", other),
    }
}

#[tokio::test]
async fn every_denial_is_audited() {
    let (hub, audit) = hub();
    hub.search(
        &dmv_staff(),
        &SearchRequest::new("licensing").with_agencies([Agency::Doh]),
    )
    .await
    .unwrap();

    let events = audit.query(Default::default()).await.unwrap();
    assert!(events.iter().any(|e| e.action == AuditAction::SearchDenied));
}
