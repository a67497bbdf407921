//! Human review escalation
//!
//! Decides which searches are withheld, records the withheld snapshot, and
//! drives the one-way `Pending -> terminal` state machine.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{
    PendingReviewNotice, ReviewDecision, ReviewFlag, ReviewStats, ReviewStatus, ReviewStore,
    ReviewTransition, ReviewView, SubmitterStatus,
};
use crate::audit::{ActionOutcome, ActorId, AuditAction, AuditEvent, AuditSink, ResourceRef};
use crate::clock::{Clock, SystemClock};
use crate::config::ReviewConfig;
use crate::entitlements::UserEntitlements;
use crate::error::{HubError, HubResult};
use crate::search::SearchResponse;

pub const PENDING_REVIEW_STATUS: &str = "pending_review";
pub const APPROVED_MESSAGE: &str = "approved, results now available";
const PENDING_MESSAGE: &str = "Your query is awaiting human review";
const REJECTED_MESSAGE: &str = "Your query was rejected by a reviewer";

/// Outcome of evaluating the escalation criteria
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagDecision {
    pub flagged: bool,
    /// Every criterion that matched, in evaluation order
    pub criteria: Vec<String>,
}

/// Mean relevance of the returned page; `None` when nothing was returned
fn mean_relevance(response: &SearchResponse) -> Option<f64> {
    if response.results.is_empty() {
        return None;
    }
    let total: f64 = response
        .results
        .iter()
        .map(|result| result.relevance_score)
        .sum();
    Some(total / response.results.len() as f64)
}

pub struct ReviewGate {
    config: ReviewConfig,
    store: Arc<dyn ReviewStore>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
}

impl ReviewGate {
    pub fn new(config: ReviewConfig, store: Arc<dyn ReviewStore>, audit: Arc<dyn AuditSink>) -> Self {
        Self::with_clock(config, store, audit, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: ReviewConfig,
        store: Arc<dyn ReviewStore>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            store,
            audit,
            clock,
        }
    }

    pub fn config(&self) -> &ReviewConfig {
        &self.config
    }

    /// Evaluate every enabled criterion without short-circuiting
    pub fn should_flag(
        &self,
        query: &str,
        response: &SearchResponse,
        entitlements: &UserEntitlements,
    ) -> FlagDecision {
        if !self.config.enabled {
            return FlagDecision::default();
        }

        let mut criteria = Vec::new();
        let lowered = query.to_lowercase();

        // Counts what the caller asked for, not what entitlements narrowed it to
        if let Some(threshold) = self.config.multi_agency_threshold {
            let count = response.requested_agencies.len();
            if count >= threshold {
                criteria.push(format!("multi_agency: {} agencies", count));
            }
        }

        for keyword in &self.config.sensitive_keywords {
            if !keyword.is_empty() && lowered.contains(&keyword.to_lowercase()) {
                criteria.push(format!("sensitive_keyword: {}", keyword));
            }
        }

        if let Some(threshold) = self.config.min_confidence_threshold {
            if let Some(mean) = mean_relevance(response) {
                if mean < threshold {
                    criteria.push(format!("low_confidence: {:.2}", mean));
                }
            }
        }

        for topic in &self.config.flagged_topics {
            if !topic.is_empty() && lowered.contains(&topic.to_lowercase()) {
                criteria.push(format!("flagged_topic: {}", topic));
            }
        }

        if !criteria.is_empty() {
            debug!(
                user_id = %entitlements.user_id,
                criteria = ?criteria,
                "Query meets review criteria"
            );
        }

        FlagDecision {
            flagged: !criteria.is_empty(),
            criteria,
        }
    }

    /// Withhold a response, snapshotting its results for the reviewer
    pub async fn flag(
        &self,
        query: &str,
        response: &SearchResponse,
        entitlements: &UserEntitlements,
        criteria: Vec<String>,
    ) -> HubResult<ReviewFlag> {
        let flag = ReviewFlag {
            id: Uuid::now_v7(),
            query: query.to_string(),
            user_id: entitlements.user_id.clone(),
            agencies: response.agencies_searched.clone(),
            status: ReviewStatus::Pending,
            flag_criteria: criteria,
            original_results: response.results.clone(),
            original_total: response.total_results,
            reviewer_id: None,
            reviewer_notes: None,
            modified_response: None,
            flagged_at: self.clock.now(),
            reviewed_at: None,
        };

        self.store.insert(flag.clone()).await?;

        self.audit
            .log(
                AuditEvent::new(
                    ActorId::user(&entitlements.user_id),
                    AuditAction::ReviewFlagged,
                    ResourceRef::ReviewFlag(flag.id),
                    ActionOutcome::Success,
                )
                .with_details(json!({
                    "criteria": flag.flag_criteria,
                    "agencies": flag.agencies,
                    "withheld_results": flag.original_total,
                })),
            )
            .await?;

        info!(
            review_id = %flag.id,
            user_id = %flag.user_id,
            criteria = flag.flag_criteria.len(),
            "Query withheld pending review"
        );

        Ok(flag)
    }

    /// Caller-visible payload for a withheld query
    pub fn notice(&self, flag: &ReviewFlag) -> PendingReviewNotice {
        let message = if flag.is_confidential() {
            "Your query has been submitted for human review".to_string()
        } else {
            format!(
                "Your query matched {} result(s) that require human review before release",
                flag.original_total
            )
        };

        PendingReviewNotice {
            status: PENDING_REVIEW_STATUS.to_string(),
            review_id: flag.id,
            message,
            estimated_review_time: self.config.estimated_review_time.clone(),
        }
    }

    /// Move a pending flag to a terminal state
    pub async fn update(
        &self,
        id: Uuid,
        decision: ReviewDecision,
        reviewer: &UserEntitlements,
    ) -> HubResult<ReviewFlag> {
        match self.try_update(id, &decision, reviewer).await {
            Ok(flag) => {
                self.audit
                    .log(
                        AuditEvent::new(
                            ActorId::user(&reviewer.user_id),
                            AuditAction::ReviewUpdated,
                            ResourceRef::ReviewFlag(id),
                            ActionOutcome::Success,
                        )
                        .with_details(json!({ "status": flag.status })),
                    )
                    .await?;
                info!(review_id = %id, status = %flag.status, reviewer = %reviewer.user_id, "Review completed");
                Ok(flag)
            }
            Err(error) => {
                warn!(review_id = %id, reviewer = %reviewer.user_id, %error, "Review transition rejected");
                self.audit
                    .log(
                        AuditEvent::new(
                            ActorId::user(&reviewer.user_id),
                            AuditAction::ReviewTransitionRejected,
                            ResourceRef::ReviewFlag(id),
                            ActionOutcome::Denied {
                                reason: error.to_string(),
                            },
                        )
                        .with_details(json!({ "requested_status": decision.status })),
                    )
                    .await?;
                Err(error)
            }
        }
    }

    async fn try_update(
        &self,
        id: Uuid,
        decision: &ReviewDecision,
        reviewer: &UserEntitlements,
    ) -> HubResult<ReviewFlag> {
        if !reviewer.can_review() {
            return Err(HubError::AccessDenied(
                "reviewing requires reviewer or admin rights".to_string(),
            ));
        }

        if decision.status == ReviewStatus::Pending {
            return Err(HubError::Validation(
                "status must be approved, modified, or rejected".to_string(),
            ));
        }

        let modified_response = decision
            .modified_response
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty());
        if decision.status == ReviewStatus::Modified && modified_response.is_none() {
            return Err(HubError::Validation(
                "modified_response is required when status is modified".to_string(),
            ));
        }

        let flag = self
            .store
            .get(id)
            .await?
            .ok_or(HubError::UnknownReviewFlag(id))?;
        if flag.user_id == reviewer.user_id {
            return Err(HubError::AccessDenied(
                "reviewers may not review their own queries".to_string(),
            ));
        }

        self.store
            .transition(
                id,
                ReviewTransition {
                    status: decision.status,
                    reviewer_id: reviewer.user_id.clone(),
                    reviewer_notes: decision.reviewer_notes.clone(),
                    modified_response: modified_response.map(str::to_string),
                    reviewed_at: self.clock.now(),
                },
            )
            .await
    }

    /// Present a flag to the caller
    ///
    /// Reviewers see the full flag; the submitter sees a status message; anyone
    /// else is told the flag does not exist.
    pub async fn view(&self, id: Uuid, caller: &UserEntitlements) -> HubResult<ReviewView> {
        let flag = self.store.get(id).await?;

        let view = match flag {
            Some(flag) if caller.can_review() => ReviewView::Full(flag),
            Some(flag) if flag.user_id == caller.user_id => {
                ReviewView::Submitter(self.submitter_status(flag))
            }
            _ => {
                self.audit
                    .log(AuditEvent::new(
                        ActorId::user(&caller.user_id),
                        AuditAction::ReviewStatusViewed,
                        ResourceRef::ReviewFlag(id),
                        ActionOutcome::Denied {
                            reason: "unknown review flag".to_string(),
                        },
                    ))
                    .await?;
                return Err(HubError::UnknownReviewFlag(id));
            }
        };

        self.audit
            .log(AuditEvent::new(
                ActorId::user(&caller.user_id),
                AuditAction::ReviewStatusViewed,
                ResourceRef::ReviewFlag(id),
                ActionOutcome::Success,
            ))
            .await?;

        Ok(view)
    }

    /// Status-specific answer for the submitter
    pub fn submitter_status(&self, flag: ReviewFlag) -> SubmitterStatus {
        let (message, results) = match flag.status {
            ReviewStatus::Pending => (PENDING_MESSAGE.to_string(), None),
            ReviewStatus::Approved => (APPROVED_MESSAGE.to_string(), Some(flag.original_results)),
            ReviewStatus::Modified => (flag.modified_response.unwrap_or_default(), None),
            ReviewStatus::Rejected => (
                flag.reviewer_notes
                    .unwrap_or_else(|| REJECTED_MESSAGE.to_string()),
                None,
            ),
        };

        SubmitterStatus {
            review_id: flag.id,
            status: flag.status,
            message,
            results,
        }
    }

    /// Flags awaiting (or past) review; reviewers only
    pub async fn list(
        &self,
        status: Option<ReviewStatus>,
        caller: &UserEntitlements,
    ) -> HubResult<Vec<ReviewFlag>> {
        if !caller.can_review() {
            return Err(HubError::AccessDenied(
                "listing reviews requires reviewer or admin rights".to_string(),
            ));
        }
        self.store.list(status).await
    }

    pub async fn stats(&self, caller: &UserEntitlements) -> HubResult<ReviewStats> {
        let flags = self.list(None, caller).await?;
        let mut stats = ReviewStats::default();
        for flag in &flags {
            stats.record(flag.status);
        }
        Ok(stats)
    }
}
