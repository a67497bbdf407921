//! Audit event types

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::HubResult;

/// Who performed an action
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActorId {
    User(String),
    System,
}

impl ActorId {
    pub fn user(id: impl Into<String>) -> Self {
        Self::User(id.into())
    }
}

/// Type of audited action
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Search,
    SearchDenied,
    DocumentViewed,
    DocumentDenied,
    CrossReference,
    ReviewFlagged,
    ReviewUpdated,
    ReviewTransitionRejected,
    ReviewStatusViewed,
    PermissionsResolved,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::SearchDenied => "search_denied",
            Self::DocumentViewed => "document_viewed",
            Self::DocumentDenied => "document_denied",
            Self::CrossReference => "cross_reference",
            Self::ReviewFlagged => "review_flagged",
            Self::ReviewUpdated => "review_updated",
            Self::ReviewTransitionRejected => "review_transition_rejected",
            Self::ReviewStatusViewed => "review_status_viewed",
            Self::PermissionsResolved => "permissions_resolved",
        }
    }
}

impl std::str::FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let all = [
            Self::Search,
            Self::SearchDenied,
            Self::DocumentViewed,
            Self::DocumentDenied,
            Self::CrossReference,
            Self::ReviewFlagged,
            Self::ReviewUpdated,
            Self::ReviewTransitionRejected,
            Self::ReviewStatusViewed,
            Self::PermissionsResolved,
        ];
        all.into_iter()
            .find(|action| action.as_str() == s.to_lowercase())
            .ok_or_else(|| format!("unknown audit action: {}", s))
    }
}

/// What an action touched
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ResourceRef {
    Query(String),
    Document(String),
    ReviewFlag(Uuid),
    User(String),
}

/// Outcome of an action
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActionOutcome {
    Success,
    Denied { reason: String },
    Failed { error: String },
}

/// A single audit record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub actor: ActorId,
    pub action: AuditAction,
    pub resource: ResourceRef,
    pub outcome: ActionOutcome,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub details: serde_json::Value,
}

impl AuditEvent {
    pub fn new(
        actor: ActorId,
        action: AuditAction,
        resource: ResourceRef,
        outcome: ActionOutcome,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            actor,
            action,
            resource,
            outcome,
            details: serde_json::Value::Null,
        }
    }

    /// Attach structured details
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}

/// Filter for querying audit events
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub actor: Option<ActorId>,
    pub action: Option<AuditAction>,
    pub resource: Option<ResourceRef>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// Keep only the newest matches, still returned oldest first
    pub limit: Option<usize>,
}

impl AuditFilter {
    pub fn matches(&self, event: &AuditEvent) -> bool {
        if self.actor.as_ref().is_some_and(|a| &event.actor != a) {
            return false;
        }

        if self.action.is_some_and(|a| event.action != a) {
            return false;
        }

        if self.resource.as_ref().is_some_and(|r| &event.resource != r) {
            return false;
        }

        if self.from.is_some_and(|from| event.timestamp < from) {
            return false;
        }

        if self.to.is_some_and(|to| event.timestamp > to) {
            return false;
        }

        true
    }
}

/// Append-only audit destination
///
/// A failed write is an error for the caller; sinks never drop silently.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn log(&self, event: AuditEvent) -> HubResult<()>;

    async fn query(&self, filter: AuditFilter) -> HubResult<Vec<AuditEvent>>;
}
