//! Review flag types

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agency::Agency;
use crate::document::SearchResult;
use crate::error::HubError;

/// Where a review flag sits in its lifecycle
///
/// `Pending` moves exactly once to one of the terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Modified,
    Rejected,
}

impl ReviewStatus {
    pub const ALL: [ReviewStatus; 4] = [
        ReviewStatus::Pending,
        ReviewStatus::Approved,
        ReviewStatus::Modified,
        ReviewStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Modified => "modified",
            Self::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewStatus {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == lower)
            .ok_or_else(|| HubError::Validation(format!("unknown review status: {}", s)))
    }
}

/// A withheld query awaiting a human decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewFlag {
    pub id: Uuid,
    pub query: String,
    pub user_id: String,
    pub agencies: BTreeSet<Agency>,
    pub status: ReviewStatus,
    /// Every criterion that triggered, in evaluation order
    pub flag_criteria: Vec<String>,
    /// Filtered results as they stood when the query was withheld
    pub original_results: Vec<SearchResult>,
    pub original_total: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_response: Option<String>,
    pub flagged_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl ReviewFlag {
    pub fn is_pending(&self) -> bool {
        self.status == ReviewStatus::Pending
    }

    /// Confidential flags never reveal result counts to the submitter
    pub fn is_confidential(&self) -> bool {
        self.flag_criteria
            .iter()
            .any(|criterion| criterion.to_lowercase().contains("confidential"))
    }
}

/// A reviewer's decision on a pending flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewDecision {
    pub status: ReviewStatus,
    #[serde(default)]
    pub reviewer_notes: Option<String>,
    #[serde(default)]
    pub modified_response: Option<String>,
}

impl ReviewDecision {
    pub fn new(status: ReviewStatus) -> Self {
        Self {
            status,
            reviewer_notes: None,
            modified_response: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.reviewer_notes = Some(notes.into());
        self
    }

    pub fn with_modified_response(mut self, response: impl Into<String>) -> Self {
        self.modified_response = Some(response.into());
        self
    }
}

/// A committed transition, applied atomically by the store
#[derive(Debug, Clone)]
pub struct ReviewTransition {
    pub status: ReviewStatus,
    pub reviewer_id: String,
    pub reviewer_notes: Option<String>,
    pub modified_response: Option<String>,
    pub reviewed_at: DateTime<Utc>,
}

/// What the submitter sees in place of results while a query is withheld
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingReviewNotice {
    pub status: String,
    pub review_id: Uuid,
    pub message: String,
    pub estimated_review_time: String,
}

/// Status check answer for the user who submitted the query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitterStatus {
    pub review_id: Uuid,
    pub status: ReviewStatus,
    pub message: String,
    /// Released results; present only once approved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<SearchResult>>,
}

/// How a flag is presented to a particular caller
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReviewView {
    /// Reviewers and admins see everything, including the snapshot
    Full(ReviewFlag),
    Submitter(SubmitterStatus),
}

/// Flag counts per status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewStats {
    pub pending: usize,
    pub approved: usize,
    pub modified: usize,
    pub rejected: usize,
    pub total: usize,
}

impl ReviewStats {
    pub fn record(&mut self, status: ReviewStatus) {
        match status {
            ReviewStatus::Pending => self.pending += 1,
            ReviewStatus::Approved => self.approved += 1,
            ReviewStatus::Modified => self.modified += 1,
            ReviewStatus::Rejected => self.rejected += 1,
        }
        self.total += 1;
    }
}
