//! Cross-reference types

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::agency::Agency;
use crate::error::HubError;
use crate::review::PendingReviewNotice;

/// How two documents relate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipType {
    SimilarTopic,
    Dependency,
    Supersedes,
    /// Never inferred automatically; available to callers filtering by type
    Conflict,
    Related,
}

impl RelationshipType {
    pub const ALL: [RelationshipType; 5] = [
        RelationshipType::SimilarTopic,
        RelationshipType::Dependency,
        RelationshipType::Supersedes,
        RelationshipType::Conflict,
        RelationshipType::Related,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SimilarTopic => "SIMILAR_TOPIC",
            Self::Dependency => "DEPENDENCY",
            Self::Supersedes => "SUPERSEDES",
            Self::Conflict => "CONFLICT",
            Self::Related => "RELATED",
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipType {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == upper)
            .ok_or_else(|| HubError::Validation(format!("unknown relationship type: {}", s)))
    }
}

/// A classified link from a source document to a related one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossReference {
    pub source_document_id: String,
    pub source_agency: Agency,
    pub related_document_id: String,
    pub related_agency: Agency,
    pub related_title: String,
    pub relationship_type: RelationshipType,
    /// In [0, 1]
    pub confidence_score: f64,
    pub citation: String,
}

/// Parameters for a related-document lookup; unset limits use the configured
/// defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossReferenceQuery {
    pub document_id: String,
    #[serde(default)]
    pub max_results: Option<usize>,
    #[serde(default)]
    pub min_confidence: Option<f64>,
    #[serde(default)]
    pub relationship_types: Option<BTreeSet<RelationshipType>>,
    #[serde(default = "default_include_same_agency")]
    pub include_same_agency: bool,
}

fn default_include_same_agency() -> bool {
    true
}

impl CrossReferenceQuery {
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            max_results: None,
            min_confidence: None,
            relationship_types: None,
            include_same_agency: true,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }

    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = Some(min_confidence);
        self
    }

    pub fn with_types(mut self, types: impl IntoIterator<Item = RelationshipType>) -> Self {
        self.relationship_types = Some(types.into_iter().collect());
        self
    }

    pub fn other_agencies_only(mut self) -> Self {
        self.include_same_agency = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossReferenceResponse {
    pub source_document_id: String,
    pub source_agency: Agency,
    pub references: Vec<CrossReference>,
    pub agencies_involved: BTreeSet<Agency>,
}

/// What a cross-reference lookup hands back: references, or a notice that
/// they are withheld for review
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CrossReferenceOutcome {
    Released(CrossReferenceResponse),
    PendingReview(PendingReviewNotice),
}

impl CrossReferenceOutcome {
    pub fn is_pending_review(&self) -> bool {
        matches!(self, Self::PendingReview(_))
    }

    pub fn released(self) -> Option<CrossReferenceResponse> {
        match self {
            Self::Released(response) => Some(response),
            Self::PendingReview(_) => None,
        }
    }
}
