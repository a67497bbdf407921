//! Search request and response types

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::agency::Agency;
use crate::config::SearchConfig;
use crate::document::SearchResult;
use crate::error::{HubError, HubResult};
use crate::review::PendingReviewNotice;

pub const NO_AGENCY_ACCESS: &str = "You don't have access to the requested agencies";

fn default_page() -> usize {
    1
}

/// A caller's search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    /// Agencies to search; omitted or empty means every entitled agency
    #[serde(default)]
    pub agencies: Option<Vec<Agency>>,
    /// 1-based page number
    #[serde(default = "default_page")]
    pub page: usize,
    /// 0 selects the configured default
    #[serde(default)]
    pub page_size: usize,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            agencies: None,
            page: 1,
            page_size: 0,
        }
    }

    pub fn with_agencies(mut self, agencies: impl IntoIterator<Item = Agency>) -> Self {
        self.agencies = Some(agencies.into_iter().collect());
        self
    }

    pub fn with_page(mut self, page: usize, page_size: usize) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }

    /// Reject empty queries and page 0
    pub fn validate(&self) -> HubResult<()> {
        if self.query.trim().is_empty() {
            return Err(HubError::Validation("query must not be empty".to_string()));
        }
        if self.page == 0 {
            return Err(HubError::Validation("page starts at 1".to_string()));
        }
        Ok(())
    }

    /// Page size after applying the configured default and ceiling
    pub fn effective_page_size(&self, config: &SearchConfig) -> usize {
        match self.page_size {
            0 => config.default_page_size,
            size => size.min(config.max_page_size),
        }
    }

    /// Explicitly requested agencies, if any
    pub fn requested_agencies(&self) -> Option<BTreeSet<Agency>> {
        self.agencies
            .as_ref()
            .filter(|agencies| !agencies.is_empty())
            .map(|agencies| agencies.iter().copied().collect())
    }
}

/// Results released to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    /// The requested page of visible results
    pub results: Vec<SearchResult>,
    /// Count of visible results across all pages
    pub total_results: usize,
    /// Agencies the caller named; empty when the request named none
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub requested_agencies: BTreeSet<Agency>,
    pub agencies_searched: BTreeSet<Agency>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    pub page: usize,
    pub page_size: usize,
}

impl SearchResponse {
    pub fn empty(query: impl Into<String>, page: usize, page_size: usize) -> Self {
        Self {
            query: query.into(),
            results: Vec::new(),
            total_results: 0,
            requested_agencies: BTreeSet::new(),
            agencies_searched: BTreeSet::new(),
            suggestions: Vec::new(),
            page,
            page_size,
        }
    }
}

/// What a search hands back: results, or a notice that they are withheld
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SearchOutcome {
    Released(SearchResponse),
    PendingReview(PendingReviewNotice),
}

impl SearchOutcome {
    pub fn is_pending_review(&self) -> bool {
        matches!(self, Self::PendingReview(_))
    }

    pub fn released(self) -> Option<SearchResponse> {
        match self {
            Self::Released(response) => Some(response),
            Self::PendingReview(_) => None,
        }
    }
}
