//! SearchBackend trait and related types
//!
//! The backend owns the agency-partitioned document store. The core only
//! calls into it and never trusts it as the sole access gate.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::agency::Agency;
use crate::document::{IndexedDocument, SearchResult};
use crate::error::HubResult;
use crate::security::Predicate;

/// What to search for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendQuery {
    /// Free-text query
    pub text: String,
    /// Agencies to search; empty means no agency restriction beyond the predicate
    pub agencies: BTreeSet<Agency>,
}

impl BackendQuery {
    pub fn new(text: impl Into<String>, agencies: BTreeSet<Agency>) -> Self {
        Self {
            text: text.into(),
            agencies,
        }
    }
}

/// Keyword/vector search over the document store
///
/// Failures must surface as [`crate::HubError::BackendUnavailable`]; the core
/// does not retry.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Ranked results for the query, with the predicate applied as best the
    /// backend can
    async fn search(
        &self,
        query: &BackendQuery,
        predicate: &Predicate,
    ) -> HubResult<Vec<SearchResult>>;

    /// Fetch one document by id
    async fn get_document(&self, id: &str) -> HubResult<Option<IndexedDocument>>;
}
