//! In-memory search backend
//!
//! Scores documents by how many query terms appear in their title, keywords,
//! or content. Good enough for tests and demos; real deployments plug in a
//! search service behind [`SearchBackend`].

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{BackendQuery, SearchBackend};
use crate::document::{IndexedDocument, SearchResult};
use crate::error::{HubError, HubResult};
use crate::security::Predicate;

const SNIPPET_LEAD_WORDS: usize = 8;
const SNIPPET_WORDS: usize = 30;

#[derive(Default)]
pub struct MemorySearchBackend {
    documents: RwLock<HashMap<String, IndexedDocument>>,
}

impl MemorySearchBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(documents: impl IntoIterator<Item = IndexedDocument>) -> Self {
        let documents = documents
            .into_iter()
            .map(|doc| (doc.id.clone(), doc))
            .collect();
        Self {
            documents: RwLock::new(documents),
        }
    }

    /// Load a JSON array of documents
    pub fn load_json(path: impl AsRef<Path>) -> HubResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            HubError::Config(format!("failed to read documents file {:?}: {}", path, e))
        })?;
        let documents: Vec<IndexedDocument> = serde_json::from_str(&content)
            .map_err(|e| HubError::Config(format!("invalid documents file {:?}: {}", path, e)))?;
        Ok(Self::with_documents(documents))
    }

    pub async fn insert(&self, document: IndexedDocument) {
        self.documents
            .write()
            .await
            .insert(document.id.clone(), document);
    }

    pub async fn remove(&self, id: &str) -> Option<IndexedDocument> {
        self.documents.write().await.remove(id)
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

fn terms(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|term| term.len() > 1)
        .map(str::to_lowercase)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn score(document: &IndexedDocument, query_terms: &[String]) -> f64 {
    if query_terms.is_empty() {
        return 0.0;
    }

    let title = terms(&document.title);
    let keywords: BTreeSet<String> = document.keywords.iter().map(|k| k.to_lowercase()).collect();
    let content = terms(&document.content);

    let total: f64 = query_terms
        .iter()
        .map(|term| {
            if keywords.contains(term) || title.contains(term) {
                1.0
            } else if content.contains(term) {
                0.5
            } else {
                0.0
            }
        })
        .sum();

    total / query_terms.len() as f64
}

fn snippet(document: &IndexedDocument, query_terms: &[String]) -> String {
    let words: Vec<&str> = document.content.split_whitespace().collect();
    if words.is_empty() {
        return document.title.clone();
    }

    let hit = words
        .iter()
        .position(|word| {
            let word = word.to_lowercase();
            query_terms.iter().any(|term| word.contains(term.as_str()))
        })
        .unwrap_or(0);

    let start = hit.saturating_sub(SNIPPET_LEAD_WORDS);
    let end = (start + SNIPPET_WORDS).min(words.len());
    let mut text = words[start..end].join(" ");
    if start > 0 {
        text.insert_str(0, "...");
    }
    if end < words.len() {
        text.push_str("...");
    }
    text
}

#[async_trait]
impl SearchBackend for MemorySearchBackend {
    async fn search(
        &self,
        query: &BackendQuery,
        predicate: &Predicate,
    ) -> HubResult<Vec<SearchResult>> {
        let query_terms = terms(&query.text);
        let documents = self.documents.read().await;

        let mut results: Vec<SearchResult> = documents
            .values()
            .filter(|doc| query.agencies.is_empty() || query.agencies.contains(&doc.label.agency))
            .filter(|doc| predicate.matches(&doc.label))
            .filter_map(|doc| {
                let relevance = score(doc, &query_terms);
                (relevance > 0.0)
                    .then(|| SearchResult::from_document(doc, relevance, snippet(doc, &query_terms)))
            })
            .collect();

        results.sort_by(|a, b| {
            b.relevance_score
                .total_cmp(&a.relevance_score)
                .then_with(|| a.document_id.cmp(&b.document_id))
        });
        Ok(results)
    }

    async fn get_document(&self, id: &str) -> HubResult<Option<IndexedDocument>> {
        Ok(self.documents.read().await.get(id).cloned())
    }
}
