//! Documents and search results as seen by the access layer

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agency::{Agency, ClassificationLevel};

/// Access-relevant metadata carried by every document and result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessLabel {
    pub agency: Agency,
    pub classification: ClassificationLevel,
    #[serde(default)]
    pub allowed_groups: BTreeSet<String>,
}

impl AccessLabel {
    pub fn new(agency: Agency, classification: ClassificationLevel) -> Self {
        Self {
            agency,
            classification,
            allowed_groups: BTreeSet::new(),
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.allowed_groups.insert(group.into());
        self
    }
}

/// Anything the security filter can judge
pub trait Labeled {
    fn label(&self) -> &AccessLabel;
}

/// Backend-defined extra fields, some of which are tiered
///
/// `internal` and `restricted` name keys of `values` that must be stripped
/// for users below INTERNAL and RESTRICTED respectively.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentFields {
    #[serde(default)]
    pub values: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub internal: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub restricted: BTreeSet<String>,
}

impl DocumentFields {
    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.values.insert(key.into(), value);
    }

    pub fn insert_internal(&mut self, key: impl Into<String>, value: serde_json::Value) {
        let key = key.into();
        self.internal.insert(key.clone());
        self.values.insert(key, value);
    }

    pub fn insert_restricted(&mut self, key: impl Into<String>, value: serde_json::Value) {
        let key = key.into();
        self.restricted.insert(key.clone());
        self.values.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }
}

/// A document as stored by the search backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedDocument {
    pub id: String,
    #[serde(flatten)]
    pub label: AccessLabel,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub fields: DocumentFields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl IndexedDocument {
    pub fn new(
        id: impl Into<String>,
        agency: Agency,
        classification: ClassificationLevel,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: AccessLabel::new(agency, classification),
            title: title.into(),
            content: String::new(),
            keywords: Vec::new(),
            fields: DocumentFields::default(),
            updated_at: None,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.label.allowed_groups.insert(group.into());
        self
    }

    pub fn with_fields(mut self, fields: DocumentFields) -> Self {
        self.fields = fields;
        self
    }

    pub fn agency(&self) -> Agency {
        self.label.agency
    }

    pub fn classification(&self) -> ClassificationLevel {
        self.label.classification
    }
}

impl Labeled for IndexedDocument {
    fn label(&self) -> &AccessLabel {
        &self.label
    }
}

/// One hit returned by a search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub document_id: String,
    #[serde(flatten)]
    pub label: AccessLabel,
    pub title: String,
    /// Relevance in [0, 1]
    pub relevance_score: f64,
    pub snippet: String,
    pub citation: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub fields: DocumentFields,
}

impl SearchResult {
    /// Build a result for a document with the given score and snippet
    pub fn from_document(document: &IndexedDocument, relevance_score: f64, snippet: String) -> Self {
        Self {
            document_id: document.id.clone(),
            label: document.label.clone(),
            title: document.title.clone(),
            relevance_score: relevance_score.clamp(0.0, 1.0),
            snippet,
            citation: citation_for(document),
            keywords: document.keywords.clone(),
            fields: document.fields.clone(),
        }
    }

    pub fn agency(&self) -> Agency {
        self.label.agency
    }
}

impl Labeled for SearchResult {
    fn label(&self) -> &AccessLabel {
        &self.label
    }
}

/// Human-readable source reference for a document
pub fn citation_for(document: &IndexedDocument) -> String {
    format!(
        "{}: {} [{}]",
        document.label.agency.full_name(),
        document.title,
        document.id
    )
}
