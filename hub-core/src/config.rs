//! Configuration for the hub core
//!
//! Every section deserializes from TOML with per-field defaults, so a partial
//! file only overrides what it names.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HubError, HubResult};

/// Complete core configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HubConfig {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub review: ReviewConfig,
    #[serde(default)]
    pub crossref: CrossRefConfig,
    #[serde(default)]
    pub audit: AuditConfig,
}

/// Longest entitlement cache lifetime accepted (30 days)
pub const MAX_TTL_SECONDS: u64 = 30 * 24 * 60 * 60;

/// Entitlement cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Seconds an entry stays valid after it was resolved
    pub ttl_seconds: u64,
    /// Upper bound on cached users
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 300,
            max_entries: 10_000,
        }
    }
}

/// Search paging limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

/// Human review escalation criteria
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Master switch for the review gate
    pub enabled: bool,
    /// Flag searches spanning at least this many agencies (`None` disables)
    pub multi_agency_threshold: Option<usize>,
    /// Case-insensitive substrings that flag a query
    pub sensitive_keywords: Vec<String>,
    /// Flag when mean relevance falls below this (`None` disables)
    pub min_confidence_threshold: Option<f64>,
    /// Case-insensitive topic substrings that flag a query
    pub flagged_topics: Vec<String>,
    /// Shown to users whose query is awaiting review
    pub estimated_review_time: String,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            multi_agency_threshold: Some(3),
            sensitive_keywords: vec![
                "confidential".to_string(),
                "classified".to_string(),
                "investigation".to_string(),
                "personnel".to_string(),
                "ssn".to_string(),
            ],
            min_confidence_threshold: None,
            flagged_topics: Vec::new(),
            estimated_review_time: "24 hours".to_string(),
        }
    }
}

/// Cross-reference defaults applied when a request leaves them unset
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossRefConfig {
    pub max_results: usize,
    pub min_confidence: f64,
    /// How many source keywords seed the related-document search
    pub keyword_seed_count: usize,
}

impl Default for CrossRefConfig {
    fn default() -> Self {
        Self {
            max_results: 10,
            min_confidence: 0.3,
            keyword_seed_count: 5,
        }
    }
}

/// Audit sink selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditConfig {
    /// JSONL file to append to; in-memory when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl HubConfig {
    /// Parse from a TOML string
    pub fn from_toml(content: &str) -> HubResult<Self> {
        let config: HubConfig = toml::from_str(content)
            .map_err(|e| HubError::Config(format!("invalid config TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> HubResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            HubError::Config(format!("failed to read config file {:?}: {}", path, e))
        })?;
        Self::from_toml(&content)
    }

    /// Check settings for consistency
    pub fn validate(&self) -> HubResult<()> {
        if self.cache.ttl_seconds == 0 {
            return Err(HubError::Config("cache.ttl_seconds must be positive".into()));
        }
        if self.cache.ttl_seconds > MAX_TTL_SECONDS {
            return Err(HubError::Config(format!(
                "cache.ttl_seconds must not exceed {}",
                MAX_TTL_SECONDS
            )));
        }
        if self.cache.max_entries == 0 {
            return Err(HubError::Config("cache.max_entries must be positive".into()));
        }
        if self.search.default_page_size == 0 {
            return Err(HubError::Config(
                "search.default_page_size must be positive".into(),
            ));
        }
        if self.search.default_page_size > self.search.max_page_size {
            return Err(HubError::Config(
                "search.default_page_size exceeds search.max_page_size".into(),
            ));
        }
        if self.review.multi_agency_threshold == Some(0) {
            return Err(HubError::Config(
                "review.multi_agency_threshold must be positive".into(),
            ));
        }
        if let Some(threshold) = self.review.min_confidence_threshold {
            check_unit_interval("review.min_confidence_threshold", threshold)?;
        }
        check_unit_interval("crossref.min_confidence", self.crossref.min_confidence)?;
        Ok(())
    }
}

fn check_unit_interval(name: &str, value: f64) -> HubResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(HubError::Config(format!("{} must be within [0, 1]", name)))
    }
}
