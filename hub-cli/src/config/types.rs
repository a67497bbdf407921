use std::path::PathBuf;

use hub_core::{AuditConfig, CacheConfig, CrossRefConfig, HubConfig, ReviewConfig, SearchConfig};
use hub_server::IdentityHeaders;
use serde::{Deserialize, Serialize};

/// Default host for the hub server
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default port for the hub server
pub const DEFAULT_PORT: u16 = 7480;

/// Configuration as stored in TOML files (with optional fields for merging)
///
/// Core sections overlay as a whole: a project file that names `[review]`
/// replaces the user's `[review]` entirely.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawCliConfig {
    #[serde(default)]
    pub server: RawServerConfig,

    #[serde(default)]
    pub identity: RawIdentityConfig,

    pub cache: Option<CacheConfig>,
    pub search: Option<SearchConfig>,
    pub review: Option<ReviewConfig>,
    pub crossref: Option<CrossRefConfig>,
    pub audit: Option<AuditConfig>,
}

/// Server config as stored in TOML (optional fields for proper merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// JSON file of documents to seed the in-memory backend
    pub documents: Option<PathBuf>,
}

/// Identity header names as stored in TOML
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawIdentityConfig {
    pub user: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub groups: Option<String>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CliConfig {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub identity: IdentityHeaders,

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

impl CliConfig {
    /// The core portion of the configuration
    pub fn hub_config(&self) -> HubConfig {
        HubConfig {
            cache: self.cache.clone(),
            search: self.search.clone(),
            review: self.review.clone(),
            crossref: self.crossref.clone(),
            audit: self.audit.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    /// Host address to bind to
    pub host: String,

    /// Port for the hub server
    pub port: u16,

    /// JSON file of documents to seed the in-memory backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<PathBuf>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            documents: None,
        }
    }
}
