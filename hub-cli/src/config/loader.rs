use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use hub_server::IdentityHeaders;

use super::types::{
    CliConfig, DEFAULT_HOST, DEFAULT_PORT, RawCliConfig, RawIdentityConfig, RawServerConfig,
    ServerSection,
};

/// Environment variable overriding the project config directory
pub const PROJECT_CONFIG_DIR_ENV: &str = "HUB_PROJECT_CONFIG_DIR";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project)
    pub fn load() -> Result<CliConfig> {
        let mut layers = Vec::new();
        if let Some(user_path) = Self::user_config_path() {
            layers.push(user_path);
        }
        layers.push(Self::project_config_path());

        Self::load_layers(&layers)
    }

    /// Load a single config file, falling back to defaults when absent
    pub fn load_from_path(path: &Path) -> Result<CliConfig> {
        Self::load_layers(&[path.to_path_buf()])
    }

    /// Merge each existing file over the previous ones, in order
    pub fn load_layers(paths: &[PathBuf]) -> Result<CliConfig> {
        let mut raw = RawCliConfig::default();

        for path in paths {
            if !path.exists() {
                continue;
            }
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let layer: RawCliConfig = toml::from_str(&contents)
                .with_context(|| format!("invalid config in {}", path.display()))?;
            tracing::debug!(path = %path.display(), "Loaded config layer");
            raw = Self::merge_raw(raw, layer);
        }

        Ok(Self::finalize(raw))
    }

    /// Get user config path (platform-specific)
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "hub").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get project config path
    /// Can be overridden with HUB_PROJECT_CONFIG_DIR
    pub fn project_config_path() -> PathBuf {
        match std::env::var(PROJECT_CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir).join("config.toml"),
            Err(_) => PathBuf::from(".hub/config.toml"),
        }
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawCliConfig, overlay: RawCliConfig) -> RawCliConfig {
        RawCliConfig {
            server: RawServerConfig {
                host: overlay.server.host.or(base.server.host),
                port: overlay.server.port.or(base.server.port),
                documents: overlay.server.documents.or(base.server.documents),
            },
            identity: RawIdentityConfig {
                user: overlay.identity.user.or(base.identity.user),
                email: overlay.identity.email.or(base.identity.email),
                name: overlay.identity.name.or(base.identity.name),
                groups: overlay.identity.groups.or(base.identity.groups),
            },
            cache: overlay.cache.or(base.cache),
            search: overlay.search.or(base.search),
            review: overlay.review.or(base.review),
            crossref: overlay.crossref.or(base.crossref),
            audit: overlay.audit.or(base.audit),
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawCliConfig) -> CliConfig {
        let headers = IdentityHeaders::default();

        CliConfig {
            server: ServerSection {
                host: raw.server.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: raw.server.port.unwrap_or(DEFAULT_PORT),
                documents: raw.server.documents,
            },
            identity: IdentityHeaders {
                user: raw.identity.user.unwrap_or(headers.user),
                email: raw.identity.email.unwrap_or(headers.email),
                name: raw.identity.name.unwrap_or(headers.name),
                groups: raw.identity.groups.unwrap_or(headers.groups),
            },
            cache: raw.cache.unwrap_or_default(),
            search: raw.search.unwrap_or_default(),
            review: raw.review.unwrap_or_default(),
            crossref: raw.crossref.unwrap_or_default(),
            audit: raw.audit.unwrap_or_default(),
        }
    }
}
