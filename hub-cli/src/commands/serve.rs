//! Hub serve command
//!
//! Builds a [`KnowledgeHub`] from the merged configuration, seeds the
//! in-memory backend from a documents file when one is given, and serves the
//! HTTP API until interrupted.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use hub_core::{KnowledgeHub, MemorySearchBackend};
use hub_server::{HubServer, ServerConfig};
use tracing::{info, warn};

use crate::config::{CliConfig, ConfigLoader};

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind to (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// JSON file of documents for the in-memory backend (overrides config)
    #[arg(short, long)]
    pub documents: Option<PathBuf>,
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    let config = apply_overrides(ConfigLoader::load()?, &args);

    let backend = match &config.server.documents {
        Some(path) => MemorySearchBackend::load_json(path)
            .with_context(|| format!("failed to load documents from {}", path.display()))?,
        None => {
            warn!("No documents file configured; serving an empty index");
            MemorySearchBackend::new()
        }
    };
    info!(documents = backend.len().await, "Search index ready");

    let hub = KnowledgeHub::builder(config.hub_config(), Arc::new(backend))
        .build()
        .context("invalid hub configuration")?;

    let mut server_config = ServerConfig::new(config.server.host.clone(), config.server.port);
    server_config.identity = config.identity.clone();

    info!("Starting knowledge hub on {}", server_config.addr());
    HubServer::new(server_config, Arc::new(hub))
        .run()
        .await
        .map_err(Into::into)
}

fn apply_overrides(mut config: CliConfig, args: &ServeArgs) -> CliConfig {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(documents) = &args.documents {
        config.server.documents = Some(documents.clone());
    }
    config
}
