//! Shared application state

use std::sync::Arc;

use chrono::{DateTime, Utc};
use hub_core::KnowledgeHub;

use crate::middleware::IdentityHeaders;

/// State shared by every handler
pub struct AppState {
    /// The access-controlled hub
    pub hub: Arc<KnowledgeHub>,
    /// Which gateway headers carry the caller identity
    pub identity_headers: IdentityHeaders,
    /// When the server started
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(hub: Arc<KnowledgeHub>) -> Self {
        Self {
            hub,
            identity_headers: IdentityHeaders::default(),
            started_at: Utc::now(),
        }
    }

    pub fn with_identity_headers(mut self, headers: IdentityHeaders) -> Self {
        self.identity_headers = headers;
        self
    }

    /// Returns how long the server has been running
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
