//! Audit trail endpoint

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use hub_core::{ActorId, AuditAction, AuditEvent, AuditFilter, HubError, Identity};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError};

const DEFAULT_LIMIT: usize = 100;

/// Query params for the audit trail
#[derive(Debug, Default, Deserialize)]
pub struct AuditQuery {
    pub user: Option<String>,
    pub action: Option<String>,
    pub limit: Option<usize>,
}

impl AuditQuery {
    fn into_filter(self) -> Result<AuditFilter, ApiError> {
        let action = self
            .action
            .as_deref()
            .map(|raw| raw.parse::<AuditAction>().map_err(HubError::Validation))
            .transpose()?;

        Ok(AuditFilter {
            actor: self.user.map(ActorId::User),
            action,
            limit: Some(self.limit.unwrap_or(DEFAULT_LIMIT)),
            ..Default::default()
        })
    }
}

#[derive(Debug, Serialize)]
pub struct AuditResponse {
    pub events: Vec<AuditEvent>,
    pub count: usize,
}

/// GET /audit - admins only
pub async fn audit_events(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<AuditResponse>, ApiError> {
    let filter = query.into_filter()?;
    let events = state.hub.audit_events(&identity, filter).await?;

    Ok(Json(AuditResponse {
        count: events.len(),
        events,
    }))
}
