//! Caller entitlement endpoints

use std::sync::Arc;

use axum::{Extension, Json, extract::State};
use hub_core::{Identity, UserEntitlements};

use crate::{AppState, error::ApiError};

/// GET /user/permissions - the caller's own entitlements
pub async fn permissions(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<UserEntitlements>, ApiError> {
    let entitlements = state.hub.entitlements(&identity).await?;
    Ok(Json(entitlements.as_ref().clone()))
}

/// POST /user/permissions/refresh - drop the cached entry and resolve again
pub async fn refresh_permissions(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<UserEntitlements>, ApiError> {
    let entitlements = state.hub.refresh_entitlements(&identity).await?;
    Ok(Json(entitlements.as_ref().clone()))
}
