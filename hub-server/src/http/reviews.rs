//! Review workflow endpoints

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use hub_core::{
    HubError, Identity, ReviewDecision, ReviewFlag, ReviewStats, ReviewStatus, ReviewView,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

fn parse_review_id(raw: &str) -> Result<Uuid, ApiError> {
    raw.parse()
        .map_err(|_| HubError::Validation(format!("invalid review id: {}", raw)).into())
}

/// Query params for review list
#[derive(Debug, Deserialize)]
pub struct ListReviewsQuery {
    pub status: Option<String>,
}

/// Response for listing review flags
#[derive(Debug, Serialize)]
pub struct ReviewListResponse {
    pub reviews: Vec<ReviewFlag>,
    pub total: usize,
}

/// GET /reviews - reviewers and admins only
pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<ListReviewsQuery>,
) -> Result<Json<ReviewListResponse>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<ReviewStatus>)
        .transpose()?;
    let reviews = state.hub.list_reviews(&identity, status).await?;

    Ok(Json(ReviewListResponse {
        total: reviews.len(),
        reviews,
    }))
}

/// GET /reviews/stats - reviewers and admins only
pub async fn review_stats(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<ReviewStats>, ApiError> {
    Ok(Json(state.hub.review_stats(&identity).await?))
}

/// GET /reviews/:id - full flag for reviewers, status notice for the submitter
pub async fn get_review(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<ReviewView>, ApiError> {
    let id = parse_review_id(&id)?;
    Ok(Json(state.hub.review(&identity, id).await?))
}

/// PUT /reviews/:id - record a reviewer decision
pub async fn update_review(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Json(decision): Json<ReviewDecision>,
) -> Result<Json<ReviewFlag>, ApiError> {
    let id = parse_review_id(&id)?;
    Ok(Json(state.hub.update_review(&identity, id, decision).await?))
}
