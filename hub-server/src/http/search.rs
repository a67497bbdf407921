//! Search and document endpoints

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hub_core::{
    CrossReferenceOutcome, CrossReferenceQuery, Identity, IndexedDocument, RelationshipType,
    SearchOutcome, SearchRequest,
};
use serde::Deserialize;

use crate::{AppState, error::ApiError};

/// POST /search - 200 with results, or 202 while withheld for review
pub async fn search(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<SearchRequest>,
) -> Result<Response, ApiError> {
    let outcome = state.hub.search(&identity, &request).await?;

    Ok(match outcome {
        SearchOutcome::Released(response) => (StatusCode::OK, Json(response)).into_response(),
        SearchOutcome::PendingReview(notice) => {
            (StatusCode::ACCEPTED, Json(notice)).into_response()
        }
    })
}

/// GET /documents/:id - the redacted document, or 404 whether absent or denied
pub async fn get_document(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<IndexedDocument>, ApiError> {
    let document = state.hub.get_document(&identity, &id).await?;
    Ok(Json(document))
}

/// Query params for cross-reference lookup
#[derive(Debug, Default, Deserialize)]
pub struct CrossReferenceParams {
    pub max_results: Option<usize>,
    pub min_confidence: Option<f64>,
    /// Comma-separated relationship types
    pub relationship_types: Option<String>,
    pub include_same_agency: Option<bool>,
}

impl CrossReferenceParams {
    fn into_query(self, document_id: String) -> Result<CrossReferenceQuery, ApiError> {
        let relationship_types = match self.relationship_types {
            Some(raw) => Some(
                raw.split(',')
                    .map(str::trim)
                    .filter(|kind| !kind.is_empty())
                    .map(str::parse::<RelationshipType>)
                    .collect::<Result<BTreeSet<_>, _>>()?,
            ),
            None => None,
        };

        Ok(CrossReferenceQuery {
            document_id,
            max_results: self.max_results,
            min_confidence: self.min_confidence,
            relationship_types,
            include_same_agency: self.include_same_agency.unwrap_or(true),
        })
    }
}

/// GET /documents/:id/cross-references - 200 with references, or 202 while withheld for review
pub async fn cross_references(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Query(params): Query<CrossReferenceParams>,
) -> Result<Response, ApiError> {
    let query = params.into_query(id)?;
    let outcome = state.hub.find_related(&identity, &query).await?;

    Ok(match outcome {
        CrossReferenceOutcome::Released(response) => {
            (StatusCode::OK, Json(response)).into_response()
        }
        CrossReferenceOutcome::PendingReview(notice) => {
            (StatusCode::ACCEPTED, Json(notice)).into_response()
        }
    })
}
