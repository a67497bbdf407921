//! HTTP server module

mod api;
mod audit;
mod reviews;
mod search;
mod user;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;
use crate::middleware::identity_middleware;

pub use api::HealthResponse;
pub use audit::{AuditQuery, AuditResponse};
pub use reviews::{ListReviewsQuery, ReviewListResponse};
pub use search::CrossReferenceParams;

/// Create the HTTP router with all routes configured
///
/// Everything except `/health` requires a caller identity.
pub fn create_router(state: Arc<AppState>) -> Router {
    let identified = Router::new()
        .route("/search", post(search::search))
        .route("/documents/:id", get(search::get_document))
        .route(
            "/documents/:id/cross-references",
            get(search::cross_references),
        )
        .route("/reviews", get(reviews::list_reviews))
        .route("/reviews/stats", get(reviews::review_stats))
        .route(
            "/reviews/:id",
            get(reviews::get_review).put(reviews::update_review),
        )
        .route("/user/permissions", get(user::permissions))
        .route("/user/permissions/refresh", post(user::refresh_permissions))
        .route("/audit", get(audit::audit_events))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            identity_middleware,
        ));

    Router::new()
        .route("/health", get(api::health))
        .merge(identified)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
