//! Route configuration.

use crate::api::handlers;
use crate::state::AppState;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use std::sync::Arc;

/// Creates the API router.
pub fn create_router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.server.max_upload_bytes;

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Statistics
        .route("/api/v1/stats", get(handlers::get_global_stats))
        // Datasets
        .route(
            "/api/v1/datasets",
            get(handlers::list_datasets).post(handlers::upload_dataset),
        )
        .route(
            "/api/v1/datasets/{id}",
            get(handlers::get_dataset).delete(handlers::delete_dataset),
        )
        .route(
            "/api/v1/datasets/{id}/expirations",
            get(handlers::list_expirations),
        )
        // Strike selection
        .route("/api/v1/datasets/{id}/strikes", get(handlers::get_strikes))
        .route(
            "/api/v1/datasets/{id}/crossings",
            get(handlers::get_crossings),
        )
        // Gamma profile
        .route("/api/v1/datasets/{id}/profile", get(handlers::get_profile))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
