//! API request handlers.

use crate::error::ApiError;
use crate::gex::{
    GexError, ProcessedDataset, StrikeWindow, exposure_curve, process_payload, select_strikes,
    strike_crossings,
};
use crate::models::{
    CrossingsResponse, DatasetSummary, DatasetsListResponse, ExpirationsListResponse,
    GlobalStatsResponse, HealthResponse, ProfileQuery, ProfileResponse, StrikeQuery,
    StrikesResponse, UploadResponse,
};
use crate::state::{AppState, StoredDataset};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Resolves a dataset id from the path.
fn find_dataset(state: &AppState, id: &str) -> Result<Arc<StoredDataset>, ApiError> {
    Uuid::parse_str(id)
        .ok()
        .and_then(|uuid| state.get(&uuid))
        .ok_or_else(|| ApiError::DatasetNotFound(id.to_string()))
}

/// Strike window from optional bounds, falling back to the configured
/// fractions of the underlying price.
fn resolve_window(
    state: &AppState,
    dataset: &ProcessedDataset,
    min_strike: Option<f64>,
    max_strike: Option<f64>,
) -> Result<StrikeWindow, GexError> {
    let profile = &state.config.profile;
    let default = StrikeWindow::around(
        dataset.underlying_price,
        profile.window_lower,
        profile.window_upper,
    )?;
    StrikeWindow::new(
        min_strike.unwrap_or(default.min),
        max_strike.unwrap_or(default.max),
    )
}

// ============================================================================
// Health Check
// ============================================================================

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Global Statistics
// ============================================================================

/// Get global statistics.
#[utoipa::path(
    get,
    path = "/api/v1/stats",
    responses(
        (status = 200, description = "Global statistics", body = GlobalStatsResponse)
    ),
    tag = "Statistics"
)]
pub async fn get_global_stats(State(state): State<Arc<AppState>>) -> Json<GlobalStatsResponse> {
    Json(state.stats())
}

// ============================================================================
// Dataset Management
// ============================================================================

/// List all datasets.
#[utoipa::path(
    get,
    path = "/api/v1/datasets",
    responses(
        (status = 200, description = "List of datasets", body = DatasetsListResponse)
    ),
    tag = "Datasets"
)]
pub async fn list_datasets(State(state): State<Arc<AppState>>) -> Json<DatasetsListResponse> {
    Json(DatasetsListResponse {
        datasets: state.summaries(),
    })
}

/// Upload a legacy or snapshot payload.
///
/// The body is detected, validated and aggregated; the dataset is stored
/// only when aggregation succeeds.
#[utoipa::path(
    post,
    path = "/api/v1/datasets",
    request_body(content = String, description = "Raw legacy or snapshot JSON", content_type = "application/json"),
    responses(
        (status = 201, description = "Dataset created", body = UploadResponse),
        (status = 400, description = "Payload rejected", body = crate::error::ErrorResponse)
    ),
    tag = "Datasets"
)]
pub async fn upload_dataset(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    debug!("Received payload of {} bytes", body.len());

    let aggregation = tokio::task::spawn_blocking(move || process_payload(&body))
        .await
        .map_err(|e| ApiError::Internal(format!("aggregation task failed: {}", e)))?
        .inspect_err(|e| warn!("Rejected payload: {}", e))?;

    let stored = state.insert(aggregation.dataset);
    info!(
        "Uploaded dataset {} for {} with {} warnings",
        stored.id,
        stored.dataset.symbol,
        aggregation.warnings.len()
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            dataset: stored.summary(),
            warnings: aggregation.warnings,
            skipped_records: aggregation.skipped_records,
        }),
    ))
}

/// Get dataset details.
#[utoipa::path(
    get,
    path = "/api/v1/datasets/{id}",
    params(
        ("id" = String, Path, description = "Dataset identifier")
    ),
    responses(
        (status = 200, description = "Dataset details", body = DatasetSummary),
        (status = 404, description = "Dataset not found")
    ),
    tag = "Datasets"
)]
pub async fn get_dataset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DatasetSummary>, ApiError> {
    let stored = find_dataset(&state, &id)?;
    Ok(Json(stored.summary()))
}

/// Delete a dataset.
#[utoipa::path(
    delete,
    path = "/api/v1/datasets/{id}",
    params(
        ("id" = String, Path, description = "Dataset identifier")
    ),
    responses(
        (status = 200, description = "Dataset deleted"),
        (status = 404, description = "Dataset not found")
    ),
    tag = "Datasets"
)]
pub async fn delete_dataset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let removed = Uuid::parse_str(&id)
        .map(|uuid| state.remove(&uuid))
        .unwrap_or(false);
    if removed {
        Ok(Json(serde_json::json!({
            "message": format!("Dataset {} deleted", id)
        })))
    } else {
        Err(ApiError::DatasetNotFound(id))
    }
}

/// List expirations of a dataset.
#[utoipa::path(
    get,
    path = "/api/v1/datasets/{id}/expirations",
    params(
        ("id" = String, Path, description = "Dataset identifier")
    ),
    responses(
        (status = 200, description = "List of expirations", body = ExpirationsListResponse),
        (status = 404, description = "Dataset not found")
    ),
    tag = "Datasets"
)]
pub async fn list_expirations(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ExpirationsListResponse>, ApiError> {
    let stored = find_dataset(&state, &id)?;
    Ok(Json(ExpirationsListResponse {
        expirations: stored.dataset.expirations.clone(),
    }))
}

// ============================================================================
// Strike Selection
// ============================================================================

/// Filtered strikes of a dataset.
#[utoipa::path(
    get,
    path = "/api/v1/datasets/{id}/strikes",
    params(
        ("id" = String, Path, description = "Dataset identifier"),
        ("expirations" = Option<String>, Query, description = "Comma-separated expirations (default: all)"),
        ("min_strike" = Option<f64>, Query, description = "Minimum strike"),
        ("max_strike" = Option<f64>, Query, description = "Maximum strike")
    ),
    responses(
        (status = 200, description = "Strike points, highest first", body = StrikesResponse),
        (status = 400, description = "Invalid window"),
        (status = 404, description = "Dataset not found")
    ),
    tag = "Strikes"
)]
pub async fn get_strikes(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<StrikeQuery>,
) -> Result<Json<StrikesResponse>, ApiError> {
    let stored = find_dataset(&state, &id)?;
    let dataset = &stored.dataset;
    let window = resolve_window(&state, dataset, query.min_strike, query.max_strike)?;
    let expirations = query.selected_expirations(&dataset.expirations);
    let points = select_strikes(dataset, &expirations, window);

    Ok(Json(StrikesResponse {
        window,
        expirations,
        points,
    }))
}

/// Strikes preceding each sign change of the filtered exposure.
#[utoipa::path(
    get,
    path = "/api/v1/datasets/{id}/crossings",
    params(
        ("id" = String, Path, description = "Dataset identifier"),
        ("expirations" = Option<String>, Query, description = "Comma-separated expirations (default: all)"),
        ("min_strike" = Option<f64>, Query, description = "Minimum strike"),
        ("max_strike" = Option<f64>, Query, description = "Maximum strike")
    ),
    responses(
        (status = 200, description = "Crossing strikes, ascending", body = CrossingsResponse),
        (status = 400, description = "Invalid window"),
        (status = 404, description = "Dataset not found")
    ),
    tag = "Strikes"
)]
pub async fn get_crossings(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<StrikeQuery>,
) -> Result<Json<CrossingsResponse>, ApiError> {
    let stored = find_dataset(&state, &id)?;
    let dataset = &stored.dataset;
    let window = resolve_window(&state, dataset, query.min_strike, query.max_strike)?;
    let expirations = query.selected_expirations(&dataset.expirations);
    let points = select_strikes(dataset, &expirations, window);

    Ok(Json(CrossingsResponse {
        window,
        crossings: strike_crossings(&exposure_curve(&points)),
    }))
}

// ============================================================================
// Gamma Profile
// ============================================================================

/// Gamma exposure profile across hypothetical spot levels.
#[utoipa::path(
    get,
    path = "/api/v1/datasets/{id}/profile",
    params(
        ("id" = String, Path, description = "Dataset identifier"),
        ("min_strike" = Option<f64>, Query, description = "Lowest spot level"),
        ("max_strike" = Option<f64>, Query, description = "Highest spot level"),
        ("levels" = Option<usize>, Query, description = "Number of spot levels"),
        ("as_of" = Option<String>, Query, description = "Valuation date, YYYY-MM-DD (default: today)")
    ),
    responses(
        (status = 200, description = "Gamma profile", body = ProfileResponse),
        (status = 400, description = "Invalid window, or level count outside 2..=max_levels"),
        (status = 404, description = "Dataset not found")
    ),
    tag = "Profile"
)]
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<ProfileQuery>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let stored = find_dataset(&state, &id)?;
    let window = resolve_window(&state, &stored.dataset, query.min_strike, query.max_strike)?;
    let as_of = query.as_of.unwrap_or_else(|| chrono::Utc::now().date_naive());
    let builder = state.config.profile.builder(query.levels);

    let symbol = stored.dataset.symbol.clone();
    let profile = tokio::task::spawn_blocking(move || {
        builder.build(&stored.dataset.points, window, as_of)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("profile task failed: {}", e)))?
    .inspect_err(|e| warn!("Rejected profile request: {}", e))?;

    Ok(Json(ProfileResponse {
        symbol,
        as_of,
        window,
        points: profile.points,
        flip_point: profile.flip_point,
        nearest_expiration: profile.nearest_expiration,
        nearest_monthly_expiration: profile.nearest_monthly_expiration,
    }))
}
