//! Gamma Exposure Backend Server
//!
//! REST API server for uploading option-chain snapshots and querying their
//! gamma exposure.

use gamma_exposure_backend::api::create_router;
use gamma_exposure_backend::config::Config;
use gamma_exposure_backend::state::AppState;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use gamma_exposure_backend::error::ErrorResponse;
use gamma_exposure_backend::gex::{
    GammaProfilePoint, NormalizedStrikePoint, PayloadFormat, StrikeWindow, SymbolDecodeWarning,
};
use gamma_exposure_backend::models::{
    CrossingsResponse, DatasetSummary, DatasetsListResponse, ExpirationsListResponse,
    GlobalStatsResponse, HealthResponse, ProfileResponse, StrikesResponse, UploadResponse,
};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    paths(
        gamma_exposure_backend::api::handlers::health_check,
        gamma_exposure_backend::api::handlers::get_global_stats,
        gamma_exposure_backend::api::handlers::list_datasets,
        gamma_exposure_backend::api::handlers::upload_dataset,
        gamma_exposure_backend::api::handlers::get_dataset,
        gamma_exposure_backend::api::handlers::delete_dataset,
        gamma_exposure_backend::api::handlers::list_expirations,
        gamma_exposure_backend::api::handlers::get_strikes,
        gamma_exposure_backend::api::handlers::get_crossings,
        gamma_exposure_backend::api::handlers::get_profile,
    ),
    components(
        schemas(
            HealthResponse,
            GlobalStatsResponse,
            DatasetSummary,
            DatasetsListResponse,
            UploadResponse,
            ExpirationsListResponse,
            StrikesResponse,
            CrossingsResponse,
            ProfileResponse,
            ErrorResponse,
            NormalizedStrikePoint,
            GammaProfilePoint,
            StrikeWindow,
            PayloadFormat,
            SymbolDecodeWarning,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Statistics", description = "Global statistics"),
        (name = "Datasets", description = "Payload upload and dataset management"),
        (name = "Strikes", description = "Expiration and strike selection"),
        (name = "Profile", description = "Gamma exposure profile and flip point"),
    ),
    info(
        title = "Gamma Exposure API",
        version = "0.1.0",
        description = "REST API for gamma exposure aggregation of option-chain snapshots",
        license(name = "MIT"),
        contact(name = "Joaquin Bejar", email = "jb@taunais.com")
    )
)]
struct ApiDoc;

/// Loads configuration from `GEX_CONFIG` when set, then applies `HOST`/`PORT`.
fn load_config() -> anyhow::Result<Config> {
    let mut config = match std::env::var("GEX_CONFIG") {
        Ok(path) => {
            info!("Loading configuration from {}", path);
            Config::load(&path)?
        }
        Err(_) => {
            warn!("GEX_CONFIG not set, using default configuration");
            Config::default()
        }
    };

    if let Ok(host) = std::env::var("HOST") {
        config.server.host = host;
    }
    if let Ok(port) = std::env::var("PORT") {
        config.server.port = port
            .parse()
            .map_err(|e| anyhow::anyhow!("PORT must be a valid number: {}", e))?;
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config()?;
    let addr = format!("{}:{}", config.server.host, config.server.port);

    info!("Starting Gamma Exposure Backend on {}", addr);
    info!("Swagger UI available at http://{}/swagger-ui/", addr);

    // Create application state
    let state = Arc::new(AppState::from_config(config));

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the router
    let app = create_router(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http());

    // Start the server
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
