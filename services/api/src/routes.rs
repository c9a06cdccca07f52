//! API service routes

use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    routing::get,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::warn;

use crate::{error::ApiError, response::ApiResponse, state::AppState};

pub mod photos;
pub mod users;

const SERVICE_NAME: &str = "Photos API is running";

/// Headroom above the upload limit for multipart framing and form fields
const BODY_OVERHEAD: usize = 1024 * 1024;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.photos.uploads().max_file_size() + BODY_OVERHEAD;
    let uploads = ServeDir::new(state.photos.uploads().uploads_dir());

    let api = Router::new()
        .route("/health", get(health_check))
        .merge(users::router(state.clone()))
        .merge(photos::router(state.clone()));

    Router::new()
        .route("/", get(index))
        .nest("/api", api)
        .nest_service("/uploads", uploads)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Service banner
pub async fn index() -> ApiResponse<serde_json::Value> {
    ApiResponse::ok(
        SERVICE_NAME,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "health": "/api/health",
                "photos": "/api/photos",
                "randomPhoto": "/api/photos/random",
            }
        }),
    )
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> ApiResponse<serde_json::Value> {
    let storage = match state.store.health_check().await {
        Ok(true) => "ok",
        Ok(false) => "unavailable",
        Err(e) => {
            warn!("Storage health check failed: {}", e);
            "unavailable"
        }
    };

    ApiResponse::ok(
        SERVICE_NAME,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "storage": storage,
        }),
    )
}

pub async fn not_found() -> ApiError {
    ApiError::RouteNotFound
}
