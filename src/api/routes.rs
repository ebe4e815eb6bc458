//! Router assembly and the read-only handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::api::generate::handle_generate;
use crate::api::types::HealthResponse;
use crate::engine::capabilities;
use crate::error::Result;
use crate::AppState;

/// Build the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/generate", post(handle_generate))
        .route("/images/:filename", get(get_image))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Service metadata
async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "txt2img-api",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "generate": "/generate",
            "images": "/images/{filename}",
        },
    }))
}

/// Health check. A pure read of engine state and accelerator enumeration;
/// must never trigger a load.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        model_loaded: state.engine.is_loaded().await,
        gpu_available: capabilities::accelerator_available(),
        model_path: state.settings.engine.model_path.clone(),
    })
}

/// Fetch a generated artifact by filename
async fn get_image(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse> {
    let bytes = state.store.read(&filename).await?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "image/png")],
        bytes,
    ))
}
