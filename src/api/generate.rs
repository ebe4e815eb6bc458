//! The `/generate` request orchestrator

use std::sync::Arc;

use axum::extract::{Json, State};
use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use crate::api::types::{GenerateRequest, GenerateResponse, GenerationParameters};
use crate::error::{AppError, Result};
use crate::params;
use crate::storage::{base64, OutputStore};
use crate::AppState;

/// Handle one generation request end to end: ensure the engine is loaded,
/// assign task identity, normalize parameters, generate, persist, and
/// assemble the response.
pub async fn handle_generate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>> {
    // An engine that failed to load fails every request fast with the
    // original error; nothing past this point runs.
    let engine = state.engine.ensure_ready().await?;

    let task_id = Uuid::new_v4();
    let timestamp = Utc::now();

    let config = params::resolve(&request)?;

    info!(
        task_id = %task_id,
        image_size = %config.image_size,
        steps = config.diff_infer_steps,
        seed = ?config.seed,
        bot_task = %config.bot_task,
        "Starting generation"
    );

    let image_bytes = engine.generate(&config).await.map_err(|e| {
        error!(task_id = %task_id, error = %e, "Generation failed");
        AppError::Generation {
            task_id: task_id.to_string(),
            message: e.to_string(),
        }
    })?;

    // The artifact exists only in memory here; a persistence failure must
    // reach the client rather than being dropped silently.
    let image_path = state
        .store
        .save(&task_id, &image_bytes)
        .await
        .map_err(|e| AppError::Generation {
            task_id: task_id.to_string(),
            message: format!("failed to persist artifact: {e}"),
        })?;

    let filename = OutputStore::filename_for(&task_id);
    info!(task_id = %task_id, path = %image_path.display(), "Artifact saved");

    // The artifact was just written; a read-back failure here is a server
    // fault, not a client-visible miss.
    let image_base64 = if request.return_base64 {
        let persisted =
            state
                .store
                .read(&filename)
                .await
                .map_err(|e| AppError::Generation {
                    task_id: task_id.to_string(),
                    message: format!("failed to read back artifact: {e}"),
                })?;
        Some(base64::encode(&persisted))
    } else {
        None
    };

    Ok(Json(GenerateResponse {
        task_id,
        image_url: format!("{}/{}", state.settings.storage.url_prefix, filename),
        image_path: image_path.display().to_string(),
        image_base64,
        prompt: config.prompt.clone(),
        parameters: GenerationParameters::from(&config),
        timestamp,
    }))
}
