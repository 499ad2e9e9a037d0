//! HTTP request handlers

use std::sync::Arc;
use axum::{extract::State, Json};
use tracing::info;

use crate::service::{model_catalogue, ModelInfo, TrainRequest};
use crate::training::ModelResult;

use super::error::Result;
use super::state::AppState;

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "message": "hevea-ml training service is running",
        "version": env!("CARGO_PKG_VERSION"),
        "startedAt": state.started_at.to_rfc3339(),
    }))
}

pub async fn list_models() -> Json<Vec<ModelInfo>> {
    Json(model_catalogue())
}

/// Train the requested models and return their results, best first
///
/// Training runs on the blocking pool; the request is validated first so
/// bad input never occupies a worker.
pub async fn train_models(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TrainRequest>,
) -> Result<Json<Vec<ModelResult>>> {
    request.validate()?;
    info!(
        samples = request.features.len(),
        models = ?request.models,
        cv_folds = request.cross_validation,
        "Training request received"
    );

    let backend = Arc::clone(&state.backend);
    let results = tokio::task::spawn_blocking(move || backend.train(&request)).await??;
    Ok(Json(results))
}
