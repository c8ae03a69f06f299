// src/handlers/generator.rs

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::services::LearningEngine;

/// Reports whether the text generator answers. 503 when it does not; quizzes
/// are still served from the fallback bank in that case.
pub async fn health(State(engine): State<Arc<LearningEngine>>) -> impl IntoResponse {
    let model = engine.generator_info().model;
    match engine.generator_health().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "healthy", "model": model })),
        ),
        Err(e) => {
            tracing::warn!("Generator health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unhealthy", "model": model, "error": e.to_string() })),
            )
        }
    }
}

pub async fn info(State(engine): State<Arc<LearningEngine>>) -> impl IntoResponse {
    Json(engine.generator_info())
}
