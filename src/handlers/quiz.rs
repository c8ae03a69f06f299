// src/handlers/quiz.rs

use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};

use crate::{
    error::AppError,
    models::{question::GenerateQuizRequest, quiz_record::EvaluateQuizRequest},
    services::LearningEngine,
};

/// Generates a quiz adapted to the learner.
///
/// Always answers with a full quiz: when the generator is down or its output
/// is unusable the batch comes from the fallback bank (`is_fallback = true`).
pub async fn generate_quiz(
    State(engine): State<Arc<LearningEngine>>,
    Json(payload): Json<GenerateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let batch = engine.generate_quiz(payload).await?;
    Ok(Json(batch))
}

/// Scores a completed quiz, updates the learner's statistics and tier.
pub async fn evaluate_quiz(
    State(engine): State<Arc<LearningEngine>>,
    Json(payload): Json<EvaluateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = engine
        .evaluate_quiz(&payload.learner_id, payload.submission)
        .await?;
    Ok(Json(result))
}

/// Lists topics, their subtopics and the available levels.
pub async fn list_topics(State(engine): State<Arc<LearningEngine>>) -> impl IntoResponse {
    Json(engine.topics())
}
