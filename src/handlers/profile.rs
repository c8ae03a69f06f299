// src/handlers/profile.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{error::AppError, services::LearningEngine};

/// Learner ids longer than this are rejected before touching the store.
const MAX_LEARNER_ID_LEN: usize = 128;

fn check_learner_id(learner_id: &str) -> Result<(), AppError> {
    if learner_id.trim().is_empty() || learner_id.len() > MAX_LEARNER_ID_LEN {
        return Err(AppError::BadRequest("Invalid learner id.".to_string()));
    }
    Ok(())
}

/// Get a learner's profile. Unknown learners get a fresh default profile.
pub async fn get_profile(
    State(engine): State<Arc<LearningEngine>>,
    Path(learner_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    check_learner_id(&learner_id)?;
    let profile = engine.get_profile(&learner_id).await?;
    Ok(Json(profile))
}

/// Detailed performance over the learner's recent quizzes.
pub async fn get_performance(
    State(engine): State<Arc<LearningEngine>>,
    Path(learner_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    check_learner_id(&learner_id)?;
    let report = engine.performance_report(&learner_id).await?;
    Ok(Json(report))
}
