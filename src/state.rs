// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::services::LearningEngine;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<LearningEngine>,
}

impl FromRef<AppState> for Arc<LearningEngine> {
    fn from_ref(state: &AppState) -> Self {
        state.engine.clone()
    }
}
