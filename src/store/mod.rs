// src/store/mod.rs

//! Persistence of learner profiles and their quiz history.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    profile::LearnerProfile,
    quiz_record::{ProfileUpdate, QuizRecord},
};

pub use memory::MemoryProficiencyStore;
pub use postgres::PgProficiencyStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("corrupt stored data: {0}")]
    Corrupt(String),
}

/// Computes the new profile from the current one and the recent window.
///
/// The window is most-recent-first and already contains the record being
/// submitted.
pub type SubmissionStep<'a> =
    dyn Fn(LearnerProfile, &[QuizRecord]) -> ProfileUpdate + Send + Sync + 'a;

#[async_trait]
pub trait ProficiencyStore: Send + Sync {
    /// Returns the learner's profile, creating a default one on first access.
    async fn get_profile(&self, learner_id: &str) -> Result<LearnerProfile, StoreError>;

    /// Most recent records first, at most `limit`.
    async fn recent_quizzes(
        &self,
        learner_id: &str,
        limit: usize,
    ) -> Result<Vec<QuizRecord>, StoreError>;

    /// Appends `record` and rewrites the learner's profile with the result of
    /// `step`, atomically per learner.
    async fn apply_submission(
        &self,
        record: QuizRecord,
        window: usize,
        step: &SubmissionStep<'_>,
    ) -> Result<ProfileUpdate, StoreError>;
}
