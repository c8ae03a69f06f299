// src/store/memory.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{ProficiencyStore, StoreError, SubmissionStep};
use crate::models::{
    profile::LearnerProfile,
    quiz_record::{ProfileUpdate, QuizRecord},
};

#[derive(Debug, Default)]
struct LearnerEntry {
    profile: Option<LearnerProfile>,
    /// Oldest first.
    records: Vec<QuizRecord>,
}

/// Process-local store. The write lock is held for the whole submission step,
/// which makes each submission atomic.
#[derive(Debug, Default)]
pub struct MemoryProficiencyStore {
    learners: RwLock<HashMap<String, LearnerEntry>>,
}

impl MemoryProficiencyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces a learner's profile. Meant for seeding.
    pub async fn insert_profile(&self, profile: LearnerProfile) {
        let learner_id = profile.learner_id.clone();
        let mut learners = self.learners.write().await;
        learners.entry(learner_id).or_default().profile = Some(profile);
    }
}

#[async_trait]
impl ProficiencyStore for MemoryProficiencyStore {
    async fn get_profile(&self, learner_id: &str) -> Result<LearnerProfile, StoreError> {
        if let Some(profile) = self
            .learners
            .read()
            .await
            .get(learner_id)
            .and_then(|e| e.profile.clone())
        {
            return Ok(profile);
        }

        let mut learners = self.learners.write().await;
        let entry = learners.entry(learner_id.to_string()).or_default();
        let profile = entry
            .profile
            .get_or_insert_with(|| LearnerProfile::new(learner_id));
        Ok(profile.clone())
    }

    async fn recent_quizzes(
        &self,
        learner_id: &str,
        limit: usize,
    ) -> Result<Vec<QuizRecord>, StoreError> {
        let learners = self.learners.read().await;
        Ok(learners
            .get(learner_id)
            .map(|e| e.records.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn apply_submission(
        &self,
        record: QuizRecord,
        window: usize,
        step: &SubmissionStep<'_>,
    ) -> Result<ProfileUpdate, StoreError> {
        let mut learners = self.learners.write().await;
        let entry = learners.entry(record.learner_id.clone()).or_default();

        let current = entry
            .profile
            .clone()
            .unwrap_or_else(|| LearnerProfile::new(record.learner_id.clone()));

        entry.records.push(record);
        let recent: Vec<QuizRecord> = entry.records.iter().rev().take(window).cloned().collect();

        let mut update = step(current, &recent);
        update.profile.updated_at = Some(Utc::now());
        entry.profile = Some(update.profile.clone());

        Ok(update)
    }
}
