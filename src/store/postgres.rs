// src/store/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use sqlx::{PgPool, prelude::FromRow, types::Json};

use super::{ProficiencyStore, StoreError, SubmissionStep};
use crate::models::{
    profile::{LearnerProfile, TierChange},
    quiz_record::{AnsweredQuestion, ProfileUpdate, QuizRecord},
};

/// Represents the 'learner_profiles' table in the database.
#[derive(Debug, FromRow)]
struct ProfileRow {
    learner_id: String,
    tier: String,
    topic_progress: Json<IndexMap<String, u8>>,
    total_quizzes: i64,
    average_score: f64,
    has_completed_first_quiz: bool,
    last_tier_change: Option<Json<TierChange>>,
    updated_at: Option<DateTime<Utc>>,
}

impl ProfileRow {
    fn into_profile(self) -> Result<LearnerProfile, StoreError> {
        Ok(LearnerProfile {
            tier: self.tier.parse().map_err(StoreError::Corrupt)?,
            learner_id: self.learner_id,
            topic_progress: self.topic_progress.0,
            total_quizzes: u64::try_from(self.total_quizzes)
                .map_err(|e| StoreError::Corrupt(e.to_string()))?,
            average_score: self.average_score,
            has_completed_first_quiz: self.has_completed_first_quiz,
            last_tier_change: self.last_tier_change.map(|j| j.0),
            updated_at: self.updated_at,
        })
    }
}

/// Represents the 'quiz_records' table in the database.
#[derive(Debug, FromRow)]
struct QuizRow {
    learner_id: String,
    topic: String,
    tier: String,
    score: i16,
    questions: Json<Vec<AnsweredQuestion>>,
    subtopics_covered: Json<Vec<String>>,
    created_at: DateTime<Utc>,
}

impl QuizRow {
    fn into_record(self) -> Result<QuizRecord, StoreError> {
        Ok(QuizRecord {
            tier: self.tier.parse().map_err(StoreError::Corrupt)?,
            score: u8::try_from(self.score).map_err(|e| StoreError::Corrupt(e.to_string()))?,
            learner_id: self.learner_id,
            topic: self.topic,
            questions: self.questions.0,
            subtopics_covered: self.subtopics_covered.0,
            created_at: self.created_at,
        })
    }
}

const SELECT_PROFILE: &str = r#"
    SELECT
        learner_id, tier, topic_progress, total_quizzes, average_score,
        has_completed_first_quiz, last_tier_change, updated_at
    FROM learner_profiles
    WHERE learner_id = $1
"#;

const SELECT_PROFILE_FOR_UPDATE: &str = r#"
    SELECT
        learner_id, tier, topic_progress, total_quizzes, average_score,
        has_completed_first_quiz, last_tier_change, updated_at
    FROM learner_profiles
    WHERE learner_id = $1
    FOR UPDATE
"#;

const SELECT_RECENT: &str = r#"
    SELECT learner_id, topic, tier, score, questions, subtopics_covered, created_at
    FROM quiz_records
    WHERE learner_id = $1
    ORDER BY created_at DESC, id DESC
    LIMIT $2
"#;

const ENSURE_PROFILE: &str =
    "INSERT INTO learner_profiles (learner_id) VALUES ($1) ON CONFLICT (learner_id) DO NOTHING";

/// Postgres-backed store. Submissions lock the learner's profile row for the
/// duration of the transaction.
#[derive(Clone)]
pub struct PgProficiencyStore {
    pool: PgPool,
}

impl PgProficiencyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProficiencyStore for PgProficiencyStore {
    async fn get_profile(&self, learner_id: &str) -> Result<LearnerProfile, StoreError> {
        sqlx::query(ENSURE_PROFILE)
            .bind(learner_id)
            .execute(&self.pool)
            .await?;

        let row: ProfileRow = sqlx::query_as(SELECT_PROFILE)
            .bind(learner_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch learner profile: {:?}", e);
                StoreError::from(e)
            })?;

        row.into_profile()
    }

    async fn recent_quizzes(
        &self,
        learner_id: &str,
        limit: usize,
    ) -> Result<Vec<QuizRecord>, StoreError> {
        let rows: Vec<QuizRow> = sqlx::query_as(SELECT_RECENT)
            .bind(learner_id)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(QuizRow::into_record).collect()
    }

    async fn apply_submission(
        &self,
        record: QuizRecord,
        window: usize,
        step: &SubmissionStep<'_>,
    ) -> Result<ProfileUpdate, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(ENSURE_PROFILE)
            .bind(&record.learner_id)
            .execute(&mut *tx)
            .await?;

        let row: ProfileRow = sqlx::query_as(SELECT_PROFILE_FOR_UPDATE)
            .bind(&record.learner_id)
            .fetch_one(&mut *tx)
            .await?;
        let current = row.into_profile()?;

        sqlx::query(
            r#"
            INSERT INTO quiz_records (learner_id, topic, tier, score, questions, subtopics_covered, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&record.learner_id)
        .bind(&record.topic)
        .bind(record.tier.as_str())
        .bind(i16::from(record.score))
        .bind(Json(&record.questions))
        .bind(Json(&record.subtopics_covered))
        .bind(record.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert quiz record: {:?}", e);
            StoreError::from(e)
        })?;

        let rows: Vec<QuizRow> = sqlx::query_as(SELECT_RECENT)
            .bind(&record.learner_id)
            .bind(window as i64)
            .fetch_all(&mut *tx)
            .await?;
        let recent = rows
            .into_iter()
            .map(QuizRow::into_record)
            .collect::<Result<Vec<_>, _>>()?;

        let mut update = step(current, &recent);
        update.profile.updated_at = Some(Utc::now());
        let profile = &update.profile;

        sqlx::query(
            r#"
            UPDATE learner_profiles SET
                tier = $2,
                topic_progress = $3,
                total_quizzes = $4,
                average_score = $5,
                has_completed_first_quiz = $6,
                last_tier_change = $7,
                updated_at = $8
            WHERE learner_id = $1
            "#,
        )
        .bind(&profile.learner_id)
        .bind(profile.tier.as_str())
        .bind(Json(&profile.topic_progress))
        .bind(profile.total_quizzes as i64)
        .bind(profile.average_score)
        .bind(profile.has_completed_first_quiz)
        .bind(profile.last_tier_change.as_ref().map(Json))
        .bind(profile.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(update)
    }
}
