// src/models/quiz_record.rs

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::profile::{LearnerProfile, Tier, TierChangeEvent};

/// A question as it was answered by the learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnsweredQuestion {
    pub question: String,
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtopic: Option<String>,
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    #[serde(default)]
    pub explanation: String,
    pub difficulty: Tier,
}

/// Correct/total counts for one topic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicTally {
    pub correct: u32,
    pub total: u32,
}

impl TopicTally {
    /// Rounded percentage, 0 when nothing was answered.
    pub fn percentage(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        (100.0 * self.correct as f64 / self.total as f64).round() as u8
    }
}

/// One submitted quiz attempt. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizRecord {
    pub learner_id: String,
    pub topic: String,

    /// Tier the quiz was taken at.
    pub tier: Tier,

    /// 0-100.
    pub score: u8,

    pub questions: Vec<AnsweredQuestion>,
    #[serde(default)]
    pub subtopics_covered: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl QuizRecord {
    /// Per-topic tallies in first-seen question order, always recomputed
    /// from the answered questions.
    pub fn topic_tallies(&self) -> IndexMap<String, TopicTally> {
        let mut tallies: IndexMap<String, TopicTally> = IndexMap::new();
        for q in &self.questions {
            let tally = tallies.entry(q.topic.clone()).or_default();
            tally.total += 1;
            if q.is_correct {
                tally.correct += 1;
            }
        }
        tallies
    }
}

/// DTO for one answered question inside a submission.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AnsweredQuestionInput {
    #[validate(length(min = 1, max = 2000, message = "Question text must not be empty."))]
    pub question: String,
    #[validate(length(min = 1, max = 100, message = "Question topic must not be empty."))]
    pub topic: String,
    #[validate(length(max = 100))]
    pub subtopic: Option<String>,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub user_answer: String,
    #[validate(length(min = 1, max = 500, message = "Correct answer must not be empty."))]
    pub correct_answer: String,

    /// Client-side verdict. When present it must agree with exact comparison.
    pub is_correct: Option<bool>,

    #[serde(default)]
    #[validate(length(max = 4000))]
    pub explanation: String,
    pub difficulty: Option<Tier>,
}

/// DTO for submitting a completed quiz.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct QuizSubmission {
    #[validate(length(min = 1, max = 100))]
    pub topic: String,

    /// Tier the quiz was generated for; defaults to the learner's tier.
    pub tier: Option<Tier>,

    #[validate(
        length(min = 1, max = 100, message = "A submission needs between 1 and 100 questions."),
        nested
    )]
    pub questions: Vec<AnsweredQuestionInput>,

    #[serde(default)]
    pub subtopics_covered: Vec<String>,
}

/// HTTP body for `POST /api/quiz/evaluate`.
#[derive(Debug, Deserialize)]
pub struct EvaluateQuizRequest {
    pub learner_id: String,
    #[serde(flatten)]
    pub submission: QuizSubmission,
}

/// Outcome of evaluating one submission.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationResult {
    pub score: u8,
    pub tier: Tier,
    pub previous_tier: Tier,
    pub tier_changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier_change: Option<TierChangeEvent>,
    pub topic_performance: IndexMap<String, TopicTally>,
    pub total_quizzes: u64,
    pub average_score: f64,
    pub message: String,
}

/// Profile state written back by a store after one submission step.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub profile: LearnerProfile,
    pub previous_tier: Tier,
    pub tier_change: Option<TierChangeEvent>,
}
