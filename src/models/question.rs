// src/models/question.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{profile::Tier, topic::QuizTopic};

/// A multiple-choice question ready to be served.
///
/// Whatever its provenance, a value of this type has exactly four distinct
/// options and a `correct_answer` equal to one of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub question: String,

    /// Comprehension passage. Only reading questions carry one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passage: Option<String>,

    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: String,
    pub topic: String,
    pub subtopic: String,
    pub difficulty: Tier,
    pub question_type: String,
}

impl GeneratedQuestion {
    pub fn has_valid_answer(&self) -> bool {
        self.options.len() == 4 && self.options.iter().any(|o| o == &self.correct_answer)
    }
}

/// Where the questions of a batch came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionSource {
    Generated,
    Fallback,
}

/// A quiz as returned to callers.
#[derive(Debug, Clone, Serialize)]
pub struct QuizBatch {
    pub questions: Vec<GeneratedQuestion>,

    /// Tier the questions were produced for (override or learner tier).
    pub source_tier: Tier,
    pub learner_tier: Tier,
    pub topic: QuizTopic,
    pub weak_topics: Vec<String>,
    pub subtopics_covered: Vec<String>,
    pub is_fallback: bool,
    pub source: QuestionSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_version: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

/// DTO for `POST /api/quiz/generate`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerateQuizRequest {
    #[validate(length(min = 1, max = 128))]
    pub learner_id: String,

    /// e.g. "Grammar", "Vocabulary", "Reading", "Usage", "Mixed".
    #[validate(length(min = 1, max = 100))]
    pub topic: String,

    pub num_questions: Option<usize>,
    pub tier_override: Option<Tier>,

    /// Question texts the learner has already seen in this session.
    #[serde(default)]
    #[validate(length(max = 200))]
    pub previous_questions: Vec<String>,
}
