// src/services/pipeline/validation.rs

//! Turns raw generator text into questions, or rejects the whole batch.

use serde::Deserialize;
use thiserror::Error;

use super::plan::QuizPlan;
use crate::{
    config::MIN_PASSAGE_CHARS,
    models::{profile::Tier, question::GeneratedQuestion, topic::QuizTopic},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("no JSON object in generator output")]
    NoJsonObject,
    #[error("invalid JSON: {0}")]
    InvalidJson(String),
    #[error("missing `questions` list")]
    MissingQuestions,
    #[error("expected {expected} questions, got {actual}")]
    WrongCount { expected: usize, actual: usize },
    #[error("question {index}: missing `{field}`")]
    MissingField { index: usize, field: &'static str },
    #[error("question {index}: expected 4 options, got {count}")]
    OptionCount { index: usize, count: usize },
    #[error("question {index}: empty option")]
    EmptyOption { index: usize },
    #[error("question {index}: duplicate options")]
    DuplicateOptions { index: usize },
    #[error("question {index}: correct answer is not one of the options")]
    AnswerNotInOptions { index: usize },
    #[error("question {index}: reading passage too short ({len} chars)")]
    PassageTooShort { index: usize, len: usize },
    #[error("question {index}: labelled `{label}`, expected `{expected}`")]
    TopicMismatch {
        index: usize,
        label: String,
        expected: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum BatchVerdict {
    Valid(Vec<GeneratedQuestion>),
    Rejected(RejectReason),
}

#[derive(Debug, Deserialize)]
struct RawBatch {
    questions: Option<Vec<RawQuestion>>,
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    question: Option<String>,
    passage: Option<String>,
    options: Option<Vec<String>>,
    #[serde(alias = "correctAnswer")]
    correct_answer: Option<String>,
    explanation: Option<String>,
    topic: Option<String>,
    subtopic: Option<String>,
    question_type: Option<String>,
}

/// Substring from the first `{` to the last `}`, if any.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// Validates a complete batch against the plan's slots. Any invalid
/// question rejects all of them.
pub fn validate_batch(raw: &str, plan: &QuizPlan) -> BatchVerdict {
    match parse_batch(raw, plan) {
        Ok(questions) => BatchVerdict::Valid(questions),
        Err(reason) => BatchVerdict::Rejected(reason),
    }
}

fn parse_batch(raw: &str, plan: &QuizPlan) -> Result<Vec<GeneratedQuestion>, RejectReason> {
    let object = extract_json_object(raw).ok_or(RejectReason::NoJsonObject)?;
    let batch: RawBatch =
        serde_json::from_str(object).map_err(|e| RejectReason::InvalidJson(e.to_string()))?;
    let questions = batch.questions.ok_or(RejectReason::MissingQuestions)?;

    let slots = plan.slots();
    if questions.len() != slots.len() {
        return Err(RejectReason::WrongCount {
            expected: slots.len(),
            actual: questions.len(),
        });
    }

    let mixed = plan.topic == QuizTopic::Mixed;
    questions
        .into_iter()
        .zip(slots)
        .enumerate()
        .map(|(index, (q, slot))| check_question(index, q, slot, mixed, plan.tier))
        .collect()
}

fn required(value: Option<String>, index: usize, field: &'static str) -> Result<String, RejectReason> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(RejectReason::MissingField { index, field }),
    }
}

fn check_question(
    index: usize,
    raw: RawQuestion,
    slot: QuizTopic,
    mixed: bool,
    tier: Tier,
) -> Result<GeneratedQuestion, RejectReason> {
    let question = required(raw.question, index, "question")?;
    let correct_answer = required(raw.correct_answer, index, "correct_answer")?;
    let explanation = required(raw.explanation, index, "explanation")?;
    let label = required(raw.topic, index, "topic")?;
    let options = raw
        .options
        .filter(|o| !o.is_empty())
        .ok_or(RejectReason::MissingField { index, field: "options" })?;

    if options.len() != 4 {
        return Err(RejectReason::OptionCount {
            index,
            count: options.len(),
        });
    }
    if options.iter().any(|o| o.trim().is_empty()) {
        return Err(RejectReason::EmptyOption { index });
    }
    for (i, option) in options.iter().enumerate() {
        if options[i + 1..].contains(option) {
            return Err(RejectReason::DuplicateOptions { index });
        }
    }
    if !options.contains(&correct_answer) {
        return Err(RejectReason::AnswerNotInOptions { index });
    }

    // Mixed slots must carry their own sub-domain; single-topic labels are overwritten.
    if mixed && !slot.matches_label(&label) {
        return Err(RejectReason::TopicMismatch {
            index,
            label: label.trim().to_string(),
            expected: slot.name(),
        });
    }

    let passage = if slot.is_reading() {
        let passage = raw.passage.unwrap_or_default();
        let len = passage.trim().chars().count();
        if len < MIN_PASSAGE_CHARS {
            return Err(RejectReason::PassageTooShort { index, len });
        }
        Some(passage.trim().to_string())
    } else {
        None
    };

    Ok(GeneratedQuestion {
        question,
        passage,
        options,
        correct_answer,
        explanation,
        topic: slot.name().to_string(),
        subtopic: raw
            .subtopic
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "General".to_string()),
        difficulty: tier,
        question_type: raw
            .question_type
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "multiple_choice".to_string()),
    })
}
