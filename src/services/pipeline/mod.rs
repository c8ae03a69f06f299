// src/services/pipeline/mod.rs

//! Quiz content pipeline: shape a request for the learner, ask the
//! generator, validate the answer, and fall back to the static bank when
//! anything goes wrong.

pub mod bank;
pub mod fallback;
pub mod plan;
pub mod prompt;
pub mod validation;

use std::{sync::Arc, time::Duration};

use thiserror::Error;

use self::{
    plan::QuizPlan,
    validation::{BatchVerdict, RejectReason},
};
use crate::{
    config::{MAX_QUIZ_QUESTIONS, QuizSettings},
    models::{
        question::{GenerateQuizRequest, GeneratedQuestion, QuestionSource, QuizBatch},
        topic::QuizTopic,
    },
    services::{
        aggregator::PerformanceAggregator,
        generator::{GenerationError, QuizGenerator},
    },
    store::{ProficiencyStore, StoreError},
};

/// Why a batch was served from the bank.
#[derive(Debug, Error)]
pub enum FallbackReason {
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),
    #[error("generated content rejected: {0}")]
    Rejected(#[from] RejectReason),
}

#[derive(Clone)]
pub struct QuizPipeline {
    store: Arc<dyn ProficiencyStore>,
    generator: Arc<dyn QuizGenerator>,
    aggregator: PerformanceAggregator,
    settings: QuizSettings,
    timeout: Duration,
}

impl QuizPipeline {
    pub fn new(
        store: Arc<dyn ProficiencyStore>,
        generator: Arc<dyn QuizGenerator>,
        aggregator: PerformanceAggregator,
        settings: QuizSettings,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            generator,
            aggregator,
            settings,
            timeout,
        }
    }

    /// Produces exactly the requested number of valid questions.
    ///
    /// Generator failures are recovered here; only store failures escape.
    pub async fn generate_quiz(&self, request: &GenerateQuizRequest) -> Result<QuizBatch, StoreError> {
        let profile = self.store.get_profile(&request.learner_id).await?;
        let recent = self.aggregator.recent_practice(&request.learner_id).await?;

        let plan = QuizPlan {
            topic: QuizTopic::resolve(&request.topic),
            tier: request.tier_override.unwrap_or(profile.tier),
            count: request
                .num_questions
                .unwrap_or(self.settings.default_questions)
                .clamp(1, MAX_QUIZ_QUESTIONS),
            weak_topics: self.aggregator.weak_topics(&profile),
            recent,
            previous_questions: request.previous_questions.clone(),
            rotation: profile.total_quizzes as usize,
        };

        let (questions, source, fallback_reason) = match self.request_questions(&plan).await {
            Ok(questions) => (questions, QuestionSource::Generated, None),
            Err(reason) => {
                tracing::warn!(
                    learner_id = %request.learner_id,
                    topic = %plan.topic,
                    "Serving fallback quiz: {}",
                    reason
                );
                (
                    fallback::synthesize(&plan),
                    QuestionSource::Fallback,
                    Some(reason.to_string()),
                )
            }
        };

        let is_fallback = source == QuestionSource::Fallback;
        let batch = QuizBatch {
            subtopics_covered: subtopics_of(&questions),
            questions,
            source_tier: plan.tier,
            learner_tier: profile.tier,
            topic: plan.topic,
            weak_topics: plan.weak_topics,
            is_fallback,
            source,
            model: (!is_fallback).then(|| self.generator.info().model),
            bank_version: is_fallback.then_some(bank::BANK_VERSION),
            fallback_reason,
        };

        tracing::info!(
            learner_id = %request.learner_id,
            topic = %batch.topic,
            tier = %batch.source_tier,
            questions = batch.questions.len(),
            fallback = batch.is_fallback,
            "Quiz ready"
        );
        Ok(batch)
    }

    async fn request_questions(&self, plan: &QuizPlan) -> Result<Vec<GeneratedQuestion>, FallbackReason> {
        let request = prompt::build_request(plan);

        let raw = tokio::time::timeout(self.timeout, self.generator.generate(&request))
            .await
            .map_err(|_| GenerationError::Timeout(self.timeout))??;

        match validation::validate_batch(&raw, plan) {
            BatchVerdict::Valid(questions) => Ok(questions),
            BatchVerdict::Rejected(reason) => Err(reason.into()),
        }
    }
}

/// Distinct subtopics in question order.
fn subtopics_of(questions: &[GeneratedQuestion]) -> Vec<String> {
    let mut covered: Vec<String> = Vec::new();
    for q in questions {
        if !covered.contains(&q.subtopic) {
            covered.push(q.subtopic.clone());
        }
    }
    covered
}
