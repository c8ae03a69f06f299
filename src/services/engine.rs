// src/services/engine.rs

use std::sync::Arc;

use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::{
        performance::PerformanceReport,
        profile::LearnerProfile,
        question::{GenerateQuizRequest, QuizBatch},
        quiz_record::{EvaluationResult, QuizSubmission},
        topic::{self, TopicInfo},
    },
    services::{
        aggregator::PerformanceAggregator,
        evaluation::QuizEvaluator,
        generator::{GenerationError, GeneratorInfo, QuizGenerator},
        pipeline::QuizPipeline,
        progression::LevelProgressionEngine,
    },
    store::ProficiencyStore,
};

/// Caller-facing entry point. Handlers talk to this and nothing else.
#[derive(Clone)]
pub struct LearningEngine {
    store: Arc<dyn ProficiencyStore>,
    generator: Arc<dyn QuizGenerator>,
    aggregator: PerformanceAggregator,
    pipeline: QuizPipeline,
    evaluator: QuizEvaluator,
}

impl LearningEngine {
    pub fn new(
        store: Arc<dyn ProficiencyStore>,
        generator: Arc<dyn QuizGenerator>,
        config: &Config,
    ) -> Self {
        let aggregator = PerformanceAggregator::new(
            store.clone(),
            config.quiz.weak_topic_threshold,
            config.quiz.history_lookback,
        );
        let pipeline = QuizPipeline::new(
            store.clone(),
            generator.clone(),
            aggregator.clone(),
            config.quiz,
            config.ollama.timeout,
        );
        let evaluator = QuizEvaluator::new(
            store.clone(),
            LevelProgressionEngine::new(config.progression),
        );

        Self {
            store,
            generator,
            aggregator,
            pipeline,
            evaluator,
        }
    }

    pub async fn generate_quiz(&self, request: GenerateQuizRequest) -> Result<QuizBatch, AppError> {
        request.validate()?;
        Ok(self.pipeline.generate_quiz(&request).await?)
    }

    pub async fn evaluate_quiz(
        &self,
        learner_id: &str,
        submission: QuizSubmission,
    ) -> Result<EvaluationResult, AppError> {
        self.evaluator.submit(learner_id, submission).await
    }

    pub async fn get_profile(&self, learner_id: &str) -> Result<LearnerProfile, AppError> {
        Ok(self.store.get_profile(learner_id).await?)
    }

    pub async fn performance_report(&self, learner_id: &str) -> Result<PerformanceReport, AppError> {
        Ok(self.aggregator.performance_report(learner_id).await?)
    }

    pub fn topics(&self) -> Vec<TopicInfo> {
        topic::catalog()
    }

    pub async fn generator_health(&self) -> Result<(), GenerationError> {
        self.generator.health_check().await
    }

    pub fn generator_info(&self) -> GeneratorInfo {
        self.generator.info()
    }
}
