// src/services/evaluation.rs

use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        profile::LearnerProfile,
        quiz_record::{AnsweredQuestion, EvaluationResult, ProfileUpdate, QuizRecord, QuizSubmission},
    },
    services::{aggregator::PerformanceAggregator, progression::LevelProgressionEngine},
    store::ProficiencyStore,
};

const EVALUATED_MESSAGE: &str = "Quiz evaluated and progress updated successfully";

/// Turns a submitted quiz into a stored record, updated statistics and a
/// tier decision.
#[derive(Clone)]
pub struct QuizEvaluator {
    store: Arc<dyn ProficiencyStore>,
    progression: LevelProgressionEngine,
}

impl QuizEvaluator {
    pub fn new(store: Arc<dyn ProficiencyStore>, progression: LevelProgressionEngine) -> Self {
        Self { store, progression }
    }

    pub async fn submit(
        &self,
        learner_id: &str,
        submission: QuizSubmission,
    ) -> Result<EvaluationResult, AppError> {
        let learner_id = learner_id.trim();
        if learner_id.is_empty() {
            return Err(AppError::BadRequest("Learner id must not be empty.".to_string()));
        }
        submission.validate()?;

        let tier = match submission.tier {
            Some(tier) => tier,
            None => self.store.get_profile(learner_id).await?.tier,
        };

        let mut questions = Vec::with_capacity(submission.questions.len());
        for (i, input) in submission.questions.into_iter().enumerate() {
            let is_correct = input.user_answer == input.correct_answer;
            if input.is_correct.is_some_and(|claimed| claimed != is_correct) {
                return Err(AppError::BadRequest(format!(
                    "Question {}: is_correct does not match the submitted answer.",
                    i + 1
                )));
            }

            questions.push(AnsweredQuestion {
                question: input.question,
                topic: input.topic.trim().to_string(),
                subtopic: input.subtopic.filter(|s| !s.trim().is_empty()),
                user_answer: input.user_answer,
                correct_answer: input.correct_answer,
                is_correct,
                explanation: input.explanation,
                difficulty: input.difficulty.unwrap_or(tier),
            });
        }

        let correct = questions.iter().filter(|q| q.is_correct).count();
        let score = (100.0 * correct as f64 / questions.len() as f64).round() as u8;

        let subtopics_covered = if submission.subtopics_covered.is_empty() {
            let mut covered: Vec<String> = Vec::new();
            for s in questions.iter().filter_map(|q| q.subtopic.as_ref()) {
                if !covered.contains(s) {
                    covered.push(s.clone());
                }
            }
            covered
        } else {
            submission.subtopics_covered
        };

        let record = QuizRecord {
            learner_id: learner_id.to_string(),
            topic: submission.topic.trim().to_string(),
            tier,
            score,
            questions,
            subtopics_covered,
            created_at: Utc::now(),
        };
        let topic_performance = record.topic_tallies();

        let submitted = record.clone();
        let progression = self.progression;
        let step = move |profile: LearnerProfile, window: &[QuizRecord]| -> ProfileUpdate {
            let previous_tier = profile.tier;
            let mut profile = PerformanceAggregator::record_quiz(profile, &submitted);

            let scores: Vec<u8> = window.iter().map(|r| r.score).collect();
            let decision = progression.next_tier(previous_tier, &scores);
            profile.tier = decision.tier;
            if let Some(change) = &decision.change {
                profile.last_tier_change = Some(change.clone().into_persisted(Utc::now()));
            }

            ProfileUpdate {
                profile,
                previous_tier,
                tier_change: decision.change,
            }
        };

        let update = self
            .store
            .apply_submission(record, self.progression.config().min_samples, &step)
            .await?;

        if let Some(change) = &update.tier_change {
            tracing::info!(
                learner_id = %learner_id,
                from = %change.previous_tier,
                to = %change.new_tier,
                "Tier changed"
            );
        }
        tracing::info!(learner_id = %learner_id, score, "Quiz evaluated");

        let message = update
            .tier_change
            .as_ref()
            .map(|c| c.message.clone())
            .unwrap_or_else(|| EVALUATED_MESSAGE.to_string());

        Ok(EvaluationResult {
            score,
            tier: update.profile.tier,
            previous_tier: update.previous_tier,
            tier_changed: update.tier_change.is_some(),
            tier_change: update.tier_change,
            topic_performance,
            total_quizzes: update.profile.total_quizzes,
            average_score: update.profile.average_score,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{
            profile::{Tier, TierChangeKind},
            quiz_record::{AnsweredQuestionInput, TopicTally},
        },
        store::MemoryProficiencyStore,
    };

    fn answer(topic: &str, correct: bool) -> AnsweredQuestionInput {
        AnsweredQuestionInput {
            question: format!("{} question", topic),
            topic: topic.to_string(),
            subtopic: Some("Articles".to_string()),
            user_answer: if correct { "right" } else { "wrong" }.to_string(),
            correct_answer: "right".to_string(),
            is_correct: None,
            explanation: String::new(),
            difficulty: None,
        }
    }

    /// `correct` of `total` answers right, all on one topic.
    fn submission(topic: &str, correct: usize, total: usize) -> QuizSubmission {
        QuizSubmission {
            topic: topic.to_string(),
            tier: None,
            questions: (0..total).map(|i| answer(topic, i < correct)).collect(),
            subtopics_covered: vec![],
        }
    }

    fn evaluator() -> (QuizEvaluator, Arc<MemoryProficiencyStore>) {
        let store = Arc::new(MemoryProficiencyStore::new());
        let evaluator = QuizEvaluator::new(store.clone(), LevelProgressionEngine::default());
        (evaluator, store)
    }

    #[tokio::test]
    async fn test_three_strong_quizzes_promote_beginner() {
        let (evaluator, store) = evaluator();

        let first = evaluator.submit("amy", submission("Grammar", 17, 20)).await.unwrap();
        assert_eq!(first.score, 85);
        assert!(!first.tier_changed);
        assert_eq!(first.message, EVALUATED_MESSAGE);

        evaluator.submit("amy", submission("Grammar", 17, 20)).await.unwrap();
        let third = evaluator.submit("amy", submission("Grammar", 17, 20)).await.unwrap();

        assert!(third.tier_changed);
        assert_eq!(third.previous_tier, Tier::Beginner);
        assert_eq!(third.tier, Tier::Intermediate);
        let change = third.tier_change.unwrap();
        assert_eq!(change.kind, TierChangeKind::Progression);
        assert_eq!(third.message, change.message);

        let profile = store.get_profile("amy").await.unwrap();
        assert_eq!(profile.tier, Tier::Intermediate);
        assert_eq!(profile.total_quizzes, 3);
        let persisted = profile.last_tier_change.unwrap();
        assert_eq!(persisted.previous_tier, Tier::Beginner);
        assert_eq!(persisted.kind, TierChangeKind::Progression);
    }

    #[tokio::test]
    async fn test_middling_scores_keep_tier() {
        let (evaluator, _) = evaluator();
        for _ in 0..3 {
            let result = evaluator.submit("ben", submission("Usage", 13, 20)).await.unwrap();
            assert_eq!(result.score, 65);
            assert_eq!(result.tier, Tier::Beginner);
            assert!(!result.tier_changed);
        }
    }

    #[tokio::test]
    async fn test_advanced_learner_keeps_tier_at_72() {
        let (evaluator, store) = evaluator();
        let mut profile = LearnerProfile::new("cai");
        profile.tier = Tier::Advanced;
        store.insert_profile(profile).await;

        for _ in 0..3 {
            let result = evaluator.submit("cai", submission("Reading", 18, 25)).await.unwrap();
            assert_eq!(result.score, 72);
            assert_eq!(result.tier, Tier::Advanced);
        }
    }

    #[tokio::test]
    async fn test_advanced_learner_demoted_at_55() {
        let (evaluator, store) = evaluator();
        let mut profile = LearnerProfile::new("dee");
        profile.tier = Tier::Advanced;
        store.insert_profile(profile).await;

        let mut last = None;
        for _ in 0..3 {
            last = Some(evaluator.submit("dee", submission("Reading", 11, 20)).await.unwrap());
        }
        let last = last.unwrap();
        assert_eq!(last.score, 55);
        assert_eq!(last.tier, Tier::Intermediate);
        assert_eq!(last.tier_change.unwrap().kind, TierChangeKind::Retrocession);
    }

    #[tokio::test]
    async fn test_average_over_submissions() {
        let (evaluator, _) = evaluator();
        let mut last = None;
        for correct in [6, 7, 8, 9] {
            last = Some(evaluator.submit("eve", submission("Grammar", correct, 10)).await.unwrap());
        }
        let last = last.unwrap();
        assert_eq!(last.total_quizzes, 4);
        assert!((last.average_score - 75.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_topic_progress_follows_latest_quiz() {
        let (evaluator, store) = evaluator();
        evaluator.submit("fay", submission("Grammar", 2, 5)).await.unwrap();
        assert_eq!(store.get_profile("fay").await.unwrap().topic_progress["Grammar"], 40);

        let result = evaluator.submit("fay", submission("Grammar", 9, 10)).await.unwrap();
        assert_eq!(result.topic_performance["Grammar"], TopicTally { correct: 9, total: 10 });
        assert_eq!(store.get_profile("fay").await.unwrap().topic_progress["Grammar"], 90);
    }

    #[tokio::test]
    async fn test_empty_submission_rejected() {
        let (evaluator, store) = evaluator();
        let err = evaluator.submit("gus", submission("Grammar", 0, 0)).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let profile = store.get_profile("gus").await.unwrap();
        assert_eq!(profile.total_quizzes, 0);
        assert!(!profile.has_completed_first_quiz);
    }

    #[tokio::test]
    async fn test_contradicting_verdict_rejected() {
        let (evaluator, _) = evaluator();
        let mut sub = submission("Vocabulary", 1, 2);
        sub.questions[1].is_correct = Some(true);

        let err = evaluator.submit("hal", sub).await.unwrap_err();
        match err {
            AppError::BadRequest(msg) => assert!(msg.starts_with("Question 2")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_submission_tier_is_recorded() {
        let (evaluator, store) = evaluator();
        let mut sub = submission("Grammar", 1, 1);
        sub.tier = Some(Tier::Advanced);
        evaluator.submit("ivy", sub).await.unwrap();

        let records = store.recent_quizzes("ivy", 5).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tier, Tier::Advanced);
        assert_eq!(records[0].questions[0].difficulty, Tier::Advanced);
        assert_eq!(records[0].subtopics_covered, vec!["Articles"]);
    }

    #[tokio::test]
    async fn test_blank_learner_rejected() {
        let (evaluator, _) = evaluator();
        let err = evaluator.submit("  ", submission("Grammar", 1, 1)).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
