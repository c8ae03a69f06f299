// src/services/aggregator.rs

//! Derived learner statistics: running averages, per-topic accuracy and the
//! recent practice pattern.

use std::{collections::BTreeMap, sync::Arc};

use crate::{
    models::{
        performance::{PerformanceReport, QuizSummary, TimelinePoint, TopicPercentage},
        profile::LearnerProfile,
        quiz_record::{QuizRecord, TopicTally},
    },
    store::{ProficiencyStore, StoreError},
};

/// Topics and subtopics practised recently, most recent first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecentPractice {
    /// One entry per quiz, so repeats are visible.
    pub topics: Vec<String>,
    /// Distinct labels.
    pub subtopics: Vec<String>,
}

impl RecentPractice {
    pub fn topic_count(&self, topic: &str) -> usize {
        self.topics
            .iter()
            .filter(|t| t.eq_ignore_ascii_case(topic))
            .count()
    }
}

#[derive(Clone)]
pub struct PerformanceAggregator {
    store: Arc<dyn ProficiencyStore>,
    weak_topic_threshold: u8,
    lookback: usize,
}

impl PerformanceAggregator {
    pub fn new(store: Arc<dyn ProficiencyStore>, weak_topic_threshold: u8, lookback: usize) -> Self {
        Self {
            store,
            weak_topic_threshold,
            lookback,
        }
    }

    /// Folds one quiz into the profile in O(1).
    ///
    /// Topic progress is overwritten with this quiz's accuracy for every topic
    /// the quiz touched.
    pub fn record_quiz(mut profile: LearnerProfile, record: &QuizRecord) -> LearnerProfile {
        profile.total_quizzes += 1;
        let n = profile.total_quizzes as f64;
        profile.average_score = (profile.average_score * (n - 1.0) + f64::from(record.score)) / n;
        profile.has_completed_first_quiz = true;

        for (topic, tally) in record.topic_tallies() {
            profile.topic_progress.insert(topic, tally.percentage());
        }

        profile
    }

    /// Topics strictly below `threshold`, in the order they were first recorded.
    pub fn weak_topics_below(profile: &LearnerProfile, threshold: u8) -> Vec<String> {
        profile
            .topic_progress
            .iter()
            .filter(|(_, progress)| **progress < threshold)
            .map(|(topic, _)| topic.clone())
            .collect()
    }

    pub fn weak_topics(&self, profile: &LearnerProfile) -> Vec<String> {
        Self::weak_topics_below(profile, self.weak_topic_threshold)
    }

    /// Most recent quizzes first; shorter than `window_size` for new learners.
    pub async fn recent_window(
        &self,
        learner_id: &str,
        window_size: usize,
    ) -> Result<Vec<QuizRecord>, StoreError> {
        self.store.recent_quizzes(learner_id, window_size).await
    }

    pub async fn recent_subtopics_and_topics(
        &self,
        learner_id: &str,
        lookback: usize,
    ) -> Result<RecentPractice, StoreError> {
        let records = self.store.recent_quizzes(learner_id, lookback).await?;
        Ok(summarize_practice(&records))
    }

    pub async fn recent_practice(&self, learner_id: &str) -> Result<RecentPractice, StoreError> {
        self.recent_subtopics_and_topics(learner_id, self.lookback).await
    }

    pub async fn performance_report(&self, learner_id: &str) -> Result<PerformanceReport, StoreError> {
        let profile = self.store.get_profile(learner_id).await?;
        let records = self.store.recent_quizzes(learner_id, self.lookback).await?;
        Ok(build_report(profile, &records))
    }
}

fn summarize_practice(records: &[QuizRecord]) -> RecentPractice {
    let mut practice = RecentPractice::default();
    for record in records {
        practice.topics.push(record.topic.clone());

        let labels = record
            .subtopics_covered
            .iter()
            .chain(record.questions.iter().filter_map(|q| q.subtopic.as_ref()));
        for label in labels {
            if !practice.subtopics.iter().any(|s| s.eq_ignore_ascii_case(label)) {
                practice.subtopics.push(label.clone());
            }
        }
    }
    practice
}

/// `records` is most recent first.
fn build_report(profile: LearnerProfile, records: &[QuizRecord]) -> PerformanceReport {
    let mut totals: BTreeMap<String, TopicTally> = BTreeMap::new();
    for record in records {
        for (topic, tally) in record.topic_tallies() {
            let entry = totals.entry(topic).or_default();
            entry.correct += tally.correct;
            entry.total += tally.total;
        }
    }

    let topic_performance = totals
        .into_iter()
        .filter(|(_, t)| t.total > 0)
        .map(|(topic, t)| {
            let percentage = (1000.0 * t.correct as f64 / t.total as f64).round() / 10.0;
            (
                topic,
                TopicPercentage {
                    percentage,
                    correct: t.correct,
                    total: t.total,
                },
            )
        })
        .collect();

    let recent_quizzes = records
        .iter()
        .map(|r| QuizSummary {
            score: r.score,
            topic: r.topic.clone(),
            tier: r.tier,
            created_at: r.created_at,
        })
        .collect();

    let timeline = records
        .iter()
        .rev()
        .flat_map(|r| r.questions.iter())
        .enumerate()
        .map(|(i, q)| TimelinePoint {
            index: i + 1,
            question: q.question.clone(),
            is_correct: q.is_correct,
        })
        .collect();

    PerformanceReport {
        learner_id: profile.learner_id,
        tier: profile.tier,
        total_quizzes: profile.total_quizzes,
        average_score: profile.average_score,
        topic_performance,
        recent_quizzes,
        last_tier_change: profile.last_tier_change,
        timeline,
    }
}
