// src/models/performance.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::profile::{Tier, TierChange};

/// Accuracy for one topic across the recent quizzes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicPercentage {
    /// Rounded to one decimal place.
    pub percentage: f64,
    pub correct: u32,
    pub total: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizSummary {
    pub score: u8,
    pub topic: String,
    pub tier: Tier,
    pub created_at: DateTime<Utc>,
}

/// One answered question on the performance timeline.
#[derive(Debug, Clone, Serialize)]
pub struct TimelinePoint {
    pub index: usize,
    pub question: String,
    pub is_correct: bool,
}

/// Detailed performance view of a learner.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceReport {
    pub learner_id: String,
    pub tier: Tier,
    pub total_quizzes: u64,
    pub average_score: f64,
    pub topic_performance: BTreeMap<String, TopicPercentage>,

    /// Most recent first.
    pub recent_quizzes: Vec<QuizSummary>,

    pub last_tier_change: Option<TierChange>,

    /// Oldest first.
    pub timeline: Vec<TimelinePoint>,
}
