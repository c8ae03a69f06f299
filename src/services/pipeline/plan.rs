// src/services/pipeline/plan.rs

use crate::{
    config::{VARIETY_REPEAT_THRESHOLD, WEAK_TOPIC_PRIORITY_CAP},
    models::{profile::Tier, topic::QuizTopic},
    services::aggregator::RecentPractice,
};

/// Everything the pipeline decided about one quiz before producing it.
#[derive(Debug, Clone)]
pub struct QuizPlan {
    pub topic: QuizTopic,
    pub tier: Tier,
    pub count: usize,
    pub weak_topics: Vec<String>,
    pub recent: RecentPractice,
    pub previous_questions: Vec<String>,

    /// Offset into the fallback bank so repeated fallbacks start elsewhere.
    pub rotation: usize,
}

impl QuizPlan {
    /// Topic of each question slot, in order.
    ///
    /// Mixed quizzes get one slot per sub-domain, weak sub-domains (at most
    /// two) first, cycling when more than four questions are requested.
    pub fn slots(&self) -> Vec<QuizTopic> {
        if self.topic != QuizTopic::Mixed {
            return vec![self.topic; self.count];
        }

        let mut order: Vec<QuizTopic> = Vec::with_capacity(QuizTopic::SUB_DOMAINS.len());
        for label in &self.weak_topics {
            if order.len() >= WEAK_TOPIC_PRIORITY_CAP {
                break;
            }
            if let Some(topic) = QuizTopic::SUB_DOMAINS
                .iter()
                .find(|t| t.matches_label(label))
            {
                if !order.contains(topic) {
                    order.push(*topic);
                }
            }
        }
        for topic in QuizTopic::SUB_DOMAINS {
            if !order.contains(&topic) {
                order.push(topic);
            }
        }

        order.into_iter().cycle().take(self.count).collect()
    }

    /// Subtopics to steer toward when the learner keeps practising the same
    /// topic. `None` when no bias is needed.
    pub fn variety_subtopics(&self) -> Option<Vec<&'static str>> {
        if self.recent.topic_count(self.topic.name()) < VARIETY_REPEAT_THRESHOLD {
            return None;
        }

        let candidates: Vec<&'static str> = if self.topic == QuizTopic::Mixed {
            QuizTopic::SUB_DOMAINS
                .iter()
                .flat_map(|t| t.subtopics().iter().copied())
                .collect()
        } else {
            self.topic.subtopics().to_vec()
        };

        let fresh: Vec<&'static str> = candidates
            .iter()
            .copied()
            .filter(|s| !self.recent.subtopics.iter().any(|r| r.eq_ignore_ascii_case(s)))
            .collect();

        Some(if fresh.is_empty() { candidates } else { fresh })
    }

    pub fn includes_reading(&self) -> bool {
        self.slots().iter().any(|t| t.is_reading())
    }
}
