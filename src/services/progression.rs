// src/services/progression.rs

//! Tier progression state machine.
//!
//! Moving up is harder than staying, and the demotion bar depends on the
//! current tier, so a single noisy quiz does not make a learner oscillate.

use crate::{
    config::ProgressionConfig,
    models::profile::{Tier, TierChangeEvent, TierChangeKind},
};

/// Extra average required to reach the top tier.
const ADVANCED_PROMOTION_MARGIN: f64 = 5.0;

/// Advanced learners are demoted below `down_threshold + ADVANCED_RETENTION_MARGIN`.
const ADVANCED_RETENTION_MARGIN: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TierDecision {
    pub tier: Tier,
    pub change: Option<TierChangeEvent>,
}

#[derive(Debug, Clone, Copy)]
pub struct LevelProgressionEngine {
    config: ProgressionConfig,
}

impl LevelProgressionEngine {
    pub fn new(config: ProgressionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProgressionConfig {
        &self.config
    }

    /// Decides the tier after a window of recent scores (most recent first).
    pub fn next_tier(&self, current: Tier, recent_scores: &[u8]) -> TierDecision {
        let next = self.target_tier(current, recent_scores);
        TierDecision {
            tier: next,
            change: tier_change(current, next),
        }
    }

    fn target_tier(&self, current: Tier, recent_scores: &[u8]) -> Tier {
        if recent_scores.is_empty() || recent_scores.len() < self.config.min_samples {
            return current;
        }

        let avg = recent_scores.iter().map(|&s| f64::from(s)).sum::<f64>() / recent_scores.len() as f64;
        let up = self.config.up_threshold;
        let down = self.config.down_threshold;

        match current {
            Tier::Beginner if avg >= up => Tier::Intermediate,
            Tier::Intermediate if avg >= up + ADVANCED_PROMOTION_MARGIN => Tier::Advanced,
            Tier::Intermediate if avg < down => Tier::Beginner,
            Tier::Advanced if avg < down + ADVANCED_RETENTION_MARGIN => Tier::Intermediate,
            _ => current,
        }
    }
}

impl Default for LevelProgressionEngine {
    fn default() -> Self {
        Self::new(ProgressionConfig::default())
    }
}

fn tier_change(previous: Tier, new: Tier) -> Option<TierChangeEvent> {
    if previous == new {
        return None;
    }

    let (kind, message) = if new > previous {
        (
            TierChangeKind::Progression,
            format!(
                "Congratulations! You've progressed from {} to {} level!",
                previous, new
            ),
        )
    } else {
        (
            TierChangeKind::Retrocession,
            format!(
                "Your level has changed from {} to {}. Keep practicing to improve!",
                previous, new
            ),
        )
    };

    Some(TierChangeEvent {
        kind,
        message,
        previous_tier: previous,
        new_tier: new,
    })
}
