// src/models/profile.rs

use std::{fmt, str::FromStr};

use indexmap::IndexMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Proficiency tier of a learner.
///
/// Variants are declared in ascending order so the derived `Ord` matches the
/// progression order `beginner < intermediate < advanced`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Beginner, Tier::Intermediate, Tier::Advanced];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Beginner => "beginner",
            Tier::Intermediate => "intermediate",
            Tier::Advanced => "advanced",
        }
    }

    /// Short description used when instructing the generator.
    pub fn description(&self) -> &'static str {
        match self {
            Tier::Beginner => "basic English concepts, simple grammar, common vocabulary",
            Tier::Intermediate => {
                "more complex grammar structures, intermediate vocabulary, context-dependent questions"
            }
            Tier::Advanced => {
                "advanced grammar, nuanced vocabulary, complex sentence structures, idiomatic expressions"
            }
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Tier::Beginner),
            "intermediate" => Ok(Tier::Intermediate),
            "advanced" => Ok(Tier::Advanced),
            other => Err(format!("unknown tier '{}'", other)),
        }
    }
}

/// Direction of a tier change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TierChangeKind {
    Progression,
    Retrocession,
}

/// Tier change as it is persisted on the profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierChange {
    pub previous_tier: Tier,
    pub kind: TierChangeKind,
    pub message: String,
    pub changed_at: DateTime<Utc>,
}

/// Tier change returned from an evaluation call. Never stored on its own;
/// it is mirrored into `LearnerProfile::last_tier_change`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierChangeEvent {
    pub kind: TierChangeKind,
    pub message: String,
    pub previous_tier: Tier,
    pub new_tier: Tier,
}

impl TierChangeEvent {
    pub fn into_persisted(self, changed_at: DateTime<Utc>) -> TierChange {
        TierChange {
            previous_tier: self.previous_tier,
            kind: self.kind,
            message: self.message,
            changed_at,
        }
    }
}

/// One learner's proficiency state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnerProfile {
    pub learner_id: String,
    pub tier: Tier,

    /// Topic name -> percentage (0-100) of the latest quiz touching the topic.
    pub topic_progress: IndexMap<String, u8>,

    pub total_quizzes: u64,

    /// Running mean of every submitted score.
    pub average_score: f64,

    pub has_completed_first_quiz: bool,
    pub last_tier_change: Option<TierChange>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl LearnerProfile {
    /// Profile of a learner that has never submitted a quiz.
    pub fn new(learner_id: impl Into<String>) -> Self {
        Self {
            learner_id: learner_id.into(),
            tier: Tier::Beginner,
            topic_progress: IndexMap::new(),
            total_quizzes: 0,
            average_score: 0.0,
            has_completed_first_quiz: false,
            last_tier_change: None,
            updated_at: None,
        }
    }
}
