// src/config.rs

use std::{env, str::FromStr, time::Duration};

use dotenvy::dotenv;
use url::Url;

/// Questions per quiz when the caller does not ask for a count.
pub const DEFAULT_QUIZ_QUESTIONS: usize = 4;

/// Upper bound on questions per generated quiz.
pub const MAX_QUIZ_QUESTIONS: usize = 20;

/// Topics whose latest progress is strictly below this are weak.
pub const WEAK_TOPIC_THRESHOLD: u8 = 70;

/// Number of past quizzes scanned for the recent practice pattern.
pub const HISTORY_LOOKBACK: usize = 10;

/// A topic practised this many times within the lookback triggers a variety bias.
pub const VARIETY_REPEAT_THRESHOLD: usize = 3;

/// Reading passages shorter than this are structurally invalid.
pub const MIN_PASSAGE_CHARS: usize = 100;

/// At most this many weak-topic entries are prioritized in a fallback quiz.
pub const WEAK_TOPIC_PRIORITY_CAP: usize = 2;

/// Previously seen questions quoted back to the generator.
pub const MAX_PREVIOUS_QUESTIONS_IN_PROMPT: usize = 15;

/// Level progression thresholds. Passed to the progression engine at
/// construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressionConfig {
    /// Average needed to leave beginner. Intermediate needs `up_threshold + 5`.
    pub up_threshold: f64,
    /// Intermediate demotes below this. Advanced demotes below `down_threshold + 10`.
    pub down_threshold: f64,
    /// Scores required before any tier change is considered.
    pub min_samples: usize,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            up_threshold: 80.0,
            down_threshold: 60.0,
            min_samples: 3,
        }
    }
}

/// Connection settings for the Ollama text generator.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".to_string(),
            model: "gemma2:2b".to_string(),
            timeout: Duration::from_secs(120),
            temperature: 0.7,
            max_tokens: 2000,
        }
    }
}

/// Quiz pipeline tunables.
#[derive(Debug, Clone, Copy)]
pub struct QuizSettings {
    pub default_questions: usize,
    pub weak_topic_threshold: u8,
    pub history_lookback: usize,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            default_questions: DEFAULT_QUIZ_QUESTIONS,
            weak_topic_threshold: WEAK_TOPIC_THRESHOLD,
            history_lookback: HISTORY_LOOKBACK,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. Without one the in-memory store is used.
    pub database_url: Option<String>,
    pub port: u16,
    pub ollama: OllamaConfig,
    pub progression: ProgressionConfig,
    pub quiz: QuizSettings,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").ok().filter(|v| !v.trim().is_empty());

        let ollama_defaults = OllamaConfig::default();
        let base_url = match env::var("OLLAMA_BASE_URL") {
            Ok(raw) => parse_base_url(&raw).unwrap_or_else(|| {
                tracing::warn!("Ignoring invalid value for OLLAMA_BASE_URL: {:?}", raw);
                ollama_defaults.base_url
            }),
            Err(_) => ollama_defaults.base_url,
        };

        let ollama = OllamaConfig {
            base_url,
            model: env::var("OLLAMA_MODEL").unwrap_or(ollama_defaults.model),
            timeout: Duration::from_secs(env_parse("OLLAMA_TIMEOUT", 120)),
            temperature: env_parse("OLLAMA_TEMPERATURE", ollama_defaults.temperature),
            max_tokens: env_parse("OLLAMA_MAX_TOKENS", ollama_defaults.max_tokens),
        };

        let progression_defaults = ProgressionConfig::default();
        let progression = ProgressionConfig {
            up_threshold: env_parse("LEVEL_UP_THRESHOLD", progression_defaults.up_threshold),
            down_threshold: env_parse("LEVEL_DOWN_THRESHOLD", progression_defaults.down_threshold),
            min_samples: env_parse("MIN_QUIZZES_FOR_LEVEL_CHANGE", progression_defaults.min_samples),
        };

        let quiz = QuizSettings {
            default_questions: env_parse("DEFAULT_QUIZ_QUESTIONS", DEFAULT_QUIZ_QUESTIONS)
                .clamp(1, MAX_QUIZ_QUESTIONS),
            weak_topic_threshold: env_parse("WEAK_TOPIC_THRESHOLD", WEAK_TOPIC_THRESHOLD),
            history_lookback: HISTORY_LOOKBACK,
        };

        Self {
            database_url,
            port: env_parse("PORT", 3000),
            ollama,
            progression,
            quiz,
        }
    }
}

/// Absolute http(s) URL without a trailing slash.
fn parse_base_url(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    matches!(url.scheme(), "http" | "https").then(|| raw.trim().trim_end_matches('/').to_string())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("Ignoring invalid value for {}: {:?}", key, raw);
                default
            }
        },
        Err(_) => default,
    }
}
