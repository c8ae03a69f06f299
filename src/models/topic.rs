// src/models/topic.rs

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::profile::Tier;

/// Quiz topics known to the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuizTopic {
    Grammar,
    Vocabulary,
    Reading,
    Usage,
    Mixed,
}

impl QuizTopic {
    /// The sub-domains a Mixed quiz is partitioned into, in canonical order.
    pub const SUB_DOMAINS: [QuizTopic; 4] = [
        QuizTopic::Grammar,
        QuizTopic::Vocabulary,
        QuizTopic::Reading,
        QuizTopic::Usage,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            QuizTopic::Grammar => "Grammar",
            QuizTopic::Vocabulary => "Vocabulary",
            QuizTopic::Reading => "Reading",
            QuizTopic::Usage => "Usage",
            QuizTopic::Mixed => "Mixed",
        }
    }

    pub fn subtopics(&self) -> &'static [&'static str] {
        match self {
            QuizTopic::Grammar => &[
                "Verb Tenses",
                "Articles",
                "Prepositions",
                "Conditionals",
                "Passive Voice",
            ],
            QuizTopic::Vocabulary => &[
                "Synonyms",
                "Antonyms",
                "Idioms",
                "Phrasal Verbs",
                "Word Formation",
            ],
            QuizTopic::Reading => &["Main Ideas", "Details", "Inference", "Vocabulary in Context"],
            QuizTopic::Usage => &["Common Expressions", "Collocations", "Formal vs Informal"],
            QuizTopic::Mixed => &["All topics combined"],
        }
    }

    /// Guidance line handed to the generator for this topic.
    pub fn guideline(&self) -> &'static str {
        match self {
            QuizTopic::Grammar => "verb tenses, articles, prepositions, conditionals, passive voice",
            QuizTopic::Vocabulary => "synonyms, antonyms, word meanings, collocations",
            QuizTopic::Reading => "comprehension, inference, main ideas",
            QuizTopic::Usage => "practical English in context, common expressions",
            QuizTopic::Mixed => "one question from each of grammar, vocabulary, reading and usage",
        }
    }

    pub fn is_reading(&self) -> bool {
        matches!(self, QuizTopic::Reading)
    }

    /// Resolves a caller-supplied topic string.
    ///
    /// Topic names match case-insensitively, a subtopic name resolves to its
    /// parent topic, and anything unrecognised becomes `Mixed`.
    pub fn resolve(raw: &str) -> QuizTopic {
        let wanted = raw.trim();
        let all = QuizTopic::SUB_DOMAINS
            .iter()
            .copied()
            .chain(std::iter::once(QuizTopic::Mixed));

        for topic in all.clone() {
            if topic.name().eq_ignore_ascii_case(wanted) {
                return topic;
            }
        }
        for topic in all {
            if topic.subtopics().iter().any(|s| s.eq_ignore_ascii_case(wanted)) {
                return topic;
            }
        }
        QuizTopic::Mixed
    }

    /// Whether a free-form topic label (as stored in answered questions)
    /// names this topic.
    pub fn matches_label(&self, label: &str) -> bool {
        self.name().eq_ignore_ascii_case(label.trim())
    }
}

impl fmt::Display for QuizTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Catalog entry served by `GET /api/quiz/topics`.
#[derive(Debug, Clone, Serialize)]
pub struct TopicInfo {
    pub name: &'static str,
    pub subtopics: &'static [&'static str],
    pub levels: [Tier; 3],
}

pub fn catalog() -> Vec<TopicInfo> {
    QuizTopic::SUB_DOMAINS
        .iter()
        .chain(std::iter::once(&QuizTopic::Mixed))
        .map(|t| TopicInfo {
            name: t.name(),
            subtopics: t.subtopics(),
            levels: Tier::ALL,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_topic_names() {
        assert_eq!(QuizTopic::resolve("grammar"), QuizTopic::Grammar);
        assert_eq!(QuizTopic::resolve(" READING "), QuizTopic::Reading);
        assert_eq!(QuizTopic::resolve("Mixed"), QuizTopic::Mixed);
    }

    #[test]
    fn test_resolve_subtopic_to_parent() {
        assert_eq!(QuizTopic::resolve("Conditionals"), QuizTopic::Grammar);
        assert_eq!(QuizTopic::resolve("phrasal verbs"), QuizTopic::Vocabulary);
    }

    #[test]
    fn test_resolve_unknown_is_mixed() {
        assert_eq!(QuizTopic::resolve("Astrophysics"), QuizTopic::Mixed);
    }

    #[test]
    fn test_catalog_lists_every_topic() {
        let names: Vec<_> = catalog().iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Grammar", "Vocabulary", "Reading", "Usage", "Mixed"]);
    }
}
