// src/services/pipeline/fallback.rs

//! Deterministic quiz synthesis from the static bank.

use std::collections::{HashMap, VecDeque};

use super::{
    bank::{self, BankEntry},
    plan::QuizPlan,
};
use crate::{
    config::WEAK_TOPIC_PRIORITY_CAP,
    models::{question::GeneratedQuestion, topic::QuizTopic},
};

/// Shortest text considered for containment matches.
const MIN_OVERLAP_CHARS: usize = 12;

/// Builds exactly `plan.count` valid questions.
pub fn synthesize(plan: &QuizPlan) -> Vec<GeneratedQuestion> {
    let slots = plan.slots();

    let mut per_topic: HashMap<QuizTopic, usize> = HashMap::new();
    for topic in &slots {
        *per_topic.entry(*topic).or_default() += 1;
    }

    let mut picked: HashMap<QuizTopic, VecDeque<&'static BankEntry>> = per_topic
        .into_iter()
        .map(|(topic, n)| (topic, pick(plan, topic, n).into()))
        .collect();

    slots
        .into_iter()
        .filter_map(|topic| {
            picked
                .get_mut(&topic)
                .and_then(|queue| queue.pop_front())
                .map(|e| e.to_question(topic, plan.tier))
        })
        .collect()
}

/// Chooses `n` entries of one bank section.
fn pick(plan: &QuizPlan, topic: QuizTopic, n: usize) -> Vec<&'static BankEntry> {
    let entries = bank::section(topic, plan.tier);
    if entries.is_empty() || n == 0 {
        return Vec::new();
    }

    let seen: Vec<String> = plan.previous_questions.iter().map(|q| normalize(q)).collect();
    let offset = plan.rotation % entries.len();
    let rotated: Vec<&'static BankEntry> = entries[offset..].iter().chain(&entries[..offset]).collect();

    let question_fresh = |e: &BankEntry| !seen.iter().any(|s| overlaps(&normalize(e.question), s));
    let subtopic_fresh = |e: &BankEntry| !subtopic_seen(plan, &seen, e.subtopic);

    let strict: Vec<_> = rotated
        .iter()
        .copied()
        .filter(|e| question_fresh(*e) && subtopic_fresh(*e))
        .collect();
    let pool = if strict.len() >= n {
        strict
    } else {
        let loose: Vec<_> = rotated.iter().copied().filter(|e| question_fresh(*e)).collect();
        if loose.len() >= n {
            loose
        } else {
            // Unfiltered, but unseen entries still lead.
            let mut all = loose;
            for e in &rotated {
                if !all.iter().any(|a| std::ptr::eq(*a, *e)) {
                    all.push(*e);
                }
            }
            all
        }
    };

    let mut chosen: Vec<&'static BankEntry> = pool
        .iter()
        .copied()
        .filter(|e| is_weak(plan, topic, e))
        .take(WEAK_TOPIC_PRIORITY_CAP.min(n))
        .collect();
    for e in &pool {
        if chosen.len() >= n {
            break;
        }
        if !chosen.iter().any(|c| std::ptr::eq(*c, *e)) {
            chosen.push(*e);
        }
    }

    // Last resort when the section is smaller than the quiz.
    let mut cycle = pool.iter().cycle();
    while chosen.len() < n {
        match cycle.next() {
            Some(e) => chosen.push(*e),
            None => break,
        }
    }

    chosen
}

fn is_weak(plan: &QuizPlan, topic: QuizTopic, entry: &BankEntry) -> bool {
    plan.weak_topics
        .iter()
        .any(|w| topic.matches_label(w) || w.trim().eq_ignore_ascii_case(entry.subtopic))
}

fn subtopic_seen(plan: &QuizPlan, seen: &[String], subtopic: &str) -> bool {
    let label = normalize(subtopic);
    plan.recent
        .subtopics
        .iter()
        .any(|s| s.trim().eq_ignore_ascii_case(subtopic))
        || seen.iter().any(|s| s.contains(&label))
}

/// Lowercase alphanumerics separated by single spaces.
fn normalize(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn overlaps(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b {
        return true;
    }
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    short.len() >= MIN_OVERLAP_CHARS && long.contains(short)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::MIN_PASSAGE_CHARS, models::profile::Tier, services::aggregator::RecentPractice,
    };

    fn plan(topic: QuizTopic, count: usize) -> QuizPlan {
        QuizPlan {
            topic,
            tier: Tier::Beginner,
            count,
            weak_topics: vec![],
            recent: RecentPractice::default(),
            previous_questions: vec![],
            rotation: 0,
        }
    }

    #[test]
    fn test_normalize_and_overlap() {
        assert_eq!(normalize("  What is the past tense of 'go'? "), "what is the past tense of go");
        assert!(overlaps("what is the past tense of go", "what is the past tense of go"));
        assert!(overlaps("past tense of go", "what is the past tense of go today"));
        assert!(!overlaps("go", "what is the past tense of go"));
        assert!(!overlaps("", "anything"));
    }

    #[test]
    fn test_always_returns_requested_count() {
        for count in [1, 4, 7, 20] {
            let questions = synthesize(&plan(QuizTopic::Grammar, count));
            assert_eq!(questions.len(), count);
            assert!(questions.iter().all(|q| q.has_valid_answer()));
        }
    }

    #[test]
    fn test_rotation_changes_starting_entry() {
        let first = synthesize(&plan(QuizTopic::Vocabulary, 1));
        let mut rotated = plan(QuizTopic::Vocabulary, 1);
        rotated.rotation = 1;
        let second = synthesize(&rotated);
        assert_ne!(first[0].question, second[0].question);
    }

    #[test]
    fn test_seen_questions_are_skipped() {
        let mut p = plan(QuizTopic::Grammar, 2);
        p.previous_questions = vec!["Which sentence is correct?".to_string()];
        let questions = synthesize(&p);
        assert!(questions.iter().all(|q| q.question != "Which sentence is correct?"));
    }

    #[test]
    fn test_recent_subtopics_are_skipped() {
        let mut p = plan(QuizTopic::Grammar, 3);
        p.recent.subtopics = vec!["articles".to_string()];
        let questions = synthesize(&p);
        assert_eq!(questions.len(), 3);
        assert!(questions.iter().all(|q| q.subtopic != "Articles"));
    }

    #[test]
    fn test_relaxes_when_everything_was_seen() {
        let mut p = plan(QuizTopic::Usage, 4);
        p.previous_questions = bank::section(QuizTopic::Usage, Tier::Beginner)
            .iter()
            .map(|e| e.question.to_string())
            .collect();
        let questions = synthesize(&p);
        assert_eq!(questions.len(), 4);

        let mut texts: Vec<_> = questions.iter().map(|q| q.question.clone()).collect();
        texts.sort();
        texts.dedup();
        assert_eq!(texts.len(), 4);
    }

    #[test]
    fn test_weak_subtopic_comes_first() {
        let mut p = plan(QuizTopic::Grammar, 2);
        p.weak_topics = vec!["Prepositions".to_string()];
        let questions = synthesize(&p);
        assert_eq!(questions[0].subtopic, "Prepositions");
        assert_eq!(questions[1].subtopic, "Articles");
    }

    #[test]
    fn test_mixed_one_question_per_sub_domain() {
        let questions = synthesize(&plan(QuizTopic::Mixed, 4));
        let topics: Vec<_> = questions.iter().map(|q| q.topic.as_str()).collect();
        assert_eq!(topics, vec!["Grammar", "Vocabulary", "Reading", "Usage"]);

        let reading = &questions[2];
        assert!(reading.passage.as_deref().unwrap_or_default().len() >= MIN_PASSAGE_CHARS);
        assert!(questions[0].passage.is_none());
    }

    #[test]
    fn test_mixed_cycles_without_repeating_within_topic() {
        let questions = synthesize(&plan(QuizTopic::Mixed, 8));
        assert_eq!(questions.len(), 8);
        assert_eq!(questions[0].topic, questions[4].topic);
        assert_ne!(questions[0].question, questions[4].question);
    }

    #[test]
    fn test_tier_is_stamped() {
        let mut p = plan(QuizTopic::Reading, 2);
        p.tier = Tier::Advanced;
        assert!(synthesize(&p).iter().all(|q| q.difficulty == Tier::Advanced));
    }
}
