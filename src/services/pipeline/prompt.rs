// src/services/pipeline/prompt.rs

//! Shapes the instruction sent to the text generator.

use serde_json::json;

use super::plan::QuizPlan;
use crate::{
    config::MAX_PREVIOUS_QUESTIONS_IN_PROMPT,
    models::topic::QuizTopic,
    services::generator::GenerationRequest,
};

pub fn build_request(plan: &QuizPlan) -> GenerationRequest {
    GenerationRequest {
        instruction: instruction(plan),
        response_shape: response_shape(plan),
    }
}

fn instruction(plan: &QuizPlan) -> String {
    let tier = plan.tier;
    let mut text = format!(
        "You are an expert English teacher creating a personalized quiz for a {} level student.\n",
        tier
    );

    if !plan.weak_topics.is_empty() {
        let focus: Vec<&str> = plan.weak_topics.iter().take(3).map(String::as_str).collect();
        text.push_str(&format!(
            "Focus especially on these areas where the student needs improvement: {}.\n",
            focus.join(", ")
        ));
    }

    text.push_str(&format!(
        "\nCreate {} multiple choice questions for the topic: {}\n",
        plan.count, plan.topic
    ));
    text.push_str(&format!("Level: {} - {}\n", tier, tier.description()));

    text.push_str("\nRequirements:\n");
    text.push_str(&format!("- Questions should be {} level appropriate\n", tier));
    text.push_str("- Each question must have exactly 4 options, all different and none empty\n");
    text.push_str(
        "- \"correct_answer\" must be copied character for character from one of the options\n",
    );
    text.push_str("- Provide clear explanations for correct answers\n");
    text.push_str("- Label every question with its \"topic\" and a \"subtopic\"\n");

    if plan.topic == QuizTopic::Mixed {
        text.push_str("- Create exactly one question per area, in this order:\n");
        for (i, slot) in plan.slots().iter().enumerate() {
            text.push_str(&format!("  {}. {} (set \"topic\" to \"{}\")\n", i + 1, slot, slot));
        }
    }

    if plan.includes_reading() {
        text.push_str(
            "- Every Reading question must include a \"passage\" of 150-250 words, and the question must be answerable from that passage\n",
        );
    }

    if let Some(subtopics) = plan.variety_subtopics() {
        text.push_str(&format!(
            "- The student has practised {} many times recently. Prefer these less practised subtopics: {}\n",
            plan.topic,
            subtopics.join(", ")
        ));
    }

    if !plan.previous_questions.is_empty() {
        text.push_str("- Do not repeat or closely paraphrase any of these questions:\n");
        let skip = plan
            .previous_questions
            .len()
            .saturating_sub(MAX_PREVIOUS_QUESTIONS_IN_PROMPT);
        for q in plan.previous_questions.iter().skip(skip) {
            text.push_str(&format!("  * {}\n", q.trim()));
        }
    }

    text.push_str("\nTopic guidelines:\n");
    for topic in QuizTopic::SUB_DOMAINS {
        text.push_str(&format!("- {}: {}\n", topic, topic.guideline()));
    }

    text
}

fn response_shape(plan: &QuizPlan) -> serde_json::Value {
    let first_slot = plan.slots().first().copied().unwrap_or(plan.topic);
    let subtopic = first_slot.subtopics().first().copied().unwrap_or("General");

    let mut example = json!({
        "question": "Question text here",
        "options": ["Option A", "Option B", "Option C", "Option D"],
        "correct_answer": "Option A",
        "explanation": "Clear explanation of why this is correct",
        "topic": first_slot.name(),
        "subtopic": subtopic,
        "difficulty": plan.tier.as_str(),
        "question_type": "multiple_choice"
    });

    if plan.includes_reading() {
        example["passage"] = json!("A 150-250 word passage (Reading questions only)");
    }

    json!({ "questions": [example] })
}
