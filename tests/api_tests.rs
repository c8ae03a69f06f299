// tests/api_tests.rs

use std::sync::Arc;

use adaptive_tutor::{
    config::{Config, OllamaConfig, ProgressionConfig, QuizSettings},
    models::{
        profile::LearnerProfile,
        quiz_record::{ProfileUpdate, QuizRecord},
    },
    routes,
    services::{
        LearningEngine,
        generator::{GenerationError, GenerationRequest, GeneratorInfo, QuizGenerator},
    },
    state::AppState,
    store::{MemoryProficiencyStore, ProficiencyStore, StoreError, SubmissionStep},
};
use async_trait::async_trait;
use serde_json::{Value, json};

/// Generator double: replies with fixed text, or fails when there is none.
struct StubGenerator {
    reply: Option<String>,
}

#[async_trait]
impl QuizGenerator for StubGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
        self.reply.clone().ok_or(GenerationError::EmptyResponse)
    }

    async fn health_check(&self) -> Result<(), GenerationError> {
        match self.reply {
            Some(_) => Ok(()),
            None => Err(GenerationError::EmptyResponse),
        }
    }

    fn info(&self) -> GeneratorInfo {
        GeneratorInfo {
            model: "stub-model".to_string(),
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_secs: 1,
            temperature: 0.7,
            max_tokens: 100,
        }
    }
}

/// Store whose every call fails, to exercise the 500 path.
struct BrokenStore;

#[async_trait]
impl ProficiencyStore for BrokenStore {
    async fn get_profile(&self, _learner_id: &str) -> Result<LearnerProfile, StoreError> {
        Err(StoreError::Corrupt("disk on fire".to_string()))
    }

    async fn recent_quizzes(
        &self,
        _learner_id: &str,
        _limit: usize,
    ) -> Result<Vec<QuizRecord>, StoreError> {
        Err(StoreError::Corrupt("disk on fire".to_string()))
    }

    async fn apply_submission(
        &self,
        _record: QuizRecord,
        _window: usize,
        _step: &SubmissionStep<'_>,
    ) -> Result<ProfileUpdate, StoreError> {
        Err(StoreError::Corrupt("disk on fire".to_string()))
    }
}

fn test_config() -> Config {
    Config {
        database_url: None,
        port: 0,
        ollama: OllamaConfig::default(),
        progression: ProgressionConfig::default(),
        quiz: QuizSettings::default(),
    }
}

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
async fn spawn_app_with(store: Arc<dyn ProficiencyStore>, reply: Option<String>) -> String {
    let config = test_config();
    let generator = Arc::new(StubGenerator { reply });
    let state = AppState {
        engine: Arc::new(LearningEngine::new(store, generator, &config)),
    };

    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

/// App with an in-memory store and a generator that is down.
async fn spawn_app() -> String {
    spawn_app_with(Arc::new(MemoryProficiencyStore::new()), None).await
}

fn unique_learner() -> String {
    format!("learner-{}", uuid::Uuid::new_v4())
}

/// `correct` of `total` answers right, all Grammar.
fn submission(learner_id: &str, correct: usize, total: usize) -> Value {
    let questions: Vec<Value> = (0..total)
        .map(|i| {
            json!({
                "question": format!("Question {}", i),
                "topic": "Grammar",
                "subtopic": "Articles",
                "user_answer": if i < correct { "a" } else { "b" },
                "correct_answer": "a",
                "explanation": "Because."
            })
        })
        .collect();

    json!({
        "learner_id": learner_id,
        "topic": "Grammar",
        "questions": questions
    })
}

#[tokio::test]
async fn health_check_404() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn topics_lists_catalog() {
    let address = spawn_app().await;

    let body: Value = reqwest::get(format!("{}/api/quiz/topics", address))
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();

    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Grammar", "Vocabulary", "Reading", "Usage", "Mixed"]);
    assert_eq!(body[0]["levels"], json!(["beginner", "intermediate", "advanced"]));
}

#[tokio::test]
async fn new_learner_gets_default_profile() {
    let address = spawn_app().await;
    let learner = unique_learner();

    let response = reqwest::get(format!("{}/api/profile/{}", address, learner))
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);

    let profile: Value = response.json().await.unwrap();
    assert_eq!(profile["learner_id"], learner);
    assert_eq!(profile["tier"], "beginner");
    assert_eq!(profile["total_quizzes"], 0);
    assert_eq!(profile["average_score"], 0.0);
    assert_eq!(profile["has_completed_first_quiz"], false);
    assert_eq!(profile["topic_progress"], json!({}));
}

#[tokio::test]
async fn generate_falls_back_when_generator_is_down() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/quiz/generate", address))
        .json(&json!({ "learner_id": unique_learner(), "topic": "Mixed" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);

    let batch: Value = response.json().await.unwrap();
    assert_eq!(batch["is_fallback"], true);
    assert_eq!(batch["source"], "fallback");
    assert_eq!(batch["source_tier"], "beginner");

    let questions = batch["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 4);
    for q in questions {
        let options: Vec<&str> = q["options"].as_array().unwrap().iter().map(|o| o.as_str().unwrap()).collect();
        assert_eq!(options.len(), 4);
        assert!(options.contains(&q["correct_answer"].as_str().unwrap()));
    }
    assert!(questions[2]["passage"].as_str().unwrap().len() >= 100);
}

#[tokio::test]
async fn generate_serves_valid_generated_quiz() {
    let generated = json!({
        "questions": [{
            "question": "Pick the synonym of 'happy'.",
            "options": ["sad", "glad", "angry", "tired"],
            "correct_answer": "glad",
            "explanation": "'Glad' means happy.",
            "topic": "Vocabulary",
            "subtopic": "Synonyms"
        }]
    });
    let address = spawn_app_with(
        Arc::new(MemoryProficiencyStore::new()),
        Some(format!("Here is your quiz: {}", generated)),
    )
    .await;
    let client = reqwest::Client::new();

    let batch: Value = client
        .post(format!("{}/api/quiz/generate", address))
        .json(&json!({
            "learner_id": unique_learner(),
            "topic": "Vocabulary",
            "num_questions": 1,
            "tier_override": "advanced"
        }))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();

    assert_eq!(batch["is_fallback"], false);
    assert_eq!(batch["model"], "stub-model");
    assert_eq!(batch["source_tier"], "advanced");
    assert_eq!(batch["learner_tier"], "beginner");
    assert_eq!(batch["questions"][0]["difficulty"], "advanced");
    assert_eq!(batch["subtopics_covered"], json!(["Synonyms"]));
}

#[tokio::test]
async fn generate_rejects_blank_learner() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/quiz/generate", address))
        .json(&json!({ "learner_id": "", "topic": "Grammar" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn evaluate_flow_promotes_and_updates_profile() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let learner = unique_learner();

    let mut last: Value = Value::Null;
    for _ in 0..3 {
        let response = client
            .post(format!("{}/api/quiz/evaluate", address))
            .json(&submission(&learner, 17, 20))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 200);
        last = response.json().await.unwrap();
    }

    assert_eq!(last["score"], 85);
    assert_eq!(last["tier_changed"], true);
    assert_eq!(last["previous_tier"], "beginner");
    assert_eq!(last["tier"], "intermediate");
    assert_eq!(last["tier_change"]["kind"], "progression");
    assert_eq!(last["total_quizzes"], 3);
    assert_eq!(last["topic_performance"]["Grammar"], json!({ "correct": 17, "total": 20 }));

    let profile: Value = reqwest::get(format!("{}/api/profile/{}", address, learner))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(profile["tier"], "intermediate");
    assert_eq!(profile["has_completed_first_quiz"], true);
    assert_eq!(profile["topic_progress"]["Grammar"], 85);
    assert_eq!(profile["last_tier_change"]["previous_tier"], "beginner");

    let report: Value = reqwest::get(format!("{}/api/profile/{}/performance", address, learner))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(report["topic_performance"]["Grammar"]["total"], 60);
    assert_eq!(report["topic_performance"]["Grammar"]["percentage"], 85.0);
    assert_eq!(report["recent_quizzes"].as_array().unwrap().len(), 3);
    assert_eq!(report["timeline"].as_array().unwrap().len(), 60);
}

#[tokio::test]
async fn evaluate_rejects_empty_submission() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let learner = unique_learner();

    let response = client
        .post(format!("{}/api/quiz/evaluate", address))
        .json(&submission(&learner, 0, 0))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 400);

    let profile: Value = reqwest::get(format!("{}/api/profile/{}", address, learner))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(profile["total_quizzes"], 0);
}

#[tokio::test]
async fn evaluate_rejects_contradicting_verdict() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let mut body = submission(&unique_learner(), 0, 1);
    body["questions"][0]["is_correct"] = json!(true);

    let response = client
        .post(format!("{}/api/quiz/evaluate", address))
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn store_failure_returns_500() {
    let address = spawn_app_with(Arc::new(BrokenStore), None).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/quiz/evaluate", address))
        .json(&submission("learner", 1, 1))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 500);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Internal Server Error");

    let response = reqwest::get(format!("{}/api/profile/learner", address))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 500);
}

#[tokio::test]
async fn generator_health_reports_status() {
    let down = spawn_app().await;
    let response = reqwest::get(format!("{}/api/generator/health", down))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 503);

    let up = spawn_app_with(Arc::new(MemoryProficiencyStore::new()), Some("ok".to_string())).await;
    let response = reqwest::get(format!("{}/api/generator/health", up))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let info: Value = reqwest::get(format!("{}/api/generator/info", up))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(info["model"], "stub-model");
}
