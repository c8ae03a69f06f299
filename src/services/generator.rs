// src/services/generator.rs

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::OllamaConfig;

/// A single instruction plus the JSON shape the answer should follow.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    pub instruction: String,
    pub response_shape: serde_json::Value,
}

impl GenerationRequest {
    /// Flattens the request into one prompt string.
    pub fn to_prompt(&self) -> String {
        let shape = serde_json::to_string_pretty(&self.response_shape)
            .unwrap_or_else(|_| self.response_shape.to_string());
        format!(
            "{}\n\nFormat your response as valid JSON only, with this exact structure:\n{}",
            self.instruction.trim_end(),
            shape
        )
    }
}

/// Failures talking to the generator. All of them are recovered by the quiz
/// pipeline with fallback content.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: reqwest::StatusCode, body: String },
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("empty response")]
    EmptyResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratorInfo {
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[async_trait]
pub trait QuizGenerator: Send + Sync {
    /// Returns the raw generated text. It is untrusted until validated.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;

    async fn health_check(&self) -> Result<(), GenerationError>;

    fn info(&self) -> GeneratorInfo;
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Serialize)]
struct GeneratePayload<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Client for an Ollama `/api/generate` endpoint.
#[derive(Clone)]
pub struct OllamaGenerator {
    config: OllamaConfig,
    client: reqwest::Client,
}

impl OllamaGenerator {
    pub fn new(config: OllamaConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {}", e);
                reqwest::Client::new()
            });

        Self { config, client }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.config.base_url.trim_end_matches('/'))
    }

    async fn post(&self, prompt: &str, options: GenerateOptions) -> Result<String, GenerationError> {
        let payload = GeneratePayload {
            model: &self.config.model,
            prompt,
            stream: false,
            options,
        };

        let resp = self
            .client
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout(self.config.timeout)
                } else {
                    GenerationError::Request(e)
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GenerationError::HttpStatus { status, body });
        }

        let body: GenerateResponse = resp.json().await?;
        if body.response.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(body.response)
    }
}

#[async_trait]
impl QuizGenerator for OllamaGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let prompt = request.to_prompt();
        tracing::debug!(model = %self.config.model, prompt_len = prompt.len(), "Requesting quiz generation");

        self.post(
            &prompt,
            GenerateOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_tokens,
            },
        )
        .await
    }

    async fn health_check(&self) -> Result<(), GenerationError> {
        self.post(
            "Test",
            GenerateOptions {
                temperature: 0.1,
                num_predict: 5,
            },
        )
        .await
        .map(|_| ())
    }

    fn info(&self) -> GeneratorInfo {
        GeneratorInfo {
            model: self.config.model.clone(),
            base_url: self.config.base_url.clone(),
            timeout_secs: self.config.timeout.as_secs(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }
}
