//! Generative-text capability and the Gemini implementation

use crate::error::GenerationError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

/// Default Generative Language REST endpoint
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Sampling parameters for one call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// Ask the model for `application/json` output
    pub json_output: bool,
}

impl GenerationParams {
    /// Low temperature for consistent requirement parsing
    pub const EXTRACTION: GenerationParams = GenerationParams {
        temperature: 0.1,
        max_output_tokens: 4096,
        json_output: true,
    };

    /// Slightly higher temperature for varied test scenarios
    pub const TEST_GENERATION: GenerationParams = GenerationParams {
        temperature: 0.2,
        max_output_tokens: 8192,
        json_output: true,
    };
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, params: GenerationParams)
        -> Result<String, GenerationError>;

    /// Model identifier, used in logs
    fn model(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
}

impl GeminiConfig {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    pub fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<String, GenerationError> {
        let body = request_body(prompt, params);

        let response = self
            .client
            .post(self.config.generate_url())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::ExternalService(format!(
                "{} returned {}: {}",
                self.config.model, status, body
            )));
        }

        let json: Value = response.json().await?;
        let text = text_from_response(&json)?;
        debug!(model = %self.config.model, chars = text.len(), "Model responded");
        Ok(text)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

fn request_body(prompt: &str, params: GenerationParams) -> Value {
    let mut generation_config = json!({
        "temperature": params.temperature,
        "maxOutputTokens": params.max_output_tokens,
    });
    if params.json_output {
        generation_config["responseMimeType"] = json!("application/json");
    }

    json!({
        "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        "generationConfig": generation_config,
    })
}

/// Concatenated text parts of the first candidate
fn text_from_response(json: &Value) -> Result<String, GenerationError> {
    let Some(candidate) = json["candidates"].as_array().and_then(|c| c.first()) else {
        let reason = json["promptFeedback"]["blockReason"]
            .as_str()
            .unwrap_or("no candidates returned");
        return Err(GenerationError::ExternalService(format!(
            "empty response: {reason}"
        )));
    };

    let text: String = candidate["content"]["parts"]
        .as_array()
        .map(|parts| parts.iter().filter_map(|p| p["text"].as_str()).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = candidate["finishReason"].as_str().unwrap_or("UNKNOWN");
        return Err(GenerationError::ExternalService(format!(
            "candidate has no text (finish reason {reason})"
        )));
    }

    Ok(text)
}
