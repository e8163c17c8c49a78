use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use super::types::{GenerationConfig, GenerationError, GenerationRequest, TextGenerator, NO_TEXT_RESPONSE};
use crate::config::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};

pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub max_output_tokens: u32,
    pub timeout: Duration,
}

pub struct GeminiAdapter {
    cfg: GeminiConfig,
    client: Client,
}

impl GeminiAdapter {
    pub fn new(mut cfg: GeminiConfig) -> Result<Self, GenerationError> {
        if cfg.base_url.is_empty() {
            cfg.base_url = DEFAULT_GEMINI_BASE_URL.to_string();
        }
        if cfg.model.is_empty() {
            cfg.model = DEFAULT_GEMINI_MODEL.to_string();
        }
        let client = Client::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(|err| GenerationError::ClientSetup(err.to_string()))?;
        Ok(Self { cfg, client })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.cfg.base_url.trim_end_matches('/'),
            self.cfg.model
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiAdapter {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let api_key = self
            .cfg
            .api_key
            .as_deref()
            .ok_or(GenerationError::MissingApiKey)?;
        let payload = GenerationRequest::from_prompt(
            prompt,
            GenerationConfig {
                temperature: self.cfg.temperature,
                max_output_tokens: self.cfg.max_output_tokens,
            },
        );

        debug!(model = %self.cfg.model, "sending generateContent request");
        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            debug!(status = status.as_u16(), payload = %body, "Gemini API error response");
            return Err(GenerationError::Upstream {
                status: status.as_u16(),
                payload: body,
            });
        }

        let raw: Value = serde_json::from_str(&body).map_err(|_| GenerationError::Upstream {
            status: status.as_u16(),
            payload: body.clone(),
        })?;
        Ok(parse_response(&raw))
    }
}

fn parse_response(raw: &Value) -> String {
    let text = raw
        .get("candidates")
        .and_then(|v| v.as_array())
        .and_then(|list| list.first())
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(|v| v.as_array())
        .and_then(|parts| parts.first())
        .and_then(|part| part.get("text"))
        .and_then(|v| v.as_str());

    match text {
        Some(text) => text.to_string(),
        None => {
            warn!(response = %raw, "unexpected Gemini API response structure");
            NO_TEXT_RESPONSE.to_string()
        }
    }
}
