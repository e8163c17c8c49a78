use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned in place of an error when the upstream answer carries no text part.
pub const NO_TEXT_RESPONSE: &str = "No text response from Gemini API.";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub max_output_tokens: u32,
}

/// Body of a `generateContent` call.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

impl GenerationRequest {
    pub fn from_prompt(prompt: &str, generation_config: GenerationConfig) -> Self {
        Self {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config,
        }
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("GEMINI_API_KEY environment variable is not set.")]
    MissingApiKey,

    #[error("Gemini API request failed with status {status}: {payload}")]
    Upstream { status: u16, payload: String },

    #[error("Failed to set up Gemini HTTP client: {0}")]
    ClientSetup(String),

    #[error("Failed to communicate with Gemini API: {0}")]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}
