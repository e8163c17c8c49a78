use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::config::ServiceConfig;
use crate::llm::{GeminiAdapter, GeminiConfig, GenerationError, TextGenerator};
use crate::task::{StoreError, TaskDatabase};

/// Trimmed, non-empty environment value.
fn env_value(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    match env_value(key) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "ignoring unparseable environment value");
            default
        }),
        None => default,
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    match env_value(key).map(|raw| raw.to_ascii_lowercase()) {
        Some(raw) => matches!(raw.as_str(), "1" | "true" | "yes" | "on"),
        None => default,
    }
}

pub fn load_service_config() -> ServiceConfig {
    let defaults = ServiceConfig::default();
    ServiceConfig {
        port: env_parse("PORT", defaults.port),
        gemini_api_key: env_value("GEMINI_API_KEY"),
        gemini_base_url: env_value("GEMINI_BASE_URL").unwrap_or(defaults.gemini_base_url),
        gemini_model: env_value("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
        temperature: env_parse("GEMINI_TEMPERATURE", defaults.temperature),
        max_output_tokens: env_parse("GEMINI_MAX_OUTPUT_TOKENS", defaults.max_output_tokens),
        request_timeout_secs: env_parse("GEMINI_TIMEOUT_SECS", defaults.request_timeout_secs),
        database_url: env_value("DATABASE_URL"),
        log_json: env_bool("TASKGEN_LOG_JSON", defaults.log_json),
    }
}

pub fn build_text_generator(cfg: &ServiceConfig) -> Result<Arc<dyn TextGenerator>, GenerationError> {
    if cfg.gemini_api_key.is_none() {
        warn!("GEMINI_API_KEY is not set; generation requests will fail");
    }
    let adapter = GeminiAdapter::new(GeminiConfig {
        api_key: cfg.gemini_api_key.clone(),
        base_url: cfg.gemini_base_url.clone(),
        model: cfg.gemini_model.clone(),
        temperature: cfg.temperature,
        max_output_tokens: cfg.max_output_tokens,
        timeout: Duration::from_secs(cfg.request_timeout_secs),
    })?;
    Ok(Arc::new(adapter))
}

/// `Ok(None)` when no connection string is configured; task requests then
/// answer with a configuration error.
pub fn open_task_database(cfg: &ServiceConfig) -> Result<Option<TaskDatabase>, StoreError> {
    match &cfg.database_url {
        Some(url) => TaskDatabase::connect(url).map(Some),
        None => {
            warn!("DATABASE_URL is not set; task requests will fail");
            Ok(None)
        }
    }
}
