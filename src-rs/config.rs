pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub port: u16,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub temperature: f64,
    pub max_output_tokens: u32,
    pub request_timeout_secs: u64,
    pub database_url: Option<String>,
    pub log_json: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            gemini_api_key: None,
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            temperature: 0.7,
            max_output_tokens: 800,
            request_timeout_secs: 60,
            database_url: None,
            log_json: false,
        }
    }
}
