pub mod gemini_adapter;
pub mod mock_adapter;
pub mod types;

pub use gemini_adapter::{GeminiAdapter, GeminiConfig};
pub use mock_adapter::ScriptedGenerator;
pub use types::{GenerationError, GenerationRequest, TextGenerator, NO_TEXT_RESPONSE};
