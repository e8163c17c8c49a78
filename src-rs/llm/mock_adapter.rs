use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::types::{GenerationError, TextGenerator};

/// A scripted generator for tests. Replays canned replies and counts calls.
pub struct ScriptedGenerator {
    replies: Mutex<Vec<Result<String, GenerationError>>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new(replies: Vec<Result<String, GenerationError>>) -> Self {
        Self {
            replies: Mutex::new(replies),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        let exhausted = || GenerationError::Upstream {
            status: 500,
            payload: "scripted generator exhausted".to_string(),
        };
        let mut replies = self.replies.lock().map_err(|_| exhausted())?;
        if replies.is_empty() {
            return Err(exhausted());
        }
        replies.remove(0)
    }
}
