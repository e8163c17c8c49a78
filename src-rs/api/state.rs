use std::sync::Arc;

use super::handlers::{GenerateHandler, TaskHandler};
use crate::llm::TextGenerator;
use crate::task::TaskStore;

#[derive(Clone)]
pub struct AppState {
    pub generate: Arc<GenerateHandler>,
    pub tasks: Arc<TaskHandler>,
}

impl AppState {
    pub fn new(generator: Arc<dyn TextGenerator>, store: Option<Arc<dyn TaskStore>>) -> Self {
        Self {
            generate: Arc::new(GenerateHandler::new(generator)),
            tasks: Arc::new(TaskHandler::new(store)),
        }
    }
}
