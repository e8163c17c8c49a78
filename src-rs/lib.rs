pub mod config;
pub mod error;
pub mod helpers;
pub mod logging;

#[path = "llm/lib.rs"]
pub mod llm;
#[path = "task/lib.rs"]
pub mod task;
#[path = "api/lib.rs"]
pub mod api;

pub use crate::api::{ApiRequest, ApiResponse, ApiServer, AppState, FunctionEvent, FunctionResponse};
pub use crate::config::ServiceConfig;
pub use crate::error::ApiError;
pub use crate::llm::{GeminiAdapter, GeminiConfig, GenerationError, ScriptedGenerator, TextGenerator};
pub use crate::task::{
    MemoryTaskStore, NewTask, SqliteTaskStore, StoreError, Task, TaskDatabase, TaskId, TaskPatch,
    TaskStatus, TaskStore,
};
