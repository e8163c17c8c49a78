pub mod database;
pub mod sqlite_store;
pub mod store;
pub mod types;

pub use database::{DatabaseUrl, TaskDatabase};
pub use sqlite_store::SqliteTaskStore;
pub use store::{MemoryTaskStore, TaskStore};
pub use types::{NewTask, StoreError, Task, TaskId, TaskPatch, TaskStatus};
