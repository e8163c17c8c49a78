use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use super::types::{NewTask, StoreError, Task, TaskId, TaskPatch};

/// Data access over the task collection.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn find_by_id(&self, id: &TaskId) -> Result<Task, StoreError>;

    /// Full snapshot, newest first.
    async fn find_all(&self) -> Result<Vec<Task>, StoreError>;

    async fn insert(&self, fields: NewTask) -> Result<Task, StoreError>;

    async fn update_by_id(&self, id: &TaskId, patch: TaskPatch) -> Result<Task, StoreError>;

    /// Returns the removed record.
    async fn delete_by_id(&self, id: &TaskId) -> Result<Task, StoreError>;

    async fn close(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

pub struct MemoryTaskStore {
    tasks: RwLock<Option<HashMap<TaskId, Task>>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(Some(HashMap::new())),
        }
    }

    fn read<T>(&self, f: impl FnOnce(&HashMap<TaskId, Task>) -> T) -> Result<T, StoreError> {
        let guard = self
            .tasks
            .read()
            .map_err(|_| StoreError::Storage("task map lock poisoned".to_string()))?;
        guard.as_ref().map(f).ok_or(StoreError::Closed)
    }

    fn write<T>(
        &self,
        f: impl FnOnce(&mut HashMap<TaskId, Task>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self
            .tasks
            .write()
            .map_err(|_| StoreError::Storage("task map lock poisoned".to_string()))?;
        guard.as_mut().ok_or(StoreError::Closed).and_then(f)
    }
}

impl Default for MemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn find_by_id(&self, id: &TaskId) -> Result<Task, StoreError> {
        self.read(|map| map.get(id).cloned())?
            .ok_or(StoreError::NotFound)
    }

    async fn find_all(&self) -> Result<Vec<Task>, StoreError> {
        let mut items = self.read(|map| map.values().cloned().collect::<Vec<_>>())?;
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn insert(&self, fields: NewTask) -> Result<Task, StoreError> {
        let task = fields.into_task(Utc::now());
        self.write(|map| {
            map.insert(task.id, task.clone());
            Ok(task)
        })
    }

    async fn update_by_id(&self, id: &TaskId, patch: TaskPatch) -> Result<Task, StoreError> {
        self.write(|map| {
            let task = map.get_mut(id).ok_or(StoreError::NotFound)?;
            patch.apply(task, Utc::now());
            Ok(task.clone())
        })
    }

    async fn delete_by_id(&self, id: &TaskId) -> Result<Task, StoreError> {
        self.write(|map| map.remove(id).ok_or(StoreError::NotFound))
    }

    async fn close(&self) -> Result<(), StoreError> {
        let mut guard = self
            .tasks
            .write()
            .map_err(|_| StoreError::Storage("task map lock poisoned".to_string()))?;
        guard.take();
        Ok(())
    }
}
