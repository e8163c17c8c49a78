use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::store::TaskStore;
use super::types::{NewTask, StoreError, Task, TaskId, TaskPatch};

/// Task documents kept as JSON rows in SQLite, keyed by id.
pub struct SqliteTaskStore {
    conn: Mutex<Option<Connection>>,
}

impl SqliteTaskStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::init(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL,
                document TEXT NOT NULL
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Connection>>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Storage("connection lock poisoned".to_string()))
    }
}

fn load(conn: &Connection, id: &TaskId) -> Result<Task, StoreError> {
    let document: Option<String> = conn
        .query_row(
            "SELECT document FROM tasks WHERE id = ?1",
            [id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    let document = document.ok_or(StoreError::NotFound)?;
    Ok(serde_json::from_str(&document)?)
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    async fn find_by_id(&self, id: &TaskId) -> Result<Task, StoreError> {
        let guard = self.lock()?;
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;
        load(conn, id)
    }

    async fn find_all(&self) -> Result<Vec<Task>, StoreError> {
        let guard = self.lock()?;
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;
        let mut stmt = conn.prepare("SELECT document FROM tasks ORDER BY created_at DESC")?;
        let documents = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        let tasks = documents
            .iter()
            .map(|document| serde_json::from_str(document))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    async fn insert(&self, fields: NewTask) -> Result<Task, StoreError> {
        let task = fields.into_task(Utc::now());
        let document = serde_json::to_string(&task)?;
        let created_at = task.created_at.to_rfc3339_opts(SecondsFormat::Nanos, true);
        let guard = self.lock()?;
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;
        conn.execute(
            "INSERT INTO tasks (id, created_at, document) VALUES (?1, ?2, ?3)",
            params![task.id.to_string(), created_at, document],
        )?;
        Ok(task)
    }

    async fn update_by_id(&self, id: &TaskId, patch: TaskPatch) -> Result<Task, StoreError> {
        let mut guard = self.lock()?;
        let conn = guard.as_mut().ok_or(StoreError::Closed)?;
        let tx = conn.transaction()?;
        let mut task = load(&tx, id)?;
        patch.apply(&mut task, Utc::now());
        tx.execute(
            "UPDATE tasks SET document = ?1 WHERE id = ?2",
            params![serde_json::to_string(&task)?, id.to_string()],
        )?;
        tx.commit()?;
        Ok(task)
    }

    async fn delete_by_id(&self, id: &TaskId) -> Result<Task, StoreError> {
        let mut guard = self.lock()?;
        let conn = guard.as_mut().ok_or(StoreError::Closed)?;
        let tx = conn.transaction()?;
        let task = load(&tx, id)?;
        tx.execute("DELETE FROM tasks WHERE id = ?1", [id.to_string()])?;
        tx.commit()?;
        Ok(task)
    }

    async fn close(&self) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        if let Some(conn) = guard.take() {
            conn.close().map_err(|(_, err)| StoreError::Sqlite(err))?;
        }
        Ok(())
    }
}
