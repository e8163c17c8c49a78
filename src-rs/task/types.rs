use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_DESCRIPTION_CHARS: usize = 2000;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Task not found")]
    NotFound,

    #[error("Invalid task ID: {0}")]
    InvalidId(String),

    #[error("Unsupported database connection string: {0}")]
    UnsupportedUrl(String),

    #[error("Database connection is closed")]
    Closed,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// Store-assigned task identifier. Immutable once issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl FromStr for TaskId {
    type Err = StoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(raw.trim())
            .map(Self)
            .map_err(|_| StoreError::InvalidId(raw.to_string()))
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-supplied fields for a new task.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

impl NewTask {
    pub fn titled(title: &str) -> Self {
        Self {
            title: title.to_string(),
            description: None,
            status: TaskStatus::default(),
            due_date: None,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_title(&self.title)?;
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        Ok(())
    }

    pub fn into_task(self, now: DateTime<Utc>) -> Task {
        Task {
            id: TaskId::generate(),
            title: self.title,
            description: self.description,
            status: self.status,
            due_date: self.due_date,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update. An explicit `null` clears `description` or `dueDate`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TaskPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default, deserialize_with = "present")]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl TaskPatch {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(Some(description)) = &self.description {
            validate_description(description)?;
        }
        Ok(())
    }

    pub fn apply(self, task: &mut Task, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        task.updated_at = now;
    }
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn validate_title(title: &str) -> Result<(), String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err("Task title must not be empty".to_string());
    }
    if trimmed.chars().count() > MAX_TITLE_CHARS {
        return Err(format!("Task title must be at most {} characters", MAX_TITLE_CHARS));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), String> {
    if description.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(format!(
            "Task description must be at most {} characters",
            MAX_DESCRIPTION_CHARS
        ));
    }
    Ok(())
}
