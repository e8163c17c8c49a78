use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use tracing::info;

use super::sqlite_store::SqliteTaskStore;
use super::store::{MemoryTaskStore, TaskStore};
use super::types::StoreError;

/// Parsed `DATABASE_URL`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DatabaseUrl {
    Memory,
    SqliteMemory,
    Sqlite(PathBuf),
}

impl FromStr for DatabaseUrl {
    type Err = StoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw == "memory" || raw == "memory://" {
            return Ok(Self::Memory);
        }
        if raw == "sqlite::memory:" || raw == "sqlite://:memory:" {
            return Ok(Self::SqliteMemory);
        }
        if let Some(path) = raw.strip_prefix("sqlite://") {
            if path.is_empty() {
                return Err(StoreError::UnsupportedUrl(raw.to_string()));
            }
            return Ok(Self::Sqlite(PathBuf::from(path)));
        }
        let is_sqlite_file = [".db", ".sqlite", ".sqlite3"]
            .iter()
            .any(|ext| raw.ends_with(ext));
        if is_sqlite_file && !raw.contains("://") {
            return Ok(Self::Sqlite(PathBuf::from(raw)));
        }
        Err(StoreError::UnsupportedUrl(redact(raw)))
    }
}

fn redact(raw: &str) -> String {
    // Connection strings may carry credentials; report the scheme only.
    match raw.split_once("://") {
        Some((scheme, _)) => format!("{}://…", scheme),
        None => raw.to_string(),
    }
}

/// Owned handle to the task collection. Opened once at process start and
/// closed on shutdown.
pub struct TaskDatabase {
    url: DatabaseUrl,
    store: Arc<dyn TaskStore>,
}

impl TaskDatabase {
    pub fn connect(raw_url: &str) -> Result<Self, StoreError> {
        let url: DatabaseUrl = raw_url.parse()?;
        let store: Arc<dyn TaskStore> = match &url {
            DatabaseUrl::Memory => Arc::new(MemoryTaskStore::new()),
            DatabaseUrl::SqliteMemory => Arc::new(SqliteTaskStore::in_memory()?),
            DatabaseUrl::Sqlite(path) => Arc::new(SqliteTaskStore::open(path)?),
        };
        info!(url = ?url, "task database connected");
        Ok(Self { url, store })
    }

    pub fn store(&self) -> Arc<dyn TaskStore> {
        self.store.clone()
    }

    pub async fn close(self) -> Result<(), StoreError> {
        self.store.close().await?;
        info!(url = ?self.url, "task database closed");
        Ok(())
    }
}
