use std::sync::Arc;

use chrono::{TimeZone, Utc};
use taskgen_rs::task::{
    MemoryTaskStore, NewTask, SqliteTaskStore, StoreError, TaskId, TaskPatch, TaskStatus,
    TaskStore,
};

fn stores() -> Vec<(&'static str, Arc<dyn TaskStore>)> {
    let memory: Arc<dyn TaskStore> = Arc::new(MemoryTaskStore::new());
    let sqlite: Arc<dyn TaskStore> = Arc::new(SqliteTaskStore::in_memory().unwrap());
    vec![("memory", memory), ("sqlite", sqlite)]
}

fn sample() -> NewTask {
    NewTask {
        title: "Write quarterly report".to_string(),
        description: Some("numbers from finance".to_string()),
        status: TaskStatus::InProgress,
        due_date: Some(Utc.with_ymd_and_hms(2026, 11, 1, 9, 30, 0).unwrap()),
    }
}

#[tokio::test]
async fn insert_then_find_returns_supplied_fields() {
    for (name, store) in stores() {
        let fields = sample();
        let created = store.insert(fields.clone()).await.unwrap();
        let found = store.find_by_id(&created.id).await.unwrap();

        assert_eq!(found, created, "{name}");
        assert_eq!(found.title, fields.title, "{name}");
        assert_eq!(found.description, fields.description, "{name}");
        assert_eq!(found.status, fields.status, "{name}");
        assert_eq!(found.due_date, fields.due_date, "{name}");
    }
}

#[tokio::test]
async fn padded_title_is_stored_as_supplied() {
    for (name, store) in stores() {
        let fields = NewTask::titled("  padded  ");
        let created = store.insert(fields.clone()).await.unwrap();
        let found = store.find_by_id(&created.id).await.unwrap();
        assert_eq!(found.title, fields.title, "{name}");

        let patch = TaskPatch {
            title: Some(" renamed ".to_string()),
            ..TaskPatch::default()
        };
        store.update_by_id(&created.id, patch).await.unwrap();
        let found = store.find_by_id(&created.id).await.unwrap();
        assert_eq!(found.title, " renamed ", "{name}");
    }
}

#[tokio::test]
async fn ids_are_unique() {
    for (name, store) in stores() {
        let a = store.insert(NewTask::titled("a")).await.unwrap();
        let b = store.insert(NewTask::titled("a")).await.unwrap();
        assert_ne!(a.id, b.id, "{name}");
    }
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    for (name, store) in stores() {
        store.insert(NewTask::titled("present")).await.unwrap();
        let missing = TaskId::generate();

        assert!(
            matches!(store.find_by_id(&missing).await, Err(StoreError::NotFound)),
            "{name}"
        );
        assert!(
            matches!(
                store.update_by_id(&missing, TaskPatch::default()).await,
                Err(StoreError::NotFound)
            ),
            "{name}"
        );
        assert!(
            matches!(store.delete_by_id(&missing).await, Err(StoreError::NotFound)),
            "{name}"
        );
    }
}

#[tokio::test]
async fn delete_twice_yields_not_found() {
    for (name, store) in stores() {
        let created = store.insert(NewTask::titled("ephemeral")).await.unwrap();
        let deleted = store.delete_by_id(&created.id).await.unwrap();
        assert_eq!(deleted.id, created.id, "{name}");
        assert!(
            matches!(store.delete_by_id(&created.id).await, Err(StoreError::NotFound)),
            "{name}"
        );
        assert!(store.find_all().await.unwrap().is_empty(), "{name}");
    }
}

#[tokio::test]
async fn update_merges_and_keeps_identity() {
    for (name, store) in stores() {
        let created = store.insert(sample()).await.unwrap();
        let patch = TaskPatch {
            status: Some(TaskStatus::Completed),
            description: Some(None),
            ..TaskPatch::default()
        };
        let updated = store.update_by_id(&created.id, patch).await.unwrap();

        assert_eq!(updated.id, created.id, "{name}");
        assert_eq!(updated.title, created.title, "{name}");
        assert_eq!(updated.status, TaskStatus::Completed, "{name}");
        assert_eq!(updated.description, None, "{name}");
        assert_eq!(updated.due_date, created.due_date, "{name}");
        assert_eq!(updated.created_at, created.created_at, "{name}");
        assert!(updated.updated_at >= created.updated_at, "{name}");

        let reread = store.find_by_id(&created.id).await.unwrap();
        assert_eq!(reread, updated, "{name}");
    }
}

#[tokio::test]
async fn find_all_returns_every_task() {
    for (name, store) in stores() {
        for title in ["one", "two", "three"] {
            store.insert(NewTask::titled(title)).await.unwrap();
        }
        let mut titles: Vec<String> = store
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|task| task.title)
            .collect();
        titles.sort();
        assert_eq!(titles, vec!["one", "three", "two"], "{name}");
    }
}
