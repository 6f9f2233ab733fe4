use std::collections::HashMap;
use async_trait::async_trait;
use tokio::sync::RwLock;
use crate::errors::{StoreError, StoreResult};
use crate::models::{NewTask, Task, TaskUpdate};
use super::{generate_id, TaskStore};

/// Process-local store for development (`store.backend = "memory"`) and tests.
#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: RwLock<HashMap<String, Task>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn insert(&self, task: NewTask) -> StoreResult<Task> {
        let task = task.into_task(generate_id());
        self.tasks.write().await.insert(task.id.clone(), task.clone());
        Ok(task)
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Task>> {
        Ok(self.tasks.read().await.get(id).cloned())
    }

    async fn find_by_user(&self, user_id: &str) -> StoreResult<Vec<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.values().filter(|t| t.user_id == user_id).cloned().collect())
    }

    async fn update(&self, id: &str, update: TaskUpdate) -> StoreResult<()> {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        update.apply(task);
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        self.tasks.write().await.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn new_task(user_id: &str, title: &str) -> NewTask {
        NewTask {
            user_id: user_id.to_string(),
            title: title.to_string(),
            content: "content".to_string(),
            status: false,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_distinct_ids() {
        let store = MemoryTaskStore::new();
        let a = store.insert(new_task("u1", "a")).await.unwrap();
        let b = store.insert(new_task("u1", "b")).await.unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(store.get(&a.id).await.unwrap(), Some(a));
    }

    #[tokio::test]
    async fn find_by_user_filters_on_owner() {
        let store = MemoryTaskStore::new();
        store.insert(new_task("u1", "mine")).await.unwrap();
        store.insert(new_task("u2", "theirs")).await.unwrap();

        let found = store.find_by_user("u1").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "mine");
    }

    #[tokio::test]
    async fn update_missing_record_fails() {
        let store = MemoryTaskStore::new();
        let update = TaskUpdate { title: "t".into(), content: "c".into(), status: true };

        let err = store.update("nope", update).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryTaskStore::new();
        let task = store.insert(new_task("u1", "a")).await.unwrap();

        store.delete(&task.id).await.unwrap();
        store.delete(&task.id).await.unwrap();
        assert_eq!(store.get(&task.id).await.unwrap(), None);
    }
}
