use std::sync::Arc;
use chrono::Utc;
use crate::errors::{TaskError, TaskResult};
use crate::models::{NewTask, Task, TaskUpdate};
use super::store::TaskStore;

/// Owner-scoped CRUD over task records. Every caller-facing operation takes
/// the verified user id and refuses to touch records owned by someone else.
#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn TaskStore>,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, user_id: &str, title: String, content: String) -> TaskResult<String> {
        require_text("title", &title)?;
        require_text("content", &content)?;

        let task = self.store.insert(NewTask {
            user_id: user_id.to_string(),
            title,
            content,
            status: false,
            created_at: Utc::now(),
        }).await?;

        tracing::info!("Created todo {} for user {}", task.id, user_id);
        Ok(task.id)
    }

    pub async fn get_one(&self, user_id: &str, id: &str) -> TaskResult<Task> {
        let task = self.store.get(id).await?.ok_or_else(|| {
            tracing::debug!("Todo not found: {}", id);
            TaskError::NotFound(id.to_string())
        })?;

        if task.user_id != user_id {
            tracing::warn!("User {} denied access to todo {}", user_id, id);
            return Err(TaskError::Forbidden(id.to_string()));
        }
        Ok(task)
    }

    /// Unordered; ordering is up to the client.
    pub async fn list_mine(&self, user_id: &str) -> TaskResult<Vec<Task>> {
        let mut tasks = self.store.find_by_user(user_id).await?;
        tasks.retain(|task| task.user_id == user_id);
        tracing::debug!("Found {} todos for user {}", tasks.len(), user_id);
        Ok(tasks)
    }

    // The ownership read and the write are separate store calls; a concurrent
    // change in between is not detected.
    pub async fn update(&self, user_id: &str, id: &str, update: TaskUpdate) -> TaskResult<()> {
        self.get_one(user_id, id).await?;
        self.store.update(id, update).await?;
        tracing::info!("Updated todo {} for user {}", id, user_id);
        Ok(())
    }

    pub async fn delete(&self, user_id: &str, id: &str) -> TaskResult<()> {
        self.get_one(user_id, id).await?;
        self.store.delete(id).await?;
        tracing::info!("Deleted todo {} for user {}", id, user_id);
        Ok(())
    }
}

fn require_text(field: &str, value: &str) -> TaskResult<()> {
    if value.trim().is_empty() {
        return Err(TaskError::Invalid(format!("{} is required", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MemoryTaskStore;

    fn service() -> TaskService {
        TaskService::new(Arc::new(MemoryTaskStore::new()))
    }

    fn update(title: &str, content: &str, status: bool) -> TaskUpdate {
        TaskUpdate { title: title.into(), content: content.into(), status }
    }

    #[tokio::test]
    async fn created_task_is_readable_by_owner() {
        let service = service();
        let before = Utc::now();
        let id = service.create("alice", "Buy milk".into(), "2%".into()).await.unwrap();

        let task = service.get_one("alice", &id).await.unwrap();
        assert_eq!(task.id, id);
        assert_eq!(task.user_id, "alice");
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.content, "2%");
        assert!(!task.status);
        assert!(task.created_at >= before);
    }

    #[tokio::test]
    async fn blank_fields_are_rejected() {
        let service = service();
        let err = service.create("alice", "  ".into(), "2%".into()).await.unwrap_err();
        assert!(matches!(err, TaskError::Invalid(msg) if msg == "title is required"));

        let err = service.create("alice", "Buy milk".into(), String::new()).await.unwrap_err();
        assert!(matches!(err, TaskError::Invalid(msg) if msg == "content is required"));
        assert!(service.list_mine("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn other_users_cannot_read_update_or_delete() {
        let service = service();
        let id = service.create("alice", "Buy milk".into(), "2%".into()).await.unwrap();

        assert!(matches!(service.get_one("bob", &id).await, Err(TaskError::Forbidden(_))));
        assert!(matches!(
            service.update("bob", &id, update("hijacked", "x", true)).await,
            Err(TaskError::Forbidden(_))
        ));
        assert!(matches!(service.delete("bob", &id).await, Err(TaskError::Forbidden(_))));

        let task = service.get_one("alice", &id).await.unwrap();
        assert_eq!(task.title, "Buy milk");
        assert!(!task.status);
    }

    #[tokio::test]
    async fn list_mine_only_returns_callers_tasks() {
        let service = service();
        let mine = service.create("alice", "a".into(), "a".into()).await.unwrap();
        service.create("bob", "b".into(), "b".into()).await.unwrap();

        let tasks = service.list_mine("alice").await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, mine);
        assert!(tasks.iter().all(|t| t.user_id == "alice"));
    }

    #[tokio::test]
    async fn update_is_idempotent() {
        let service = service();
        let id = service.create("alice", "Buy milk".into(), "2%".into()).await.unwrap();

        service.update("alice", &id, update("Buy oat milk", "1L", true)).await.unwrap();
        let first = service.get_one("alice", &id).await.unwrap();
        service.update("alice", &id, update("Buy oat milk", "1L", true)).await.unwrap();
        let second = service.get_one("alice", &id).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second.title, "Buy oat milk");
        assert_eq!(second.content, "1L");
        assert!(second.status);
    }

    #[tokio::test]
    async fn deleted_task_is_gone() {
        let service = service();
        let id = service.create("alice", "Buy milk".into(), "2%".into()).await.unwrap();
        let kept = service.create("alice", "Walk dog".into(), "park".into()).await.unwrap();

        service.delete("alice", &id).await.unwrap();
        assert!(matches!(service.get_one("alice", &id).await, Err(TaskError::NotFound(_))));

        let ids: Vec<String> = service.list_mine("alice").await.unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![kept]);

        assert!(matches!(service.delete("alice", &id).await, Err(TaskError::NotFound(_))));
    }
}
