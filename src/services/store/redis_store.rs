use redis::{Client, AsyncCommands};
use std::sync::Arc;
use async_trait::async_trait;
use crate::errors::{StoreError, StoreResult};
use crate::models::{NewTask, Task, TaskUpdate};
use super::{generate_id, TaskStore};

// Layout: one JSON document per task plus a set of ids per owner, which
// serves as the equality index on userId.
fn todo_key(id: &str) -> String {
    format!("todo:{}", id)
}

fn user_index_key(user_id: &str) -> String {
    format!("user_todos:{}", user_id)
}

// SET XX only writes when the key still exists, so an update racing a delete
// fails instead of recreating a record that has left the owner's index.
async fn write_existing(
    conn: &mut redis::aio::Connection,
    key: &str,
    task_json: String,
) -> StoreResult<()> {
    let written: Option<String> = redis::cmd("SET")
        .arg(key)
        .arg(task_json)
        .arg("XX")
        .query_async(conn)
        .await?;
    match written {
        Some(_) => Ok(()),
        None => Err(StoreError::NotFound(key.to_string())),
    }
}

pub struct RedisTaskStore {
    client: Arc<Client>,
}

impl RedisTaskStore {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }
}

impl Clone for RedisTaskStore {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone()
        }
    }
}

#[async_trait]
impl TaskStore for RedisTaskStore {
    async fn insert(&self, task: NewTask) -> StoreResult<Task> {
        let mut conn = self.client.get_async_connection().await?;
        let task = task.into_task(generate_id());
        let task_json = serde_json::to_string(&task)?;

        redis::pipe()
            .atomic()
            .set(todo_key(&task.id), task_json).ignore()
            .sadd(user_index_key(&task.user_id), &task.id).ignore()
            .query_async::<_, ()>(&mut conn)
            .await?;

        tracing::debug!("Inserted todo {} for user {}", task.id, task.user_id);
        Ok(task)
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Task>> {
        let mut conn = self.client.get_async_connection().await?;
        let task_data: Option<String> = conn.get(todo_key(id)).await?;
        match task_data {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    async fn find_by_user(&self, user_id: &str) -> StoreResult<Vec<Task>> {
        let mut conn = self.client.get_async_connection().await?;
        let ids: Vec<String> = conn.smembers(user_index_key(user_id)).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = ids.iter().map(|id| todo_key(id)).collect();
        let documents: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&keys)
            .query_async(&mut conn)
            .await?;

        let mut tasks = Vec::with_capacity(documents.len());
        for (id, document) in ids.iter().zip(documents) {
            match document {
                Some(data) => tasks.push(serde_json::from_str(&data)?),
                // Index entry outlived its document
                None => tracing::warn!("Todo {} indexed for user {} but missing", id, user_id),
            }
        }
        Ok(tasks)
    }

    async fn update(&self, id: &str, update: TaskUpdate) -> StoreResult<()> {
        let mut conn = self.client.get_async_connection().await?;
        let key = todo_key(id);
        let task_data: Option<String> = conn.get(&key).await?;
        let mut task: Task = match task_data {
            Some(data) => serde_json::from_str(&data)?,
            None => return Err(StoreError::NotFound(key)),
        };

        update.apply(&mut task);
        write_existing(&mut conn, &key, serde_json::to_string(&task)?).await
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let mut conn = self.client.get_async_connection().await?;
        let key = todo_key(id);
        let task_data: Option<String> = conn.get(&key).await?;
        let Some(data) = task_data else {
            return Ok(());
        };
        let task: Task = serde_json::from_str(&data)?;

        redis::pipe()
            .atomic()
            .del(&key).ignore()
            .srem(user_index_key(&task.user_id), id).ignore()
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }
}
