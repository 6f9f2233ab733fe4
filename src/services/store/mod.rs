//! Record store seam. The task service only sees [`TaskStore`]; which
//! backend sits behind it is decided in `main` from configuration.
mod memory;
mod redis_store;

use async_trait::async_trait;
use crate::errors::StoreResult;
use crate::models::{NewTask, Task, TaskUpdate};

pub use memory::MemoryTaskStore;
pub use redis_store::RedisTaskStore;

/// Document-style access to task records. Each write is atomic on its own and
/// no write recreates a record that has been deleted.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Inserts a record under a freshly generated id and returns it.
    async fn insert(&self, task: NewTask) -> StoreResult<Task>;

    async fn get(&self, id: &str) -> StoreResult<Option<Task>>;

    /// Equality query on `userId`, in no particular order.
    async fn find_by_user(&self, user_id: &str) -> StoreResult<Vec<Task>>;

    /// Overwrites the mutable fields. Fails with `StoreError::NotFound` when
    /// the id is absent.
    async fn update(&self, id: &str, update: TaskUpdate) -> StoreResult<()>;

    /// Removes the record; deleting an absent id succeeds.
    async fn delete(&self, id: &str) -> StoreResult<()>;
}

pub(crate) fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
