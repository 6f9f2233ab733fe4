pub mod identity;
pub mod store;
mod task_service;

pub use identity::{IdentityProvider, MemoryIdentityProvider, RedisIdentityProvider};
pub use store::{MemoryTaskStore, RedisTaskStore, TaskStore};
pub use task_service::TaskService;

/// Redis behind `APP_TEST_REDIS_URL`; the Redis-backed tests return early
/// when it is unset.
#[cfg(test)]
pub(crate) fn test_redis_client() -> Option<std::sync::Arc<redis::Client>> {
    let url = std::env::var("APP_TEST_REDIS_URL").ok()?;
    let client = redis::Client::open(url).expect("APP_TEST_REDIS_URL is not a Redis URL");
    Some(std::sync::Arc::new(client))
}
