// Error types for each layer, built on thiserror. Only AppError knows about HTTP.
use thiserror::Error;

pub mod client;
pub mod federated;
pub mod identity;
pub mod response;
pub mod store;
pub mod task;

// Re-export commonly used types
pub use client::{ClientError, ClientResult};
pub use federated::{FederatedError, FederatedResult};
pub use identity::{IdentityError, IdentityResult};
pub use store::{StoreError, StoreResult};
pub use task::{TaskError, TaskResult};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unauthorized")]
    Unauthenticated,

    #[error("Invalid token")]
    InvalidCredential,

    #[error("{0}")]
    BadRequest(String),

    #[error("todo not found")]
    NotFound,

    #[error("Unauthorized to access this todo")]
    Forbidden,

    #[error("Request body too large")]
    PayloadTooLarge,

    // Details stay in the logs, the message is what the caller sees
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Translates a task service failure, using `context` as the message for
    /// store failures (e.g. "Failed to create todo").
    pub fn from_task(err: TaskError, context: &str) -> Self {
        match err {
            TaskError::Invalid(msg) => AppError::BadRequest(msg),
            TaskError::NotFound(_) | TaskError::Store(StoreError::NotFound(_)) => AppError::NotFound,
            TaskError::Forbidden(_) => AppError::Forbidden,
            TaskError::Store(e) => {
                tracing::error!("{}: {}", context, e);
                AppError::Internal(context.to_string())
            }
        }
    }
}

// Custom result type
pub type AppResult<T> = Result<T, AppError>;
