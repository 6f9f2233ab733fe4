use thiserror::Error;
use super::store::StoreError;

#[derive(Error, Debug)]
pub enum TaskError {
    #[error("Invalid task: {0}")]
    Invalid(String),

    #[error("Task {0} not found")]
    NotFound(String),

    #[error("Task {0} belongs to another user")]
    Forbidden(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type TaskResult<T> = Result<T, TaskError>;
