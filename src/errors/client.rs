use thiserror::Error;

/// Failures seen by the web client when calling the todo API.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Not signed in")]
    Unauthenticated,

    #[error("Your session has expired. Please log in again.")]
    InvalidCredential,

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Could not reach the todo service: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    /// Errors after which the user has to sign in again.
    pub fn requires_login(&self) -> bool {
        matches!(self, ClientError::Unauthenticated | ClientError::InvalidCredential)
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
