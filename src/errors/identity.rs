use thiserror::Error;
use redis::RedisError;

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Invalid or expired credential")]
    InvalidCredential,

    #[error("An account already exists for {0}")]
    EmailTaken(String),

    #[error("No account found for {0}")]
    UnknownAccount(String),

    #[error("Password is incorrect")]
    WrongPassword,

    #[error("{0}")]
    Invalid(String),

    #[error("Password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Redis error: {0}")]
    Redis(#[from] RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IdentityError {
    /// True when the failure comes from the provider's backend rather than
    /// from the credential itself.
    pub fn is_backend(&self) -> bool {
        matches!(
            self,
            IdentityError::Hash(_) | IdentityError::Redis(_) | IdentityError::Serialization(_)
        )
    }
}

pub type IdentityResult<T> = Result<T, IdentityError>;
