use thiserror::Error;

/// Failures of the OAuth authorization-code round trip.
#[derive(Error, Debug)]
pub enum FederatedError {
    #[error("Invalid OAuth endpoint URL: {0}")]
    Url(#[from] oauth2::url::ParseError),

    #[error("Sign-in state did not match")]
    StateMismatch,

    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    #[error("OAuth provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("The provider did not share an email address")]
    MissingEmail,
}

pub type FederatedResult<T> = Result<T, FederatedError>;
