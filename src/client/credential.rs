use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use crate::models;

const CREDENTIAL_KEY: &str = "credential";

/// What the web client remembers about a signed-in user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Credential {
    pub token: String,
    pub display_name: String,
}

impl From<&models::Session> for Credential {
    fn from(session: &models::Session) -> Self {
        let display_name = if session.identity.display_name.is_empty() {
            session.identity.email.clone()
        } else {
            session.identity.display_name.clone()
        };
        Self { token: session.token.clone(), display_name }
    }
}

pub async fn load(session: &Session) -> Option<Credential> {
    match session.get::<Credential>(CREDENTIAL_KEY).await {
        Ok(credential) => credential,
        Err(e) => {
            tracing::warn!("Session read error: {}", e);
            None
        }
    }
}

pub async fn store(session: &Session, credential: Credential) -> Result<(), tower_sessions::session::Error> {
    session.insert(CREDENTIAL_KEY, credential).await
}

pub async fn clear(session: &Session) {
    if let Err(e) = session.remove::<Credential>(CREDENTIAL_KEY).await {
        tracing::warn!("Session removal error: {}", e);
    }
}
