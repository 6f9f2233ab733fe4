use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Account {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,  // bcrypt, never the plain password
}

/// The subject a bearer token resolves to.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Identity {
    pub uid: String,
    pub email: String,
    pub display_name: String,
}

impl From<&Account> for Identity {
    fn from(account: &Account) -> Self {
        Self {
            uid: account.uid.clone(),
            email: account.email.clone(),
            display_name: account.display_name.clone(),
        }
    }
}

/// Result of a successful sign-in or registration.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub identity: Identity,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    SignedIn { uid: String, display_name: String },
    SignedOut { uid: String },
}
