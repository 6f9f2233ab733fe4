//! Identity provider seam.
//!
//! The task API only ever calls [`IdentityProvider::verify`]; registration,
//! sign-in and sign-out are used by the web client. Tokens are opaque UUIDs
//! that resolve to an [`Identity`] until they expire or are revoked.
mod memory;
mod redis_provider;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::broadcast;
use crate::errors::{IdentityError, IdentityResult};
use crate::models::{Account, AuthEvent, Identity, Session};

pub use memory::MemoryIdentityProvider;
pub use redis_provider::RedisIdentityProvider;

const AUTH_EVENT_CAPACITY: usize = 64;
// Ten years; keeps the expiry arithmetic in range
const MAX_TOKEN_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Creates an account and signs it in.
    async fn register(&self, email: &str, password: &str, display_name: &str) -> IdentityResult<Session>;

    async fn sign_in(&self, email: &str, password: &str) -> IdentityResult<Session>;

    /// Signs in the account for an email an OAuth provider has vouched for,
    /// creating it on first use. Accounts created this way have no password.
    async fn sign_in_federated(&self, email: &str, display_name: &str) -> IdentityResult<Session>;

    /// Resolves a bearer token. Unknown, expired and malformed tokens all
    /// fail with `IdentityError::InvalidCredential`.
    async fn verify(&self, token: &str) -> IdentityResult<Identity>;

    /// Revokes a token. Revoking an unknown token is not an error.
    async fn sign_out(&self, token: &str) -> IdentityResult<()>;

    /// Auth-state changes; dropping the receiver unsubscribes.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}

/// Broadcast side of the auth-state channel, shared by the providers.
pub(crate) struct AuthEvents {
    sender: broadcast::Sender<AuthEvent>,
}

impl AuthEvents {
    pub(crate) fn new() -> Self {
        let (sender, _) = broadcast::channel(AUTH_EVENT_CAPACITY);
        Self { sender }
    }

    pub(crate) fn publish(&self, event: AuthEvent) {
        // No subscribers is fine
        let _ = self.sender.send(event);
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.sender.subscribe()
    }
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn validate_registration(email: &str, password: &str) -> IdentityResult<()> {
    if email.is_empty() || !email.contains('@') {
        return Err(IdentityError::Invalid("A valid email address is required".into()));
    }
    if password.is_empty() {
        return Err(IdentityError::Invalid("A password is required".into()));
    }
    Ok(())
}

pub(crate) fn federated_account(email: &str, display_name: &str) -> IdentityResult<Account> {
    let email = normalize_email(email);
    if !email.contains('@') {
        return Err(IdentityError::Invalid("A valid email address is required".into()));
    }
    let display_name = match display_name.trim() {
        "" => email.clone(),
        name => name.to_string(),
    };
    Ok(Account {
        uid: uuid::Uuid::new_v4().to_string(),
        email,
        display_name,
        password_hash: String::new(),
    })
}

// Federated accounts carry an empty hash and never match a password
pub(crate) fn check_password(account: &Account, password: &str) -> IdentityResult<()> {
    if account.password_hash.is_empty() || !bcrypt::verify(password, &account.password_hash)? {
        return Err(IdentityError::WrongPassword);
    }
    Ok(())
}

pub(crate) fn issue_session(identity: Identity, ttl_secs: u64) -> Session {
    let ttl = chrono::Duration::seconds(ttl_secs.min(MAX_TOKEN_TTL_SECS) as i64);
    Session {
        token: uuid::Uuid::new_v4().to_string(),
        identity,
        expires_at: Utc::now() + ttl,
    }
}

// Cheap shape check before touching the backend
pub(crate) fn is_well_formed_token(token: &str) -> bool {
    uuid::Uuid::parse_str(token).is_ok()
}
