use std::collections::HashMap;
use async_trait::async_trait;
use bcrypt::hash;
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, RwLock};
use crate::errors::{IdentityError, IdentityResult};
use crate::models::{Account, AuthEvent, Identity, Session};
use super::{
    check_password, federated_account, issue_session, is_well_formed_token, normalize_email,
    validate_registration, AuthEvents, IdentityProvider,
};

#[derive(Default)]
struct Inner {
    accounts: HashMap<String, Account>,
    tokens: HashMap<String, (Identity, DateTime<Utc>)>,
}

/// Process-local provider with the same semantics as the Redis one.
pub struct MemoryIdentityProvider {
    inner: RwLock<Inner>,
    token_ttl_secs: u64,
    bcrypt_cost: u32,
    events: AuthEvents,
}

impl MemoryIdentityProvider {
    pub fn new(token_ttl_secs: u64, bcrypt_cost: u32) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            token_ttl_secs,
            bcrypt_cost,
            events: AuthEvents::new(),
        }
    }

    async fn store_session(&self, identity: Identity) -> Session {
        let session = issue_session(identity, self.token_ttl_secs);
        let now = Utc::now();
        let mut inner = self.inner.write().await;
        // Expired tokens nobody presents again would otherwise pile up
        inner.tokens.retain(|_, (_, expires_at)| *expires_at > now);
        inner.tokens.insert(
            session.token.clone(),
            (session.identity.clone(), session.expires_at),
        );
        drop(inner);

        self.events.publish(AuthEvent::SignedIn {
            uid: session.identity.uid.clone(),
            display_name: session.identity.display_name.clone(),
        });
        session
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn register(&self, email: &str, password: &str, display_name: &str) -> IdentityResult<Session> {
        let email = normalize_email(email);
        validate_registration(&email, password)?;
        let password_hash = hash(password.as_bytes(), self.bcrypt_cost)?;

        let account = {
            let mut inner = self.inner.write().await;
            if inner.accounts.contains_key(&email) {
                return Err(IdentityError::EmailTaken(email));
            }
            let account = Account {
                uid: uuid::Uuid::new_v4().to_string(),
                email: email.clone(),
                display_name: display_name.trim().to_string(),
                password_hash,
            };
            inner.accounts.insert(email, account.clone());
            account
        };

        Ok(self.store_session(Identity::from(&account)).await)
    }

    async fn sign_in(&self, email: &str, password: &str) -> IdentityResult<Session> {
        let email = normalize_email(email);
        let account = self
            .inner
            .read()
            .await
            .accounts
            .get(&email)
            .cloned()
            .ok_or(IdentityError::UnknownAccount(email))?;

        check_password(&account, password)?;
        Ok(self.store_session(Identity::from(&account)).await)
    }

    async fn sign_in_federated(&self, email: &str, display_name: &str) -> IdentityResult<Session> {
        let candidate = federated_account(email, display_name)?;
        let account = {
            let mut inner = self.inner.write().await;
            match inner.accounts.get(&candidate.email) {
                Some(existing) => existing.clone(),
                None => {
                    tracing::info!("Created federated account {}", candidate.uid);
                    inner.accounts.insert(candidate.email.clone(), candidate.clone());
                    candidate
                }
            }
        };
        Ok(self.store_session(Identity::from(&account)).await)
    }

    async fn verify(&self, token: &str) -> IdentityResult<Identity> {
        if !is_well_formed_token(token) {
            return Err(IdentityError::InvalidCredential);
        }

        let mut inner = self.inner.write().await;
        match inner.tokens.get(token) {
            Some((identity, expires_at)) if *expires_at > Utc::now() => Ok(identity.clone()),
            Some(_) => {
                inner.tokens.remove(token);
                Err(IdentityError::InvalidCredential)
            }
            None => Err(IdentityError::InvalidCredential),
        }
    }

    async fn sign_out(&self, token: &str) -> IdentityResult<()> {
        let removed = self.inner.write().await.tokens.remove(token);
        if let Some((identity, _)) = removed {
            self.events.publish(AuthEvent::SignedOut { uid: identity.uid });
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> MemoryIdentityProvider {
        MemoryIdentityProvider::new(3600, 4)
    }

    #[tokio::test]
    async fn register_then_verify() {
        let provider = provider();
        let session = provider.register("Ada@Example.com", "secret", "Ada").await.unwrap();

        let identity = provider.verify(&session.token).await.unwrap();
        assert_eq!(identity.email, "ada@example.com");
        assert_eq!(identity.display_name, "Ada");
        assert_eq!(identity, session.identity);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let provider = provider();
        provider.register("ada@example.com", "secret", "Ada").await.unwrap();

        let err = provider.register(" ADA@example.com", "other", "Imposter").await.unwrap_err();
        assert!(matches!(err, IdentityError::EmailTaken(_)));
    }

    #[tokio::test]
    async fn sign_in_checks_password() {
        let provider = provider();
        let registered = provider.register("ada@example.com", "secret", "Ada").await.unwrap();

        let err = provider.sign_in("ada@example.com", "wrong").await.unwrap_err();
        assert!(matches!(err, IdentityError::WrongPassword));

        let err = provider.sign_in("bob@example.com", "secret").await.unwrap_err();
        assert!(matches!(err, IdentityError::UnknownAccount(_)));

        let session = provider.sign_in("ada@example.com", "secret").await.unwrap();
        assert_eq!(session.identity.uid, registered.identity.uid);
        assert_ne!(session.token, registered.token);
    }

    #[tokio::test]
    async fn expired_and_revoked_tokens_are_invalid() {
        let expiring = MemoryIdentityProvider::new(0, 4);
        let session = expiring.register("ada@example.com", "secret", "Ada").await.unwrap();
        assert!(matches!(
            expiring.verify(&session.token).await,
            Err(IdentityError::InvalidCredential)
        ));

        let provider = provider();
        let session = provider.register("ada@example.com", "secret", "Ada").await.unwrap();
        provider.sign_out(&session.token).await.unwrap();
        provider.sign_out(&session.token).await.unwrap();
        assert!(matches!(
            provider.verify(&session.token).await,
            Err(IdentityError::InvalidCredential)
        ));
        assert!(matches!(
            provider.verify("not-a-token").await,
            Err(IdentityError::InvalidCredential)
        ));
    }

    #[tokio::test]
    async fn expired_tokens_are_pruned_when_new_sessions_are_issued() {
        let provider = MemoryIdentityProvider::new(0, 4);
        provider.register("ada@example.com", "secret", "Ada").await.unwrap();
        for _ in 0..5 {
            provider.sign_in("ada@example.com", "secret").await.unwrap();
        }
        assert_eq!(provider.inner.read().await.tokens.len(), 1);

        let live = self::provider();
        live.register("ada@example.com", "secret", "Ada").await.unwrap();
        live.sign_in("ada@example.com", "secret").await.unwrap();
        assert_eq!(live.inner.read().await.tokens.len(), 2);
    }

    #[tokio::test]
    async fn federated_sign_in_creates_then_reuses_the_account() {
        let provider = provider();
        let first = provider.sign_in_federated("Grace@Example.com", "Grace").await.unwrap();
        assert_eq!(first.identity.email, "grace@example.com");
        assert_eq!(provider.verify(&first.token).await.unwrap(), first.identity);

        let again = provider.sign_in_federated("grace@example.com", "Renamed").await.unwrap();
        assert_eq!(again.identity, first.identity);
        assert_ne!(again.token, first.token);

        let err = provider.sign_in("grace@example.com", "").await.unwrap_err();
        assert!(matches!(err, IdentityError::WrongPassword));

        let registered = provider.register("ada@example.com", "secret", "Ada").await.unwrap();
        let linked = provider.sign_in_federated("ada@example.com", "Ada L").await.unwrap();
        assert_eq!(linked.identity.uid, registered.identity.uid);
    }

    #[tokio::test]
    async fn auth_state_changes_are_published() {
        let provider = provider();
        let mut events = provider.subscribe();

        let session = provider.register("ada@example.com", "secret", "Ada").await.unwrap();
        provider.sign_out(&session.token).await.unwrap();

        assert_eq!(
            events.recv().await.unwrap(),
            AuthEvent::SignedIn { uid: session.identity.uid.clone(), display_name: "Ada".into() }
        );
        assert_eq!(
            events.recv().await.unwrap(),
            AuthEvent::SignedOut { uid: session.identity.uid }
        );
    }
}
