use redis::{Client, AsyncCommands};
use std::sync::Arc;
use async_trait::async_trait;
use bcrypt::hash;
use tokio::sync::broadcast;
use crate::errors::{IdentityError, IdentityResult};
use crate::models::{Account, AuthEvent, Identity, Session};
use super::{
    check_password, federated_account, issue_session, is_well_formed_token, normalize_email,
    validate_registration, AuthEvents, IdentityProvider,
};

fn account_key(email: &str) -> String {
    format!("account:{}", email)
}

fn token_key(token: &str) -> String {
    format!("token:{}", token)
}

/// Accounts and tokens kept in Redis; token expiry is Redis' own TTL.
pub struct RedisIdentityProvider {
    client: Arc<Client>,
    token_ttl_secs: u64,
    bcrypt_cost: u32,
    events: AuthEvents,
}

impl RedisIdentityProvider {
    pub fn new(client: Arc<Client>, token_ttl_secs: u64, bcrypt_cost: u32) -> Self {
        Self {
            client,
            token_ttl_secs,
            bcrypt_cost,
            events: AuthEvents::new(),
        }
    }

    async fn store_session(&self, identity: Identity) -> IdentityResult<Session> {
        let mut conn = self.client.get_async_connection().await?;
        let session = issue_session(identity, self.token_ttl_secs);

        redis::cmd("SET")
            .arg(token_key(&session.token))
            .arg(serde_json::to_string(&session.identity)?)
            .arg("EX")
            .arg(self.token_ttl_secs.max(1))
            .query_async::<_, ()>(&mut conn)
            .await?;

        self.events.publish(AuthEvent::SignedIn {
            uid: session.identity.uid.clone(),
            display_name: session.identity.display_name.clone(),
        });
        Ok(session)
    }
}

#[async_trait]
impl IdentityProvider for RedisIdentityProvider {
    async fn register(&self, email: &str, password: &str, display_name: &str) -> IdentityResult<Session> {
        let email = normalize_email(email);
        validate_registration(&email, password)?;

        let account = Account {
            uid: uuid::Uuid::new_v4().to_string(),
            display_name: display_name.trim().to_string(),
            password_hash: hash(password.as_bytes(), self.bcrypt_cost)?,
            email,
        };

        let mut conn = self.client.get_async_connection().await?;
        let created: bool = conn
            .set_nx(account_key(&account.email), serde_json::to_string(&account)?)
            .await?;
        if !created {
            return Err(IdentityError::EmailTaken(account.email));
        }

        tracing::info!("Registered account {}", account.uid);
        self.store_session(Identity::from(&account)).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> IdentityResult<Session> {
        let email = normalize_email(email);
        let mut conn = self.client.get_async_connection().await?;
        let account_data: Option<String> = conn.get(account_key(&email)).await?;
        let account: Account = match account_data {
            Some(data) => serde_json::from_str(&data)?,
            None => return Err(IdentityError::UnknownAccount(email)),
        };

        check_password(&account, password)?;
        self.store_session(Identity::from(&account)).await
    }

    async fn sign_in_federated(&self, email: &str, display_name: &str) -> IdentityResult<Session> {
        let candidate = federated_account(email, display_name)?;
        let key = account_key(&candidate.email);

        let mut conn = self.client.get_async_connection().await?;
        let created: bool = conn.set_nx(&key, serde_json::to_string(&candidate)?).await?;
        let account = if created {
            tracing::info!("Created federated account {}", candidate.uid);
            candidate
        } else {
            let account_data: Option<String> = conn.get(&key).await?;
            match account_data {
                Some(data) => serde_json::from_str(&data)?,
                None => return Err(IdentityError::UnknownAccount(candidate.email)),
            }
        };
        self.store_session(Identity::from(&account)).await
    }

    async fn verify(&self, token: &str) -> IdentityResult<Identity> {
        if !is_well_formed_token(token) {
            return Err(IdentityError::InvalidCredential);
        }

        let mut conn = self.client.get_async_connection().await?;
        let identity_data: Option<String> = conn.get(token_key(token)).await?;
        match identity_data {
            Some(data) => Ok(serde_json::from_str(&data)?),
            None => Err(IdentityError::InvalidCredential),
        }
    }

    async fn sign_out(&self, token: &str) -> IdentityResult<()> {
        if !is_well_formed_token(token) {
            return Ok(());
        }

        let mut conn = self.client.get_async_connection().await?;
        let key = token_key(token);
        let identity_data: Option<String> = conn.get(&key).await?;
        let _: () = conn.del(&key).await?;

        if let Some(data) = identity_data {
            let identity: Identity = serde_json::from_str(&data)?;
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
    use std::time::Duration;
    use crate::services::test_redis_client;

    fn unique_email() -> String {
        format!("test-{}@example.com", uuid::Uuid::new_v4())
    }

    #[tokio::test]
    async fn register_claims_the_email_once() {
        let Some(client) = test_redis_client() else { return };
        let provider = RedisIdentityProvider::new(client, 3600, 4);
        let email = unique_email();

        let session = provider.register(&email, "secret", "Ada").await.unwrap();
        assert_eq!(provider.verify(&session.token).await.unwrap(), session.identity);

        let err = provider.register(&email.to_uppercase(), "other", "Imposter").await.unwrap_err();
        assert!(matches!(err, IdentityError::EmailTaken(_)));

        let err = provider.sign_in(&email, "wrong").await.unwrap_err();
        assert!(matches!(err, IdentityError::WrongPassword));
        let signed_in = provider.sign_in(&email, "secret").await.unwrap();
        assert_eq!(signed_in.identity.uid, session.identity.uid);
    }

    #[tokio::test]
    async fn tokens_expire_with_their_redis_ttl() {
        let Some(client) = test_redis_client() else { return };
        let provider = RedisIdentityProvider::new(client.clone(), 1, 4);
        let session = provider.register(&unique_email(), "secret", "Ada").await.unwrap();

        let mut conn = client.get_async_connection().await.unwrap();
        let ttl: i64 = conn.ttl(token_key(&session.token)).await.unwrap();
        assert!((0..=1).contains(&ttl));
        assert!(provider.verify(&session.token).await.is_ok());

        tokio::time::sleep(Duration::from_millis(2100)).await;
        assert!(matches!(
            provider.verify(&session.token).await,
            Err(IdentityError::InvalidCredential)
        ));
    }

    #[tokio::test]
    async fn sign_out_revokes_and_publishes() {
        let Some(client) = test_redis_client() else { return };
        let provider = RedisIdentityProvider::new(client, 3600, 4);
        let mut events = provider.subscribe();

        let session = provider.register(&unique_email(), "secret", "Ada").await.unwrap();
        provider.sign_out(&session.token).await.unwrap();
        provider.sign_out(&session.token).await.unwrap();
        assert!(matches!(
            provider.verify(&session.token).await,
            Err(IdentityError::InvalidCredential)
        ));

        assert!(matches!(events.recv().await.unwrap(), AuthEvent::SignedIn { .. }));
        assert_eq!(
            events.recv().await.unwrap(),
            AuthEvent::SignedOut { uid: session.identity.uid }
        );
    }

    #[tokio::test]
    async fn federated_sign_in_reuses_the_stored_account() {
        let Some(client) = test_redis_client() else { return };
        let provider = RedisIdentityProvider::new(client, 3600, 4);
        let email = unique_email();

        let first = provider.sign_in_federated(&email, "Grace").await.unwrap();
        let again = provider.sign_in_federated(&email, "Other").await.unwrap();
        assert_eq!(again.identity, first.identity);

        let err = provider.sign_in(&email, "").await.unwrap_err();
        assert!(matches!(err, IdentityError::WrongPassword));
        let err = provider.register(&email, "secret", "Grace").await.unwrap_err();
        assert!(matches!(err, IdentityError::EmailTaken(_)));
    }
}
