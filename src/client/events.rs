use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use crate::models::AuthEvent;
use crate::services::IdentityProvider;

/// Subscription to the identity provider's auth-state changes, held for the
/// lifetime of the web client. Dropping it unsubscribes.
pub struct AuthStateListener {
    handle: JoinHandle<()>,
}

impl AuthStateListener {
    pub fn spawn(identity: &dyn IdentityProvider) -> Self {
        let mut events = identity.subscribe();
        let handle = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(AuthEvent::SignedIn { uid, display_name }) => {
                        tracing::info!("User {} ({}) signed in", uid, display_name);
                    }
                    Ok(AuthEvent::SignedOut { uid }) => {
                        tracing::info!("User {} signed out", uid);
                    }
                    Err(RecvError::Lagged(missed)) => {
                        tracing::warn!("Auth listener missed {} events", missed);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            tracing::debug!("Auth listener stopped");
        });
        Self { handle }
    }

    #[cfg(test)]
    fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for AuthStateListener {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
