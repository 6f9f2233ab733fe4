use std::sync::Arc;
use crate::client::{ApiClient, FederatedLogin};
use crate::services::{IdentityProvider, TaskService};

/// State shared by the todo API handlers.
#[derive(Clone)]
pub struct AppState {
    pub tasks: TaskService,
    pub identity: Arc<dyn IdentityProvider>,
}

/// State shared by the web client pages. The client reaches tasks only
/// through the HTTP API.
#[derive(Clone)]
pub struct ClientState {
    pub api: ApiClient,
    pub identity: Arc<dyn IdentityProvider>,
    /// Present when `[auth.oauth]` is configured.
    pub federated: Option<Arc<FederatedLogin>>,
}
