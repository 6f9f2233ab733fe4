//! Web client side: the HTTP client for the todo API, the credential kept in
//! the browser session, federated sign-in, and the auth-state subscription.
mod api;
pub mod credential;
mod events;
pub mod federated;

pub use api::ApiClient;
pub use credential::Credential;
pub use events::AuthStateListener;
pub use federated::FederatedLogin;
