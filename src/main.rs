mod client;
mod config;
mod errors;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;
mod state;

use std::sync::Arc;
use anyhow::Context;
use tokio::net::TcpListener;
use crate::{
    client::{ApiClient, AuthStateListener, FederatedLogin},
    config::{Config, StoreBackend},
    services::{
        IdentityProvider, MemoryIdentityProvider, MemoryTaskStore, RedisIdentityProvider,
        RedisTaskStore, TaskService, TaskStore,
    },
    state::{AppState, ClientState},
};

type Backends = (Arc<dyn TaskStore>, Arc<dyn IdentityProvider>);

fn connect_backends(config: &Config) -> anyhow::Result<Backends> {
    let auth = &config.auth;
    match config.store.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; todos and accounts are lost on restart");
            Ok((
                Arc::new(MemoryTaskStore::new()),
                Arc::new(MemoryIdentityProvider::new(auth.token_ttl_secs, auth.bcrypt_cost)),
            ))
        }
        StoreBackend::Redis => {
            let url = config
                .store
                .connection_url()
                .context("Sentinel URL not configured")?;
            let redis_client = Arc::new(
                redis::Client::open(url).context("Failed to open Redis client")?,
            );
            Ok((
                Arc::new(RedisTaskStore::new(redis_client.clone())),
                Arc::new(RedisIdentityProvider::new(
                    redis_client,
                    auth.token_ttl_secs,
                    auth.bcrypt_cost,
                )),
            ))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::load().context("Failed to load configuration")?;
    let (store, identity) = connect_backends(&config)?;

    let api_state = AppState {
        tasks: TaskService::new(store),
        identity: identity.clone(),
    };
    let federated = match &config.auth.oauth {
        Some(oauth) => {
            let login = FederatedLogin::new(oauth).context("Invalid OAuth configuration")?;
            tracing::info!("Federated sign-in enabled via {}", oauth.provider_name);
            Some(Arc::new(login))
        }
        None => None,
    };
    let client_state = ClientState {
        api: ApiClient::new(&config.client.api_base_url),
        identity: identity.clone(),
        federated,
    };

    // Held until shutdown; dropping it unsubscribes
    let auth_listener = AuthStateListener::spawn(identity.as_ref());

    let api = routes::api_router(api_state, config.server.max_body_size);
    let web = routes::client_router(client_state);

    let api_listener = TcpListener::bind(format!("{}:{}", config.server.host, config.server.port))
        .await
        .context("Failed to bind API server")?;
    let web_listener = TcpListener::bind(format!("{}:{}", config.client.host, config.client.port))
        .await
        .context("Failed to bind web client")?;

    tracing::info!("API listening on {}", api_listener.local_addr()?);
    tracing::info!("Web client listening on {}", web_listener.local_addr()?);

    tokio::try_join!(
        async {
            axum::serve(api_listener, api.into_make_service())
                .with_graceful_shutdown(shutdown_signal())
                .await
                .context("API server failed")
        },
        async {
            axum::serve(web_listener, web.into_make_service())
                .with_graceful_shutdown(shutdown_signal())
                .await
                .context("Web client failed")
        },
    )?;

    drop(auth_listener);
    tracing::info!("Shut down");
    Ok(())
}
