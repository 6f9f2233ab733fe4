use axum::{
    http::{header, Method},
    middleware::{from_fn, map_response},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    services::ServeDir,
};
use tower_sessions::{cookie::SameSite, MemoryStore, SessionManagerLayer};
use crate::{handlers, middleware};
use crate::state::{AppState, ClientState};

/// The JSON API under `/api/todos`.
pub fn api_router(state: AppState, max_body_size: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let todos = Router::new()
        .route("/", post(handlers::create_todo).get(handlers::list_todos))
        .route(
            "/:id",
            get(handlers::get_todo)
                .put(handlers::update_todo)
                .delete(handlers::delete_todo),
        );

    Router::new()
        .nest("/api/todos", todos)
        // Logging runs before any handler extracts credentials
        .layer(from_fn(middleware::log_request))
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(map_response(middleware::reject_oversized_body))
        .layer(cors)
        .with_state(state)
}

/// The server-rendered web client.
pub fn client_router(state: ClientState) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_name("session");

    Router::new()
        // Auth routes
        .route("/login", get(handlers::serve_login_page).post(handlers::handle_login))
        .route("/login/federated", get(handlers::start_federated_login))
        .route("/login/federated/callback", get(handlers::finish_federated_login))
        .route("/register", get(handlers::serve_register_page).post(handlers::handle_register))
        .route("/logout", get(handlers::handle_logout))

        // Todo pages
        .route("/", get(handlers::home))
        .route("/todos", get(handlers::serve_todo_list))
        .route("/todos/create", get(handlers::serve_create_page).post(handlers::handle_create))
        .route("/todos/:id/edit", get(handlers::serve_edit_page).post(handlers::handle_edit))
        .route("/todos/:id/toggle", post(handlers::handle_toggle))
        .route("/todos/:id/delete", post(handlers::handle_delete))

        // Static files
        .nest_service("/static", ServeDir::new("static"))

        .layer(from_fn(middleware::require_session))
        .layer(session_layer)
        .with_state(state)
}
