use axum::{
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    extract::Request,
};
use tower_sessions::Session;
use crate::client::credential;

// Pages reachable without a stored credential
fn is_public(path: &str) -> bool {
    path == "/login"
        || path.starts_with("/login/federated")
        || path == "/register"
        || path.starts_with("/static/")
}

/// Sends visitors without a stored credential to the login page.
pub async fn require_session(
    session: Session,
    req: Request,
    next: Next,
) -> Response {
    if is_public(req.uri().path()) {
        return next.run(req).await;
    }

    match credential::load(&session).await {
        Some(_) => next.run(req).await,
        None => Redirect::to("/login").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::is_public;

    #[test]
    fn only_auth_pages_and_assets_are_public() {
        assert!(is_public("/login"));
        assert!(is_public("/register"));
        assert!(is_public("/static/style.css"));
        assert!(is_public("/login/federated"));
        assert!(is_public("/login/federated/callback"));
        assert!(!is_public("/"));
        assert!(!is_public("/todos"));
        assert!(!is_public("/logout"));
    }
}
