use axum::{
    extract::{Form, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use crate::client::{credential, federated, Credential};
use crate::errors::IdentityError;
use crate::models::{self, LoginForm, RegisterForm};
use crate::state::ClientState;
use super::render::{escape_html, flash, Page};

#[derive(Debug, Deserialize, Default)]
pub struct FlashQuery {
    pub error: Option<String>,
    pub message: Option<String>,
}

pub(crate) fn redirect_with_error(path: &str, error: &str) -> Response {
    Redirect::to(&format!("{}?error={}", path, urlencoding::encode(error))).into_response()
}

// What the user gets to see; backend details stay in the log
fn sign_in_message(err: &IdentityError) -> String {
    if err.is_backend() {
        tracing::error!("Identity provider failure: {}", err);
        "Server error, please try again".to_string()
    } else {
        err.to_string()
    }
}

async fn remember(session: &Session, signed_in: &models::Session) -> Response {
    if let Err(e) = credential::store(session, Credential::from(signed_in)).await {
        tracing::error!("Session error: {}", e);
        return redirect_with_error("/login", "Server error");
    }
    tracing::debug!("Stored credential valid until {}", signed_in.expires_at);
    Redirect::to("/todos").into_response()
}

#[derive(Debug, Deserialize)]
pub struct FederatedCallback {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

pub async fn serve_login_page(
    State(state): State<ClientState>,
    Query(query): Query<FlashQuery>,
) -> Response {
    let federated_button = match &state.federated {
        Some(provider) => format!(
            r#"<a class="button federated" href="/login/federated">Sign in with {}</a>"#,
            escape_html(provider.provider_name())
        ),
        None => String::new(),
    };

    Page::new("login.html")
        .html("error", flash("error", query.error.as_deref()))
        .html("federated", federated_button)
        .render()
}

pub async fn serve_register_page(Query(query): Query<FlashQuery>) -> Response {
    Page::new("register.html")
        .html("error", flash("error", query.error.as_deref()))
        .render()
}

pub async fn handle_login(
    State(state): State<ClientState>,
    session: Session,
    Form(login_form): Form<LoginForm>,
) -> Response {
    tracing::info!("Login attempt for {}", login_form.email);

    match state.identity.sign_in(&login_form.email, &login_form.password).await {
        Ok(signed_in) => remember(&session, &signed_in).await,
        Err(e) => {
            tracing::info!("Login failed for {}: {}", login_form.email, e);
            redirect_with_error("/login", &sign_in_message(&e))
        }
    }
}

pub async fn handle_register(
    State(state): State<ClientState>,
    session: Session,
    Form(register_form): Form<RegisterForm>,
) -> Response {
    if register_form.password != register_form.confirm_password {
        return redirect_with_error("/register", "Passwords don't match");
    }

    match state
        .identity
        .register(&register_form.email, &register_form.password, &register_form.display_name)
        .await
    {
        Ok(signed_in) => remember(&session, &signed_in).await,
        Err(e) => {
            tracing::info!("Registration failed for {}: {}", register_form.email, e);
            redirect_with_error("/register", &sign_in_message(&e))
        }
    }
}

pub async fn handle_logout(
    State(state): State<ClientState>,
    session: Session,
) -> Response {
    if let Some(stored) = credential::load(&session).await {
        if let Err(e) = state.identity.sign_out(&stored.token).await {
            tracing::warn!("Sign-out failed: {}", e);
        }
    }
    credential::clear(&session).await;
    Redirect::to("/login").into_response()
}

pub async fn start_federated_login(
    State(state): State<ClientState>,
    session: Session,
) -> Response {
    let Some(provider) = state.federated.as_ref() else {
        return redirect_with_error("/login", "Federated sign-in is not available");
    };

    let (authorize_url, pending) = provider.begin();
    if let Err(e) = federated::store_pending(&session, pending).await {
        tracing::error!("Session error: {}", e);
        return redirect_with_error("/login", "Server error");
    }
    tracing::info!("Sending browser to {} for sign-in", provider.provider_name());
    Redirect::to(&authorize_url).into_response()
}

pub async fn finish_federated_login(
    State(state): State<ClientState>,
    session: Session,
    Query(callback): Query<FederatedCallback>,
) -> Response {
    let Some(provider) = state.federated.as_ref() else {
        return redirect_with_error("/login", "Federated sign-in is not available");
    };
    let failed = format!("Sign-in with {} failed, please try again", provider.provider_name());

    // Taken up front so a callback can only be used once
    let pending = federated::take_pending(&session).await;
    if let Some(error) = callback.error {
        tracing::info!("{} returned an error: {}", provider.provider_name(), error);
        return redirect_with_error("/login", &failed);
    }
    let (Some(pending), Some(code), Some(returned_state)) = (pending, callback.code, callback.state) else {
        tracing::info!("Federated callback without a pending login");
        return redirect_with_error("/login", &failed);
    };

    let profile = match provider.complete(pending, code, &returned_state).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!("Federated sign-in failed: {}", e);
            return redirect_with_error("/login", &failed);
        }
    };

    match state.identity.sign_in_federated(&profile.email, &profile.display_name).await {
        Ok(signed_in) => remember(&session, &signed_in).await,
        Err(e) => {
            tracing::info!("Federated sign-in refused for {}: {}", profile.email, e);
            redirect_with_error("/login", &sign_in_message(&e))
        }
    }
}
