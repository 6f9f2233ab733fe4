use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use crate::errors::AppError;
use crate::models::Identity;
use crate::state::AppState;

/// The verified caller of an API request.
///
/// Extraction fails with `AppError::Unauthenticated` when no bearer token is
/// present and `AppError::InvalidCredential` when the identity provider
/// rejects it, so handlers taking an `AuthUser` never run for either case.
pub struct AuthUser(pub Identity);

/// Second space-separated part of the `Authorization` header. The scheme
/// word is not checked, so `Basic abc` yields `abc` and fails verification
/// (403) rather than counting as a missing token (401).
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    value.split(' ').nth(1).filter(|token| !token.is_empty())
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or_else(|| {
            tracing::debug!("Rejecting {} {}: no bearer token", parts.method, parts.uri.path());
            AppError::Unauthenticated
        })?;

        let state = AppState::from_ref(state);
        match state.identity.verify(token).await {
            Ok(identity) => Ok(AuthUser(identity)),
            Err(e) if e.is_backend() => {
                tracing::error!("Identity provider failure: {}", e);
                Err(AppError::Internal("Failed to verify token".into()))
            }
            Err(e) => {
                tracing::warn!("Token verification failed: {}", e);
                Err(AppError::InvalidCredential)
            }
        }
    }
}
