use oauth2::{
    basic::BasicClient, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken,
    EndpointNotSet, EndpointSet, PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope,
    TokenResponse, TokenUrl,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use crate::config::OAuthConfig;
use crate::errors::{FederatedError, FederatedResult};

const PENDING_KEY: &str = "federated_login";

type OAuthClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Kept in the session between the redirect to the provider and its callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingLogin {
    csrf_state: String,
    pkce_verifier: String,
}

/// Who the provider says signed in.
#[derive(Debug, Clone, PartialEq)]
pub struct FederatedProfile {
    pub email: String,
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    email: Option<String>,
    name: Option<String>,
}

/// Authorization-code login (with PKCE) against one configured provider.
pub struct FederatedLogin {
    provider_name: String,
    oauth: OAuthClient,
    http: reqwest::Client,
    userinfo_url: String,
    scopes: Vec<String>,
}

impl FederatedLogin {
    pub fn new(config: &OAuthConfig) -> FederatedResult<Self> {
        let oauth = BasicClient::new(ClientId::new(config.client_id.clone()))
            .set_client_secret(ClientSecret::new(config.client_secret.clone()))
            .set_auth_uri(AuthUrl::new(config.auth_url.clone())?)
            .set_token_uri(TokenUrl::new(config.token_url.clone())?)
            .set_redirect_uri(RedirectUrl::new(config.redirect_url.clone())?);

        // The token endpoint must answer directly; a redirect could leak the code
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            provider_name: config.provider_name.clone(),
            oauth,
            http,
            userinfo_url: config.userinfo_url.clone(),
            scopes: config.scopes.clone(),
        })
    }

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    /// Where to send the browser, plus what the callback has to match.
    pub fn begin(&self) -> (String, PendingLogin) {
        let (challenge, verifier) = PkceCodeChallenge::new_random_sha256();
        let (url, csrf_state) = self
            .oauth
            .authorize_url(CsrfToken::new_random)
            .add_scopes(self.scopes.iter().cloned().map(Scope::new))
            .set_pkce_challenge(challenge)
            .url();

        let pending = PendingLogin {
            csrf_state: csrf_state.secret().clone(),
            pkce_verifier: verifier.secret().clone(),
        };
        (url.to_string(), pending)
    }

    /// Checks the returned state, redeems the code and reads the profile.
    pub async fn complete(
        &self,
        pending: PendingLogin,
        code: String,
        returned_state: &str,
    ) -> FederatedResult<FederatedProfile> {
        if pending.csrf_state != returned_state {
            return Err(FederatedError::StateMismatch);
        }

        let token = self
            .oauth
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(PkceCodeVerifier::new(pending.pkce_verifier))
            .request_async(&self.http)
            .await
            .map_err(|e| FederatedError::TokenExchange(e.to_string()))?;

        let info: UserInfo = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(token.access_token().secret())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let email = info
            .email
            .filter(|email| !email.trim().is_empty())
            .ok_or(FederatedError::MissingEmail)?;
        Ok(FederatedProfile {
            display_name: info.name.unwrap_or_default(),
            email,
        })
    }
}

pub async fn store_pending(session: &Session, pending: PendingLogin) -> Result<(), tower_sessions::session::Error> {
    session.insert(PENDING_KEY, pending).await
}

/// Removes the pending login; each one can be completed at most once.
pub async fn take_pending(session: &Session) -> Option<PendingLogin> {
    match session.remove::<PendingLogin>(PENDING_KEY).await {
        Ok(pending) => pending,
        Err(e) => {
            tracing::warn!("Session read error: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> OAuthConfig {
        OAuthConfig {
            provider_name: "Example".into(),
            client_id: "todo-client".into(),
            client_secret: "shh".into(),
            auth_url: "https://id.example.com/authorize".into(),
            token_url: "https://id.example.com/token".into(),
            userinfo_url: "https://id.example.com/userinfo".into(),
            redirect_url: "http://localhost:3000/login/federated/callback".into(),
            scopes: vec!["openid".into(), "email".into()],
        }
    }

    #[test]
    fn authorization_url_carries_client_state_and_pkce() {
        let login = FederatedLogin::new(&config()).unwrap();
        let (url, pending) = login.begin();
        let url = reqwest::Url::parse(&url).unwrap();
        let query: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();

        assert_eq!(url.host_str(), Some("id.example.com"));
        assert_eq!(query["client_id"], "todo-client");
        assert_eq!(query["response_type"], "code");
        assert_eq!(query["scope"], "openid email");
        assert_eq!(query["state"], pending.csrf_state);
        assert_eq!(query["code_challenge_method"], "S256");
        assert!(!query["code_challenge"].is_empty());
    }

    #[tokio::test]
    async fn mismatched_state_is_refused_before_any_exchange() {
        let login = FederatedLogin::new(&config()).unwrap();
        let (_, pending) = login.begin();

        let err = login.complete(pending, "code".into(), "forged").await.unwrap_err();
        assert!(matches!(err, FederatedError::StateMismatch));
    }

    #[test]
    fn bad_endpoint_urls_are_configuration_errors() {
        let mut broken = config();
        broken.token_url = "not a url".into();
        assert!(matches!(FederatedLogin::new(&broken), Err(FederatedError::Url(_))));
    }
}
