use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub client: ClientConfig,
    pub store: StoreConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_size: usize,  // in bytes
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub api_base_url: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Redis,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub redis_url: String,
    pub sentinel_enabled: bool,
    pub sentinel_url: Option<String>,
}

impl StoreConfig {
    /// URL the Redis client should open, honouring the sentinel switch.
    pub fn connection_url(&self) -> Option<&str> {
        if self.sentinel_enabled {
            self.sentinel_url.as_deref()
        } else {
            Some(self.redis_url.as_str())
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub token_ttl_secs: u64,
    pub bcrypt_cost: u32,
    /// Federated sign-in is offered only when this section is present.
    pub oauth: Option<OAuthConfig>,
}

/// An OAuth 2.0 authorization-code provider with an OpenID-style userinfo
/// endpoint returning `email` and `name`.
#[derive(Debug, Deserialize, Clone)]
pub struct OAuthConfig {
    pub provider_name: String,
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub redirect_url: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
}

fn default_scopes() -> Vec<String> {
    vec!["openid".to_string(), "email".to_string(), "profile".to_string()]
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
