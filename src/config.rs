//! Client configuration, read-only once a [`Client`](crate::api::Client) holds it.

use std::path::PathBuf;

pub const DEFAULT_API_ROOT: &str = "https://api.soundcloud.com";
pub const DEFAULT_CLIENT_ID: &str = "398e83f17ec3c5cf945f04772de9f400";

/// Environment variable overriding the API root (used to point tests at a fake server)
pub const APIROOT_ENV: &str = "NETWORK_SCOPE_APIROOT";
pub const CLIENT_ID_ENV: &str = "SOUNDCLOUD_CLIENT_ID";
pub const ACCESS_TOKEN_ENV: &str = "SOUNDCLOUD_ACCESS_TOKEN";

/// Connection settings shared by every query a client issues
#[derive(Clone, Debug)]
pub struct Config {
    pub apiroot: String,
    /// Send `access_token` as a bearer credential instead of `client_id`
    pub authenticated: bool,
    pub access_token: String,
    pub client_id: String,
    pub user_agent: String,
    pub directory: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            apiroot: DEFAULT_API_ROOT.to_string(),
            authenticated: false,
            access_token: String::new(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            user_agent: format!("soundcloud-rs/{}", env!("CARGO_PKG_VERSION")),
            directory: std::env::current_dir().unwrap_or_default(),
        }
    }
}

impl Config {
    /// Defaults with the process environment's overrides applied.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults with overrides taken from `lookup`.
    ///
    /// A non-empty access token switches the config to authenticated mode.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(apiroot) = lookup(APIROOT_ENV).filter(|v| !v.is_empty()) {
            tracing::debug!(apiroot = %apiroot, "API root overridden from environment");
            config.apiroot = apiroot;
        }
        if let Some(client_id) = lookup(CLIENT_ID_ENV).filter(|v| !v.is_empty()) {
            config.client_id = client_id;
        }
        if let Some(token) = lookup(ACCESS_TOKEN_ENV).filter(|v| !v.is_empty()) {
            config.access_token = token;
            config.authenticated = true;
        }

        config
    }
}
