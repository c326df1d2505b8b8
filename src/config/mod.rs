//! Service configuration.
//!
//! Loaded from a TOML file; every field has a default so a missing file or an
//! empty table still yields a runnable config. OAuth client credentials are
//! deliberately NOT part of the file; they come from the
//! `DRIVEDROP_CLIENT_ID` / `DRIVEDROP_CLIENT_SECRET` environment variables so
//! secrets never land in checked-in config.

use crate::oauth;
use serde::Deserialize;

/// Complete drivedrop configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DrivedropConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub oauth: OAuthSettings,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address the API listens on
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Origin allowed by the CORS layer (the browser frontend)
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,

    /// Maximum accepted upload body size in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_bind_addr() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            cors_origin: default_cors_origin(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// OAuth flow configuration
///
/// Endpoint URLs default to Google's; overriding them is mainly for tests
/// that point the flow at stub servers.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthSettings {
    /// Redirect URI registered with the provider
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,

    /// Requested OAuth scopes
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,

    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    #[serde(default = "default_token_url")]
    pub token_url: String,

    #[serde(default = "default_userinfo_url")]
    pub userinfo_url: String,

    #[serde(default = "default_upload_url")]
    pub upload_url: String,

    /// Timeout applied to every outbound provider call (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_redirect_uri() -> String {
    "http://localhost:5000/auth/callback".to_string()
}

fn default_scopes() -> Vec<String> {
    vec![
        oauth::SCOPE_DRIVE_FILE.to_string(),
        oauth::SCOPE_USERINFO_EMAIL.to_string(),
    ]
}

fn default_auth_url() -> String {
    oauth::GOOGLE_AUTH_URL.to_string()
}

fn default_token_url() -> String {
    oauth::GOOGLE_TOKEN_URL.to_string()
}

fn default_userinfo_url() -> String {
    oauth::GOOGLE_USERINFO_URL.to_string()
}

fn default_upload_url() -> String {
    oauth::GOOGLE_UPLOAD_URL.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for OAuthSettings {
    fn default() -> Self {
        Self {
            redirect_uri: default_redirect_uri(),
            scopes: default_scopes(),
            auth_url: default_auth_url(),
            token_url: default_token_url(),
            userinfo_url: default_userinfo_url(),
            upload_url: default_upload_url(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl OAuthSettings {
    /// Combine the file-sourced settings with env-sourced client credentials
    /// into a provider config.
    pub fn provider_config(
        &self,
        client_id: String,
        client_secret: String,
    ) -> oauth::OAuthProviderConfig {
        oauth::OAuthProviderConfig {
            client_id,
            client_secret,
            redirect_uri: self.redirect_uri.clone(),
            scopes: self.scopes.clone(),
            auth_url: self.auth_url.clone(),
            token_url: self.token_url.clone(),
            userinfo_url: self.userinfo_url.clone(),
            upload_url: self.upload_url.clone(),
        }
    }
}

/// Local storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one token file per authenticated identity
    #[serde(default = "default_tokens_dir")]
    pub tokens_dir: String,

    /// Directory where upload payloads are staged before the outbound call
    #[serde(default = "default_staging_dir")]
    pub staging_dir: String,
}

fn default_tokens_dir() -> String {
    "tokens".to_string()
}

fn default_staging_dir() -> String {
    "uploads".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            tokens_dir: default_tokens_dir(),
            staging_dir: default_staging_dir(),
        }
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &str) -> Result<DrivedropConfig, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)?;
    let config: DrivedropConfig = toml::from_str(&contents)?;
    Ok(config)
}

/// OAuth client credentials from the environment, `None` when either is unset.
pub fn client_credentials_from_env() -> Option<(String, String)> {
    let client_id = std::env::var("DRIVEDROP_CLIENT_ID").ok()?;
    let client_secret = std::env::var("DRIVEDROP_CLIENT_SECRET").ok()?;
    Some((client_id, client_secret))
}
