//! Google OAuth provider configuration.

/// Google's OAuth 2.0 authorization endpoint
pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Google's OAuth 2.0 token exchange endpoint
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Google's userinfo endpoint (email discovery)
pub const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Google Drive v3 upload endpoint
pub const GOOGLE_UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";

/// Drive access limited to files this app creates
pub const SCOPE_DRIVE_FILE: &str = "https://www.googleapis.com/auth/drive.file";

/// Read access to the account's email address
pub const SCOPE_USERINFO_EMAIL: &str = "https://www.googleapis.com/auth/userinfo.email";

/// OAuth provider configuration.
///
/// Endpoint URLs default to Google's but stay configurable so tests can point
/// the flow at stub servers.
#[derive(Clone, Debug)]
pub struct OAuthProviderConfig {
    /// Client ID (from environment variable)
    pub client_id: String,

    /// Client secret (from environment variable)
    pub client_secret: String,

    /// Redirect URI registered with the provider
    pub redirect_uri: String,

    /// Required OAuth scopes
    pub scopes: Vec<String>,

    /// Authorization endpoint URL
    pub auth_url: String,

    /// Token exchange endpoint URL
    pub token_url: String,

    /// Identity (userinfo) endpoint URL
    pub userinfo_url: String,

    /// Storage upload endpoint URL
    pub upload_url: String,
}

impl OAuthProviderConfig {
    /// Configuration against Google's production endpoints with the default
    /// scope set (file-scoped Drive access + email read).
    pub fn google(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_uri,
            scopes: vec![
                SCOPE_DRIVE_FILE.to_string(),
                SCOPE_USERINFO_EMAIL.to_string(),
            ],
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
            upload_url: GOOGLE_UPLOAD_URL.to_string(),
        }
    }

    /// Build the authorization URL the user visits to grant consent.
    ///
    /// Pure construction, no network call. Requests offline access (so the
    /// provider issues a refresh token) and forces the consent screen on
    /// every authorization rather than silently re-approving.
    pub fn build_auth_url(&self) -> String {
        let scopes = self.scopes.join(" ");
        format!(
            "{}?client_id={}&redirect_uri={}&scope={}&response_type=code&access_type=offline&prompt=consent",
            self.auth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(&scopes),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> OAuthProviderConfig {
        OAuthProviderConfig::google(
            "test_client_id".to_string(),
            "test_secret".to_string(),
            "http://localhost:5000/auth/callback".to_string(),
        )
    }

    #[test]
    fn test_build_auth_url() {
        let url = test_config().build_auth_url();

        assert!(url.starts_with(GOOGLE_AUTH_URL));
        assert!(url.contains("client_id=test_client_id"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A5000%2Fauth%2Fcallback"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));

        // Both scopes, space-joined then URL encoded
        assert!(url.contains(&format!(
            "scope={}",
            urlencoding::encode(&format!("{SCOPE_DRIVE_FILE} {SCOPE_USERINFO_EMAIL}"))
        )));
    }

    #[test]
    fn test_build_auth_url_is_pure() {
        let config = test_config();
        assert_eq!(config.build_auth_url(), config.build_auth_url());
    }
}
