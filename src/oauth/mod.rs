//! OAuth 2.0 authorization flow and per-user token lifecycle.
//!
//! Implements the authorization code flow against Google:
//! 1. Caller requests the authorization URL
//! 2. User grants consent on the provider's site
//! 3. Provider redirects back with a code
//! 4. Code is exchanged for a token record, the user's email is discovered,
//!    and the record is stored keyed by that email
//! 5. Later requests supply the email; the stored record authorizes a single
//!    Drive upload per request
//!
//! There is no automatic token refresh and no retry: a stale or revoked
//! record surfaces as an upload failure, and the caller re-drives the
//! authorization flow.

mod exchange;
mod provider;

pub use provider::{
    OAuthProviderConfig, GOOGLE_AUTH_URL, GOOGLE_TOKEN_URL, GOOGLE_UPLOAD_URL,
    GOOGLE_USERINFO_URL, SCOPE_DRIVE_FILE, SCOPE_USERINFO_EMAIL,
};

use crate::drive::{DriveClient, UploadMetadata};
use crate::error::{Error, Result};
use crate::staging::StagedFile;
use crate::token_store::{TokenRecord, TokenStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Coordinates the three-legged OAuth exchange, identity discovery, and
/// authorized uploads.
///
/// Holds no per-user state: every operation keys off the supplied identity
/// and constructs its authorized client from a freshly loaded record, so
/// concurrent requests for distinct identities proceed fully in parallel.
pub struct AuthFlow {
    config: OAuthProviderConfig,
    http: reqwest::Client,
    store: Arc<TokenStore>,
}

impl AuthFlow {
    /// Creates a coordinator over the given provider config and store.
    ///
    /// `request_timeout` bounds every outbound provider call; a hung token
    /// exchange or upload surfaces as [`Error::Exchange`] / [`Error::Upload`]
    /// instead of stalling the request forever.
    pub fn new(
        config: OAuthProviderConfig,
        store: Arc<TokenStore>,
        request_timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| Error::Io(format!("building HTTP client: {e}")))?;

        Ok(Self {
            config,
            http,
            store,
        })
    }

    /// The authorization URL the user visits to grant consent.
    ///
    /// Pure construction; no network call, no side effects.
    pub fn authorization_url(&self) -> String {
        self.config.build_auth_url()
    }

    /// Completes the authorization: exchanges the code, discovers the user's
    /// email, and stores the token record keyed by it.
    ///
    /// Returns the `(email, record)` pair; reporting success to the end user
    /// is the caller's job. An empty code fails with [`Error::MissingInput`]
    /// before any network or store call.
    pub async fn complete_authorization(&self, code: &str) -> Result<(String, TokenRecord)> {
        if code.trim().is_empty() {
            return Err(Error::MissingInput("authorization code"));
        }

        let record = exchange::exchange_code_for_token(&self.http, &self.config, code).await?;
        let email = exchange::fetch_user_email(&self.http, &self.config, &record.access_token).await?;

        self.store.save(&email, &record).await?;

        info!(
            email,
            has_refresh_token = record.refresh_token.is_some(),
            "authorization complete"
        );

        Ok((email, record))
    }

    /// Uploads one file to the identity's remote storage.
    ///
    /// Loads the stored record (a missing record fails with
    /// [`Error::Unauthenticated`] before any network call), builds a
    /// single-use authorized client from it, and issues one create-file call.
    /// The staged payload is deleted before this returns, on every path. A
    /// rejected call leaves the stored record untouched: staleness is not
    /// tracked, and the caller re-authenticates when it sees the failure.
    pub async fn authorize_upload(
        &self,
        identity: &str,
        metadata: UploadMetadata,
        staged: StagedFile,
    ) -> Result<String> {
        if identity.trim().is_empty() {
            staged.remove().await;
            return Err(Error::MissingInput("identity"));
        }

        let record = match self.store.load(identity).await {
            Ok(record) => record,
            Err(Error::NotFound(id)) => {
                staged.remove().await;
                return Err(Error::Unauthenticated(id));
            }
            Err(e) => {
                staged.remove().await;
                return Err(e);
            }
        };

        debug!(identity, file = %metadata.name, "authorizing upload");

        let result = match staged.read().await {
            Ok(bytes) => {
                let drive = DriveClient::new(
                    self.http.clone(),
                    record.access_token.clone(),
                    self.config.upload_url.clone(),
                );
                drive.create_file(&metadata, bytes).await
            }
            Err(e) => Err(e),
        };
        staged.remove().await;

        match &result {
            Ok(file_id) => info!(identity, file_id, "upload complete"),
            Err(e) => warn!(identity, error = %e, "upload failed"),
        }

        result
    }

    /// Whether a token record is stored for the identity.
    ///
    /// Presence check only; the record is not validated against the
    /// provider, so this can return `true` for a revoked or expired token.
    /// `authorize_upload` is the only operation that surfaces that
    /// staleness, as [`Error::Upload`].
    pub fn is_authenticated(&self, identity: &str) -> bool {
        self.store.exists(identity)
    }

    /// Deletes the identity's stored record (logout). Returns `false` when
    /// nothing was stored.
    pub async fn revoke(&self, identity: &str) -> Result<bool> {
        self.store.remove(identity).await
    }
}
