//! Error types shared by the token store, auth flow, and API layers.

/// Errors from credential storage and OAuth flow operations.
///
/// Every failure a request can hit maps to exactly one variant; the API layer
/// translates variants into HTTP status codes. No operation retries on error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required input (authorization code, identity, file) was absent or empty.
    #[error("missing {0}")]
    MissingInput(&'static str),

    /// No token record is stored for the identity.
    #[error("no stored credential for '{0}'")]
    NotFound(String),

    /// A record file exists but its content is not a valid token record.
    #[error("stored credential for '{identity}' is unreadable: {reason}")]
    CorruptRecord { identity: String, reason: String },

    /// The provider's token endpoint rejected the code exchange.
    #[error("token exchange failed: {0}")]
    Exchange(String),

    /// The provider's identity endpoint failed or returned no usable email.
    #[error("identity lookup failed: {0}")]
    IdentityLookup(String),

    /// An authenticated operation was attempted with no stored credential.
    #[error("not authenticated: no stored credential for '{0}'")]
    Unauthenticated(String),

    /// The remote storage API rejected the upload (revoked/expired token,
    /// quota, network failure).
    #[error("upload failed: {0}")]
    Upload(String),

    /// Local filesystem failure while persisting or reading state.
    #[error("I/O error: {0}")]
    Io(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
