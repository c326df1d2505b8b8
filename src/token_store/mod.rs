//! Filesystem-backed credential storage for OAuth tokens.
//!
//! Maps a user identity (email) to a persisted token record, one JSON file per
//! identity under a dedicated directory. All writes go through a temp-file +
//! rename so a concurrent reader sees either the old or the new record in
//! full, never a torn file. Operations on different identities touch different
//! files and need no coordination.
//!
//! Records are stored verbatim as JSON and never interpreted beyond
//! serialization; expiry and refresh are the concern of whoever uses the
//! record, not the store.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

/// An opaque OAuth credential bundle issued by the provider.
///
/// `expires_at` is absolute (computed from the token endpoint's `expires_in`
/// delta at exchange time). The store round-trips these fields without
/// looking at them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// OAuth access token (Bearer token for API calls)
    pub access_token: String,

    /// OAuth refresh token, when the provider granted offline access
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// When the access token expires (UTC)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Space-separated scopes the token was granted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Token type reported by the provider (normally "Bearer")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

/// Normalize an identity into a filesystem-safe key.
///
/// Every non-alphanumeric character becomes `_`. Deterministic, so repeated
/// calls with the same identity always target the same record file. Lossy:
/// identities that differ only in punctuation (`a.b@x.com` / `a_b@x.com`)
/// collide on the same key.
pub fn normalize_identity(identity: &str) -> String {
    identity
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Identity-keyed token record storage on the local filesystem.
pub struct TokenStore {
    dir: PathBuf,
}

impl TokenStore {
    /// Opens a store rooted at `dir`, creating the directory if absent.
    pub async fn open<P: Into<PathBuf>>(dir: P) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| Error::Io(format!("creating token directory {}: {e}", dir.display())))?;
        info!(dir = %dir.display(), "token store ready");
        Ok(Self { dir })
    }

    fn record_path(&self, identity: &str) -> PathBuf {
        self.dir.join(format!("{}.json", normalize_identity(identity)))
    }

    /// Whether a record is stored for the identity.
    ///
    /// Presence only; says nothing about whether the token is still valid.
    /// Never fails for a missing identity.
    pub fn exists(&self, identity: &str) -> bool {
        self.record_path(identity).is_file()
    }

    /// Stores a record for the identity, replacing any existing one.
    ///
    /// Writes to a uniquely-named temp file in the same directory, sets 0600
    /// permissions (unix), then renames over the target, so the swap is
    /// atomic. Two concurrent saves for one identity are unordered; the last
    /// rename wins with its record intact.
    pub async fn save(&self, identity: &str, record: &TokenRecord) -> Result<()> {
        let path = self.record_path(identity);
        let json = serde_json::to_string_pretty(record)
            .map_err(|e| Error::Io(format!("serializing token record: {e}")))?;

        let tmp_path = self.dir.join(format!(
            ".{}.tmp.{}",
            normalize_identity(identity),
            Uuid::new_v4().simple()
        ));

        tokio::fs::write(&tmp_path, json.as_bytes())
            .await
            .map_err(|e| Error::Io(format!("writing temp token file: {e}")))?;

        // Token files are secrets: owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            tokio::fs::set_permissions(&tmp_path, perms)
                .await
                .map_err(|e| Error::Io(format!("setting token file permissions: {e}")))?;
        }

        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| Error::Io(format!("renaming temp token file: {e}")))?;

        debug!(identity, path = %path.display(), "saved token record");
        Ok(())
    }

    /// Loads the record stored for the identity.
    pub async fn load(&self, identity: &str) -> Result<TokenRecord> {
        let path = self.record_path(identity);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotFound(identity.to_string()));
            }
            Err(e) => {
                return Err(Error::Io(format!(
                    "reading token record {}: {e}",
                    path.display()
                )));
            }
        };

        serde_json::from_str(&contents).map_err(|e| Error::CorruptRecord {
            identity: identity.to_string(),
            reason: e.to_string(),
        })
    }

    /// Removes the record for the identity (logout).
    ///
    /// Returns `false` when no record existed. This is the only way an
    /// identity transitions back to unauthenticated.
    pub async fn remove(&self, identity: &str) -> Result<bool> {
        let path = self.record_path(identity);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(identity, "removed token record");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::Io(format!(
                "removing token record {}: {e}",
                path.display()
            ))),
        }
    }

    /// Directory holding the record files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
