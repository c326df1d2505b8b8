//! Temporary staging for uploaded payloads.
//!
//! Bytes received from the caller are spooled to a file in the staging
//! directory and handed to the upload path as a [`StagedFile`]. The file is
//! deleted after the outbound storage call, success or failure; dropping a
//! `StagedFile` without removing it cleans up as a last resort, so failed
//! requests never accumulate local files.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// A payload spooled to the local filesystem for one upload request.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    removed: bool,
}

impl StagedFile {
    /// Spools `bytes` to a uniquely-named file under `dir`, creating the
    /// directory if absent.
    pub async fn create(dir: &Path, bytes: &[u8]) -> Result<Self> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| Error::Io(format!("creating staging directory {}: {e}", dir.display())))?;

        let path = dir.join(Uuid::new_v4().simple().to_string());
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| Error::Io(format!("writing staged file {}: {e}", path.display())))?;

        debug!(path = %path.display(), bytes = bytes.len(), "staged upload payload");
        Ok(Self {
            path,
            removed: false,
        })
    }

    /// Path of the spooled file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the spooled bytes back.
    pub async fn read(&self) -> Result<Vec<u8>> {
        tokio::fs::read(&self.path)
            .await
            .map_err(|e| Error::Io(format!("reading staged file {}: {e}", self.path.display())))
    }

    /// Deletes the spooled file. Failures are logged, not surfaced: by this
    /// point the upload outcome is already decided.
    pub async fn remove(mut self) {
        if let Err(e) = tokio::fs::remove_file(&self.path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "failed to remove staged file");
            }
        }
        self.removed = true;
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.removed {
            if let Err(e) = std::fs::remove_file(&self.path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %self.path.display(), error = %e, "failed to remove staged file on drop");
                }
            }
        }
    }
}
