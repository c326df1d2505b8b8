//! Google Drive v3 upload client.
//!
//! A client is constructed fresh per operation from a loaded token record and
//! discarded after the single call it authorizes; nothing is shared or cached
//! across requests, so concurrent uploads for different identities cannot
//! interfere.

use crate::error::{Error, Result};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

/// Metadata for a file to create in remote storage.
#[derive(Clone, Debug)]
pub struct UploadMetadata {
    /// File name as it should appear in the user's storage
    pub name: String,

    /// MIME type of the payload
    pub mime_type: String,
}

/// `files.create` response, trimmed to the requested `fields=id`
#[derive(Deserialize, Debug)]
struct CreatedFile {
    id: String,
}

/// A single-use authorized client against the Drive upload endpoint.
pub struct DriveClient {
    http: reqwest::Client,
    access_token: String,
    upload_url: String,
}

impl DriveClient {
    pub fn new(http: reqwest::Client, access_token: String, upload_url: String) -> Self {
        Self {
            http,
            access_token,
            upload_url,
        }
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    /// Create one file in the user's remote storage, returning its id.
    ///
    /// Issues a `multipart/related` upload (JSON metadata part + media part)
    /// with `uploadType=multipart&fields=id`. Any rejection (revoked or
    /// expired credential, quota, network failure) surfaces as
    /// [`Error::Upload`]; the caller decides what to do with the stored
    /// record (nothing, per the state model).
    pub async fn create_file(&self, metadata: &UploadMetadata, bytes: Vec<u8>) -> Result<String> {
        let boundary = format!("drivedrop_{}", Uuid::new_v4().simple());
        let meta_json = serde_json::json!({
            "name": metadata.name,
            "mimeType": metadata.mime_type,
        })
        .to_string();

        let mut body = Vec::with_capacity(bytes.len() + meta_json.len() + 256);
        body.extend_from_slice(
            format!(
                "--{boundary}\r\n\
                 Content-Type: application/json; charset=UTF-8\r\n\r\n\
                 {meta_json}\r\n\
                 --{boundary}\r\n\
                 Content-Type: {}\r\n\r\n",
                metadata.mime_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(&bytes);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        let url = format!("{}?uploadType=multipart&fields=id", self.upload_url);

        debug!(name = %metadata.name, mime_type = %metadata.mime_type, bytes = bytes.len(), "uploading file");

        let response = self
            .http
            .post(&url)
            .header("Authorization", self.auth_header())
            .header(
                "Content-Type",
                format!("multipart/related; boundary={boundary}"),
            )
            .body(body)
            .send()
            .await
            .map_err(|e| Error::Upload(format!("storage request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(Error::Upload(format!(
                "storage API returned {status}: {body}"
            )));
        }

        let created: CreatedFile = response
            .json()
            .await
            .map_err(|e| Error::Upload(format!("invalid storage response: {e}")))?;

        debug!(file_id = %created.id, "file created in remote storage");
        Ok(created.id)
    }
}
