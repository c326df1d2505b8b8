//! Upload endpoint: receives a multipart form and drives one Drive upload.

use super::{ApiError, ApiState};
use crate::drive::UploadMetadata;
use crate::error::Error;
use crate::staging::StagedFile;
use axum::{
    extract::{Multipart, State},
    response::Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Response for POST /upload
#[derive(Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub file_id: String,
}

/// POST /upload: multipart form with an `email` text field and a `file`
/// file field.
///
/// The payload is staged locally, uploaded into the account stored for
/// `email`, and the staged copy is deleted whatever the outcome.
pub(super) async fn upload(
    State(state): State<Arc<ApiState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut email: Option<String> = None;
    let mut file: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("email") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("unreadable email field: {e}")))?;
                email = Some(value);
            }
            Some("file") => {
                let name = field
                    .file_name()
                    .unwrap_or("upload.bin")
                    .to_string();
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("unreadable file field: {e}")))?;
                file = Some((name, mime_type, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let email = email
        .filter(|e| !e.trim().is_empty())
        .ok_or(Error::MissingInput("email"))?;
    let (name, mime_type, bytes) = file.ok_or(Error::MissingInput("file"))?;

    debug!(email, file = %name, bytes = bytes.len(), "upload request received");

    let staged = StagedFile::create(&state.staging_dir, &bytes).await?;
    let file_id = state
        .flow
        .authorize_upload(&email, UploadMetadata { name, mime_type }, staged)
        .await?;

    Ok(Json(UploadResponse {
        message: format!("File uploaded to account: {email}"),
        file_id,
    }))
}
