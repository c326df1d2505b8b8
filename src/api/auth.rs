//! Authentication endpoints: authorization URL, callback, status, logout.

use super::{ApiError, ApiState};
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Response for GET /auth/url
#[derive(Serialize)]
pub struct AuthUrlResponse {
    pub url: String,
}

/// OAuth callback query parameters
///
/// The provider sends either `code` on success or `error` (with an optional
/// description) when the user denies consent.
#[derive(Deserialize)]
pub struct OAuthCallback {
    code: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Response for GET /auth/callback
#[derive(Serialize)]
pub struct AuthCallbackResponse {
    pub message: String,
    pub email: String,
}

/// Response for GET /check-auth/:email
#[derive(Serialize)]
pub struct CheckAuthResponse {
    pub authenticated: bool,
}

/// Response for DELETE /auth/:email
#[derive(Serialize)]
pub struct LogoutResponse {
    pub removed: bool,
}

/// GET /auth/url: the provider consent URL for the caller to open.
pub(super) async fn auth_url(State(state): State<Arc<ApiState>>) -> Json<AuthUrlResponse> {
    Json(AuthUrlResponse {
        url: state.flow.authorization_url(),
    })
}

/// GET /auth/callback: completes the authorization.
///
/// Exchanges the code, discovers the user's email, and stores the token
/// record keyed by it.
pub(super) async fn auth_callback(
    State(state): State<Arc<ApiState>>,
    Query(callback): Query<OAuthCallback>,
) -> Result<Json<AuthCallbackResponse>, ApiError> {
    if let Some(error) = callback.error {
        let description = callback
            .error_description
            .unwrap_or_else(|| "unknown error".to_string());
        warn!(error = %error, description = %description, "provider reported authorization failure");
        return Err(ApiError::BadRequest(format!(
            "authorization failed: {error} - {description}"
        )));
    }

    debug!("authorization callback received");

    let code = callback.code.unwrap_or_default();
    let (email, _record) = state.flow.complete_authorization(&code).await?;

    Ok(Json(AuthCallbackResponse {
        message: "Authentication successful!".to_string(),
        email,
    }))
}

/// GET /check-auth/:email: whether a credential is stored.
///
/// Presence only; a stored-but-revoked token still reports `true`.
pub(super) async fn check_auth(
    State(state): State<Arc<ApiState>>,
    Path(email): Path<String>,
) -> Json<CheckAuthResponse> {
    Json(CheckAuthResponse {
        authenticated: state.flow.is_authenticated(&email),
    })
}

/// DELETE /auth/:email: removes the stored credential.
pub(super) async fn logout(
    State(state): State<Arc<ApiState>>,
    Path(email): Path<String>,
) -> Result<Json<LogoutResponse>, ApiError> {
    let removed = state.flow.revoke(&email).await?;
    debug!(email, removed, "logout");
    Ok(Json(LogoutResponse { removed }))
}
