//! HTTP API for the auth flow and uploads.
//!
//! Boundary contract:
//! - `GET    /auth/url`          → authorization URL for the consent screen
//! - `GET    /auth/callback`     → completes the code exchange, stores the token
//! - `GET    /check-auth/:email` → whether a credential is stored
//! - `DELETE /auth/:email`       → removes the stored credential (logout)
//! - `POST   /upload`            → multipart upload into the user's Drive
//!
//! Every core error is translated here into a status code and a JSON
//! `{ "error": ... }` body; nothing crashes the process.

mod auth;
mod upload;

use crate::error::Error;
use crate::oauth::AuthFlow;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
    Router,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::warn;

/// Shared application state for the API
#[derive(Clone)]
pub struct ApiState {
    pub flow: Arc<AuthFlow>,
    pub staging_dir: PathBuf,
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Request-boundary error: either a malformed request caught at the HTTP
/// layer, or a core error mapped by taxonomy.
pub(crate) enum ApiError {
    BadRequest(String),
    Core(Error),
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError::Core(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Core(e) => {
                let status = match &e {
                    Error::MissingInput(_) => StatusCode::BAD_REQUEST,
                    Error::NotFound(_) | Error::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
                    Error::Exchange(_) | Error::IdentityLookup(_) | Error::Upload(_) => {
                        StatusCode::BAD_GATEWAY
                    }
                    Error::CorruptRecord { .. } | Error::Io(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, e.to_string())
            }
        };

        warn!(status = %status, error = %message, "request failed");

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Create the API router.
///
/// `cors_origin` is the browser frontend's origin; an unparseable value falls
/// back to the default local frontend rather than leaving the API unusable.
pub fn create_router(state: ApiState, cors_origin: &str, max_upload_bytes: usize) -> Router {
    let origin = cors_origin
        .parse::<HeaderValue>()
        .unwrap_or_else(|_| HeaderValue::from_static("http://localhost:3000"));

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/auth/url", get(auth::auth_url))
        .route("/auth/callback", get(auth::auth_callback))
        .route("/auth/:email", delete(auth::logout))
        .route("/check-auth/:email", get(auth::check_auth))
        .route("/upload", post(upload::upload))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .with_state(Arc::new(state))
}
