// Integration tests for the auth endpoints that never reach the provider:
// authorization URL content, status checks, logout, and callback rejection.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use drivedrop::api::{create_router, ApiState};
use drivedrop::oauth::{
    AuthFlow, OAuthProviderConfig, SCOPE_DRIVE_FILE, SCOPE_USERINFO_EMAIL,
};
use drivedrop::token_store::{TokenRecord, TokenStore};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

struct TestApp {
    _dir: tempfile::TempDir,
    store: Arc<TokenStore>,
    router: Router,
}

async fn test_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(TokenStore::open(dir.path().join("tokens")).await.unwrap());

    // Offline tests: endpoints point at Google but are never called
    let flow = Arc::new(
        AuthFlow::new(
            OAuthProviderConfig::google(
                "test_client_id".to_string(),
                "test_secret".to_string(),
                "http://localhost:5000/auth/callback".to_string(),
            ),
            Arc::clone(&store),
            Duration::from_secs(5),
        )
        .unwrap(),
    );

    let router = create_router(
        ApiState {
            flow,
            staging_dir: dir.path().join("uploads"),
        },
        "http://localhost:3000",
        1024 * 1024,
    );

    TestApp {
        _dir: dir,
        store,
        router,
    }
}

async fn get_json(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn record() -> TokenRecord {
    TokenRecord {
        access_token: "tok1".to_string(),
        refresh_token: None,
        expires_at: None,
        scope: None,
        token_type: None,
    }
}

#[tokio::test]
async fn test_auth_url_contains_scopes_and_forced_consent() {
    let app = test_app().await;

    let (status, json) = get_json(app.router, "/auth/url").await;
    assert_eq!(status, StatusCode::OK);

    let url = json["url"].as_str().unwrap();
    assert!(url.contains("prompt=consent"));
    assert!(url.contains("access_type=offline"));
    assert!(url.contains("response_type=code"));
    assert!(url.contains(urlencoding::encode(SCOPE_DRIVE_FILE).as_ref()));
    assert!(url.contains(urlencoding::encode(SCOPE_USERINFO_EMAIL).as_ref()));
}

#[tokio::test]
async fn test_check_auth_reflects_store_state() {
    let app = test_app().await;

    let (status, json) = get_json(app.router.clone(), "/check-auth/a@x.com").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["authenticated"], false);

    app.store.save("a@x.com", &record()).await.unwrap();

    let (status, json) = get_json(app.router, "/check-auth/a@x.com").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["authenticated"], true);
}

#[tokio::test]
async fn test_callback_without_code_is_400() {
    let app = test_app().await;

    let (status, json) = get_json(app.router, "/auth/callback").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("authorization code"));
}

#[tokio::test]
async fn test_callback_with_provider_error_is_400() {
    let app = test_app().await;

    let (status, json) = get_json(
        app.router,
        "/auth/callback?error=access_denied&error_description=User+cancelled",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let message = json["error"].as_str().unwrap();
    assert!(message.contains("access_denied"));
    assert!(message.contains("User cancelled"));
}

#[tokio::test]
async fn test_logout_removes_stored_credential() {
    let app = test_app().await;
    app.store.save("a@x.com", &record()).await.unwrap();

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/auth/a@x.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["removed"], true);
    assert!(!app.store.exists("a@x.com"));

    // A second logout finds nothing to remove
    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/auth/a@x.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["removed"], false);
}

#[tokio::test]
async fn test_upload_with_missing_email_field_is_400() {
    let app = test_app().await;

    let boundary = "X-DRIVEDROP-TEST-BOUNDARY";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"f.txt\"\r\n\
         Content-Type: text/plain\r\n\r\n\
         hello\r\n\
         --{boundary}--\r\n"
    );

    let response = app
        .router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/upload")
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("email"));
}
