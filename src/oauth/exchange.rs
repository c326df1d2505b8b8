//! Token exchange and identity discovery calls against the provider.

use super::provider::OAuthProviderConfig;
use crate::error::{Error, Result};
use crate::token_store::TokenRecord;
use chrono::{Duration, Utc};
use serde::Deserialize;
use std::collections::HashMap;

/// Token response from the provider's token endpoint (standard OAuth 2.0)
#[derive(Deserialize, Debug)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
}

/// Response from the provider's identity endpoint
#[derive(Deserialize, Debug)]
struct UserInfo {
    #[serde(default)]
    email: Option<String>,
}

/// Exchange an authorization code for a token record.
///
/// One POST to the token endpoint. The `expires_in` delta in the response is
/// converted to an absolute `expires_at` timestamp here, at exchange time.
pub async fn exchange_code_for_token(
    client: &reqwest::Client,
    config: &OAuthProviderConfig,
    code: &str,
) -> Result<TokenRecord> {
    let mut form_data = HashMap::new();
    form_data.insert("grant_type", "authorization_code");
    form_data.insert("code", code);
    form_data.insert("redirect_uri", &config.redirect_uri);
    form_data.insert("client_id", &config.client_id);
    form_data.insert("client_secret", &config.client_secret);

    tracing::debug!(token_url = %config.token_url, "exchanging authorization code");

    let response = client
        .post(&config.token_url)
        .header("Accept", "application/json")
        .form(&form_data)
        .send()
        .await
        .map_err(|e| Error::Exchange(format!("token endpoint request failed: {e}")))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(Error::Exchange(format!(
            "token endpoint returned {status}: {body}"
        )));
    }

    let token_response: TokenResponse = response
        .json()
        .await
        .map_err(|e| Error::Exchange(format!("invalid token response: {e}")))?;

    tracing::debug!(
        has_refresh_token = token_response.refresh_token.is_some(),
        expires_in = ?token_response.expires_in,
        "token exchange successful"
    );

    let expires_at = token_response
        .expires_in
        .map(|seconds| Utc::now() + Duration::seconds(seconds));

    Ok(TokenRecord {
        access_token: token_response.access_token,
        refresh_token: token_response.refresh_token,
        expires_at,
        scope: token_response.scope,
        token_type: token_response.token_type,
    })
}

/// Resolve the authenticated user's email via the identity endpoint.
///
/// One GET with the freshly-issued bearer token. An empty or absent email in
/// an otherwise successful response is still a lookup failure: the email is
/// the store key, so there is nothing to do without it.
pub async fn fetch_user_email(
    client: &reqwest::Client,
    config: &OAuthProviderConfig,
    access_token: &str,
) -> Result<String> {
    let response = client
        .get(&config.userinfo_url)
        .bearer_auth(access_token)
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(|e| Error::IdentityLookup(format!("identity endpoint request failed: {e}")))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(Error::IdentityLookup(format!(
            "identity endpoint returned {status}: {body}"
        )));
    }

    let info: UserInfo = response
        .json()
        .await
        .map_err(|e| Error::IdentityLookup(format!("invalid identity response: {e}")))?;

    info.email
        .filter(|email| !email.is_empty())
        .ok_or_else(|| Error::IdentityLookup("identity endpoint returned no email".to_string()))
}
