use crate::api::client::ApiClient;
use crate::api::errors::ApiError;
use crate::api::models::{
    DeliveryStatus, Platform, PlatformAuthorizeResponse, PublishRequest, TokenInfoResponse,
    TokenResponse,
};
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

// Scopes requested by the official CLI
const CLI_SCOPES: &str = concat!(
    "posts:read,posts:write,",
    "platforms:read,platforms:write,",
    "media:write"
);

/// Assembles the authorization URL for the login flow. The handshake never
/// builds URLs itself; everything the server needs (response type, client,
/// redirect, scopes, CSRF state and the PKCE challenge) is encoded here.
pub fn build_authorize_url(
    api_base: &str,
    client_id: &str,
    redirect_uri: &str,
    state: &str,
    code_challenge: &str,
) -> Result<String, ApiError> {
    let mut url = Url::parse(api_base)
        .map_err(|e| ApiError::InvalidInput(format!("Invalid API base URL: {e}")))?;
    url.set_path("oauth/authorize");
    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("scope", CLI_SCOPES)
        .append_pair("state", state)
        .append_pair("code_challenge", code_challenge)
        .append_pair("code_challenge_method", "S256");

    Ok(url.into())
}

/// Exchanges an authorization code (plus the retained PKCE verifier) for
/// tokens.
pub async fn exchange_code_for_token(
    api_client: &ApiClient,
    client_id: &str,
    code: &str,
    code_verifier: &str,
    redirect_uri: &str,
) -> Result<TokenResponse, ApiError> {
    let body = json!({
        "grant_type": "authorization_code",
        "client_id": client_id,
        "code": code,
        "code_verifier": code_verifier,
        "redirect_uri": redirect_uri,
    });

    api_client.post("oauth/token", body, false).await
}

/// Checks the validity of an existing token.
pub async fn check_token_info(
    api_client: &ApiClient,
    token: &str,
) -> Result<TokenInfoResponse, ApiError> {
    let body = json!({ "token": token });

    let response: TokenInfoResponse = api_client.post("oauth/token_info", body, true).await?;
    if response.active {
        Ok(response)
    } else {
        Err(ApiError::Unauthorized("Token is inactive".into()))
    }
}

/// Asks the backend for a platform's authorization URL. The backend holds
/// the per-platform client credentials and completes the code exchange
/// server-side; the browser lands back on `redirect_uri` carrying only a
/// pass/fail result.
pub async fn platform_authorize_url(
    api_client: &ApiClient,
    platform: Platform,
    redirect_uri: &str,
    state: &str,
) -> Result<PlatformAuthorizeResponse, ApiError> {
    let body = json!({
        "redirect_uri": redirect_uri,
        "state": state,
    });

    let endpoint = format!("api/v1/platforms/{platform}/authorize_url");
    api_client.post(&endpoint, body, true).await
}

/// Fetches the connected platform accounts for the current user.
pub async fn fetch_accounts(api_client: &ApiClient) -> Result<Value, ApiError> {
    api_client.get("api/v1/platforms", true).await
}

/// Disconnects a platform account.
pub async fn disconnect_platform(
    api_client: &ApiClient,
    platform: Platform,
) -> Result<Value, ApiError> {
    let endpoint = format!("api/v1/platforms/{platform}/disconnect");
    api_client.post(&endpoint, json!({}), true).await
}

/// Creates a post. `scheduled_for` is an ISO8601 instant; omitted for
/// publish-now posts.
pub async fn create_post(
    api_client: &ApiClient,
    content: &str,
    platforms: &[Platform],
    scheduled_for: Option<&str>,
    media_urls: &[String],
) -> Result<Value, ApiError> {
    let mut body = json!({
        "content": content,
        "platforms": platforms,
    });

    if let Some(instant) = scheduled_for {
        if let Some(obj) = body.as_object_mut() {
            obj.insert("scheduled_for".to_string(), json!(instant));
        }
    }

    if !media_urls.is_empty() {
        if let Some(obj) = body.as_object_mut() {
            obj.insert("media_urls".to_string(), json!(media_urls));
        }
    }

    api_client.post("api/v1/posts", body, true).await
}

/// Fetches posts with optional status filtering and cursor pagination.
pub async fn fetch_posts(
    api_client: &ApiClient,
    status: Option<&str>,
    limit: u32,
    starting_after: Option<&str>,
) -> Result<Value, ApiError> {
    let mut params = vec![format!("limit={}", limit)];

    if let Some(status) = status {
        params.push(format!("status={status}"));
    }

    if let Some(cursor) = starting_after {
        params.push(format!("starting_after={cursor}"));
    }

    let endpoint = format!("api/v1/posts?{}", params.join("&"));
    api_client.get(&endpoint, true).await
}

#[derive(Deserialize)]
struct DeliveriesResponse {
    deliveries: Vec<DeliveryStatus>,
}

/// Fetches the delivery reports the automation service has posted back for
/// one post.
pub async fn fetch_deliveries(
    api_client: &ApiClient,
    post_id: &str,
) -> Result<Vec<DeliveryStatus>, ApiError> {
    let endpoint = format!("api/v1/posts/{post_id}/deliveries");
    let response: DeliveriesResponse = api_client.get(&endpoint, true).await?;
    Ok(response.deliveries)
}

/// Hands a post to the publishing-automation webhook.
pub async fn trigger_publish(
    api_client: &ApiClient,
    webhook_url: &str,
    request: &PublishRequest,
) -> Result<Value, ApiError> {
    let body = serde_json::to_value(request)
        .map_err(|e| ApiError::InvalidInput(format!("Failed to encode publish payload: {e}")))?;
    api_client.post_absolute(webhook_url, body).await
}
