use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Social networks a post can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Reddit,
    Twitter,
    Linkedin,
    Facebook,
    Instagram,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Reddit,
        Platform::Twitter,
        Platform::Linkedin,
        Platform::Facebook,
        Platform::Instagram,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Reddit => "reddit",
            Platform::Twitter => "twitter",
            Platform::Linkedin => "linkedin",
            Platform::Facebook => "facebook",
            Platform::Instagram => "instagram",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reddit" => Ok(Platform::Reddit),
            "twitter" => Ok(Platform::Twitter),
            "linkedin" => Ok(Platform::Linkedin),
            "facebook" => Ok(Platform::Facebook),
            "instagram" => Ok(Platform::Instagram),
            other => Err(format!(
                "unknown platform '{other}' (expected one of: reddit, twitter, linkedin, facebook, instagram)"
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
#[allow(unused)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub refresh_token: Option<String>,
    pub scope: String,
}

#[derive(Debug, Deserialize)]
#[allow(unused)]
pub struct TokenInfoResponse {
    pub active: bool,
    pub scope: String,
    pub client_id: String,
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub exp: u64,
}

#[derive(Debug, Deserialize)]
pub struct PlatformAuthorizeResponse {
    pub authorize_url: String,
}

/// What the publish webhook should do with the post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishAction {
    PostNow,
    Schedule,
}

/// Payload posted to the publishing-automation webhook. The field names are
/// that service's contract; do not rename them.
#[derive(Debug, Clone, Serialize)]
pub struct PublishRequest {
    pub post_id: String,
    pub user_id: String,
    pub content: String,
    pub platforms: Vec<Platform>,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub media_urls: Vec<String>,
    pub action: PublishAction,
}

/// Status callback the automation service reports back after a publish run.
/// That service speaks camelCase on the wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryStatus {
    pub post_id: String,
    pub queue_id: Option<String>,
    pub status: String,
    #[serde(default)]
    pub platform_post_ids: HashMap<String, String>,
    pub error_message: Option<String>,
    pub execution_id: Option<String>,
    #[serde(default)]
    pub success_count: u32,
    #[serde(default)]
    pub failure_count: u32,
}
