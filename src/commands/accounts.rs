use crate::api::endpoints;
use crate::auth::AuthService;
use crate::errors::AppError;
use crate::storage;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Debug, Deserialize, Serialize)]
pub struct Account {
    pub platform: String,
    pub username: Option<String>,
    pub connected_at: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
struct AccountsResponse {
    accounts: Vec<Account>,
}

/// Lists the connected platform accounts for the authenticated user.
pub async fn list(auth_service: &mut AuthService) -> Result<(), AppError> {
    let accounts = get_accounts(auth_service).await?;

    if accounts.is_empty() {
        println!("No connected accounts. Run `xpost connect <platform>` to add one.");
        return Ok(());
    }

    let rows: Vec<AccountTableRow> = accounts
        .into_iter()
        .map(|account| AccountTableRow {
            platform: account.platform,
            username: account.username.unwrap_or_else(|| "—".into()),
            connected_at: account.connected_at.unwrap_or_else(|| "unknown".into()),
        })
        .collect();
    print_table(rows);
    Ok(())
}

/// Lists the locally cached accounts without touching the API.
pub fn list_cached(cache_path: &Path) -> Result<(), AppError> {
    let cache = storage::load_accounts(cache_path)?;

    if cache.accounts.is_empty() {
        println!("No cached accounts. Run `xpost connect <platform>` first.");
        return Ok(());
    }

    let rows: Vec<AccountTableRow> = cache
        .accounts
        .into_iter()
        .map(|account| AccountTableRow {
            platform: account.platform,
            username: account.username.unwrap_or_else(|| "—".into()),
            connected_at: account.connected_at,
        })
        .collect();
    print_table(rows);
    Ok(())
}

fn print_table(rows: Vec<AccountTableRow>) {
    let table = Table::new(rows).with(Style::modern()).to_string();
    println!("{table}");
}

#[derive(Tabled)]
struct AccountTableRow {
    #[tabled(rename = "Platform")]
    platform: String,

    #[tabled(rename = "Username")]
    username: String,

    #[tabled(rename = "Connected")]
    connected_at: String,
}

/// Gets accounts from the API and parses the response.
pub async fn get_accounts(auth_service: &mut AuthService) -> Result<Vec<Account>, AppError> {
    let response = endpoints::fetch_accounts(auth_service.api_client())
        .await
        .map_err(AppError::Api)?;

    let parsed: AccountsResponse = serde_json::from_value(response)
        .map_err(|e| AppError::ParseError(format!("Failed to parse accounts response: {e}")))?;

    Ok(parsed.accounts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{mock, server_url};
    use serde_json::json;
    use serial_test::serial;

    fn setup_mock_auth_service() -> AuthService {
        let mut auth = AuthService::new(server_url(), std::env::temp_dir(), "accounts-test");
        auth.save_access_token("test-token").unwrap();
        auth
    }

    // These three mock the same GET route with different bodies, so they
    // cannot share the global mock server concurrently.
    #[tokio::test]
    #[serial]
    async fn test_get_accounts_success() {
        let mut auth = setup_mock_auth_service();

        let response = json!({
            "accounts": [
                {
                    "platform": "reddit",
                    "username": "u/crossposter",
                    "connected_at": "2026-08-01T12:00:00Z"
                },
                {
                    "platform": "twitter",
                    "username": "@crossposter",
                    "connected_at": "2026-08-02T08:30:00Z"
                }
            ]
        });

        let _m = mock("GET", "/api/v1/platforms")
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(response.to_string())
            .create();

        let accounts = get_accounts(&mut auth).await.unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].platform, "reddit");
        assert_eq!(accounts[0].username.as_deref(), Some("u/crossposter"));
        assert_eq!(accounts[1].platform, "twitter");
    }

    #[tokio::test]
    #[serial]
    async fn test_get_accounts_empty() {
        let mut auth = setup_mock_auth_service();

        let _m = mock("GET", "/api/v1/platforms")
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "accounts": [] }).to_string())
            .create();

        let accounts = get_accounts(&mut auth).await.unwrap();
        assert!(accounts.is_empty());
    }

    #[tokio::test]
    #[serial]
    async fn test_get_accounts_unauthorized() {
        let mut auth = setup_mock_auth_service();

        let _m = mock("GET", "/api/v1/platforms")
            .match_header("authorization", "Bearer test-token")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"unauthorized"}"#)
            .create();

        let result = get_accounts(&mut auth).await;
        assert!(matches!(result, Err(AppError::Api(_))));
    }
}
