use crate::api::endpoints;
use crate::api::models::Platform;
use crate::auth::callback_server::{self, new_code_store};
use crate::auth::handshake::PopupLauncher;
use crate::auth::messages::MessageBus;
use crate::auth::window::{PopupRequest, ScreenBounds, SystemBrowser};
use crate::auth::AuthService;
use crate::commands::accounts;
use crate::config::Settings;
use crate::errors::AppError;
use crate::storage::{self, CachedAccount};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(300);

/// Connects a platform account through the backend-mediated OAuth flow.
///
/// The backend holds the platform credentials and finishes the code exchange
/// server-side; the browser lands back on the loopback callback carrying a
/// bare pass/fail. After the handshake fulfills, the account list is re-read
/// from the backend to confirm the connection and refresh the local cache.
pub async fn execute(
    auth_service: &mut AuthService,
    settings: &Settings,
    platform: Platform,
) -> Result<(), AppError> {
    let state = crate::auth::pkce::generate_state();

    let bus = MessageBus::new();
    let code_store = new_code_store();
    tokio::spawn({
        let bus = bus.clone();
        let store = Arc::clone(&code_store);
        async move {
            if let Err(e) = callback_server::start_callback_server(bus, store).await {
                eprintln!("Callback server error: {e}");
            }
        }
    });

    let redirect_uri = callback_server::redirect_uri();
    let authorize =
        endpoints::platform_authorize_url(auth_service.api_client(), platform, &redirect_uri, &state)
            .await
            .map_err(AppError::Api)?;

    println!();
    println!("Opening your browser to connect {platform}...");

    let launcher = PopupLauncher::new(SystemBrowser, bus, callback_server::callback_origin());
    let request = PopupRequest::new(
        authorize.authorize_url,
        format!("crosspost-connect-{platform}"),
        ScreenBounds::default(),
    );

    tokio::time::timeout(CONNECT_TIMEOUT, launcher.authorize(request))
        .await
        .map_err(|_| AppError::AuthorizationTimeout)?
        .map_err(AppError::Handshake)?;

    // The handshake reports pass/fail only; the connection itself is
    // confirmed by re-reading the account list.
    let connected = accounts::get_accounts(auth_service).await?;
    let account = connected
        .iter()
        .find(|account| account.platform == platform.as_str())
        .ok_or_else(|| {
            AppError::Other(format!(
                "The flow completed but {platform} does not show as connected; try again"
            ))
        })?;

    let cache_path = settings.accounts_cache_path();
    let mut cache = storage::load_accounts(&cache_path)?;
    cache.upsert(CachedAccount {
        platform: account.platform.clone(),
        username: account.username.clone(),
        connected_at: account
            .connected_at
            .clone()
            .unwrap_or_else(|| Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()),
    });
    storage::save_accounts(&cache_path, &cache)?;

    match &account.username {
        Some(username) => println!("✓ Connected {platform} as {username}"),
        None => println!("✓ Connected {platform}"),
    }
    Ok(())
}

/// Disconnects a platform account and drops it from the local cache.
pub async fn disconnect(
    auth_service: &mut AuthService,
    settings: &Settings,
    platform: Platform,
) -> Result<(), AppError> {
    endpoints::disconnect_platform(auth_service.api_client(), platform)
        .await
        .map_err(AppError::Api)?;

    let cache_path = settings.accounts_cache_path();
    let mut cache = storage::load_accounts(&cache_path)?;
    cache.remove(platform.as_str());
    storage::save_accounts(&cache_path, &cache)?;

    println!("Disconnected {platform}.");
    Ok(())
}
