use crate::api::endpoints::{build_authorize_url, exchange_code_for_token};
use crate::auth::callback_server::{self, new_code_store};
use crate::auth::handshake::PopupLauncher;
use crate::auth::messages::MessageBus;
use crate::auth::pkce::{generate_state, PkcePair};
use crate::auth::window::{PopupRequest, ScreenBounds, SystemBrowser};
use crate::auth::AuthService;
use crate::config::Settings;
use crate::errors::AppError;
use std::sync::Arc;
use std::time::Duration;

/// How long the browser flow may stay unresolved before we give up. The
/// handshake cannot observe an abandoned external browser tab, so the
/// overall timeout lives here with the caller.
const LOGIN_TIMEOUT: Duration = Duration::from_secs(300);

/// Runs the OAuth authorization-code flow with PKCE and saves the token.
pub async fn execute(auth_service: &mut AuthService, settings: &Settings) -> Result<(), AppError> {
    let pkce = PkcePair::generate()?;
    let state = generate_state();

    // The callback page of the handshake: it receives the redirect, stores
    // the authorization code, and posts the completion signal.
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
    let authorize_url = build_authorize_url(
        &settings.api_base,
        &settings.client_id,
        &redirect_uri,
        &state,
        &pkce.challenge,
    )
    .map_err(AppError::Api)?;

    println!();
    println!("Opening your browser to sign in to Crosspost...");
    println!("If nothing opens, visit:\n  {authorize_url}");

    let launcher = PopupLauncher::new(SystemBrowser, bus, callback_server::callback_origin());
    let request = PopupRequest::new(authorize_url, "crosspost-login", ScreenBounds::default());

    tokio::time::timeout(LOGIN_TIMEOUT, launcher.authorize(request))
        .await
        .map_err(|_| AppError::AuthorizationTimeout)?
        .map_err(AppError::Handshake)?;

    // Fulfillment carries no payload; the code is picked up from the store
    // the callback server wrote.
    let authorization = code_store.lock().await.take().ok_or_else(|| {
        AppError::Other("Authorization completed but no code was captured".to_string())
    })?;

    if authorization.state != state {
        return Err(AppError::Other(
            "State mismatch in authorization callback; aborting login".to_string(),
        ));
    }

    let token = exchange_code_for_token(
        auth_service.api_client(),
        &settings.client_id,
        &authorization.code,
        &pkce.verifier,
        &redirect_uri,
    )
    .await
    .map_err(AppError::Api)?;
    auth_service.save_access_token(&token.access_token)?;

    println!("Authentication successful!");
    Ok(())
}
