//! Loopback HTTP server that receives OAuth redirects.
//!
//! The redirect page is the "callback page" of the handshake: it translates
//! the query string into a completion signal on the [`MessageBus`] and, for
//! login redirects, stashes the authorization code for the caller to pick up
//! once the handshake fulfills.

use axum::{
    extract::Query,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::Mutex;

use crate::auth::messages::MessageBus;

/// Fixed loopback port registered with the backend as the redirect target.
pub const CALLBACK_PORT: u16 = 8777;

/// Origin the callback page posts from; the launcher accepts no other.
pub fn callback_origin() -> String {
    format!("http://127.0.0.1:{CALLBACK_PORT}")
}

pub fn redirect_uri() -> String {
    format!("{}/callback", callback_origin())
}

/// Authorization code captured from a login redirect. The handshake itself
/// carries no payload, so the caller re-reads this store after fulfillment.
#[derive(Debug, Clone)]
pub struct AuthorizationCode {
    pub code: String,
    pub state: String,
}

pub type CodeStore = Arc<Mutex<Option<AuthorizationCode>>>;

pub fn new_code_store() -> CodeStore {
    Arc::new(Mutex::new(None))
}

#[derive(Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
    platform: Option<String>,
    /// Set by the backend when it finishes a platform connection server-side.
    connected: Option<String>,
}

/// Serves `/callback` until the process exits; run it on a detached task.
pub async fn start_callback_server(bus: MessageBus, store: CodeStore) -> anyhow::Result<()> {
    let app = Router::new().route(
        "/callback",
        get(move |Query(params): Query<CallbackParams>| {
            handle_callback(params, bus.clone(), Arc::clone(&store))
        }),
    );

    let addr = SocketAddr::from(([127, 0, 0, 1], CALLBACK_PORT));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn handle_callback(
    params: CallbackParams,
    bus: MessageBus,
    store: CodeStore,
) -> impl IntoResponse {
    let origin = callback_origin();

    if let Some(error) = params.error {
        let reason = params.error_description.unwrap_or(error);
        bus.post(
            &origin,
            json!({ "type": "oauth_error", "error": reason, "platform": params.platform }),
        );
        return (
            StatusCode::OK,
            Html(render_page(
                "Authorization failed",
                "You can close this tab and return to the terminal to try again.",
            )),
        );
    }

    match (params.code, params.state) {
        (Some(code), Some(state)) => {
            *store.lock().await = Some(AuthorizationCode { code, state });
            bus.post(
                &origin,
                json!({ "type": "oauth_success", "platform": params.platform }),
            );
            (
                StatusCode::OK,
                Html(render_page(
                    "Successfully authenticated Crosspost CLI",
                    "You may now close this tab and return to the terminal.",
                )),
            )
        }
        _ if params.connected.is_some() => {
            bus.post(
                &origin,
                json!({ "type": "oauth_success", "platform": params.connected }),
            );
            (
                StatusCode::OK,
                Html(render_page(
                    "Account connected",
                    "You may now close this tab and return to the terminal.",
                )),
            )
        }
        // Neither a completion nor an error. Nothing is posted and the
        // handshake stays pending; spoofed or truncated redirects must not
        // settle it.
        _ => (
            StatusCode::BAD_REQUEST,
            Html(render_page(
                "Unrecognized callback",
                "This redirect did not carry an authorization result.",
            )),
        ),
    }
}

fn render_page(heading: &str, detail: &str) -> String {
    format!(
        r#"
        <!DOCTYPE html>
        <html lang="en">
        <head>
            <meta charset="UTF-8">
            <meta name="viewport" content="width=device-width, initial-scale=1.0">
            <title>Crosspost CLI</title>
            <style type="text/css">
                body {{
                    color: #1B1F23;
                    background: #F6F8FA;
                    font-size: 14px;
                    font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif;
                    line-height: 1.5;
                    max-width: 620px;
                    margin: 28px auto;
                    text-align: center;
                }}

                h1 {{
                    font-size: 24px;
                    margin-bottom: 0;
                }}

                p {{
                    margin-top: 0;
                }}

                .box {{
                    border: 1px solid #E1E4E8;
                    background: white;
                    padding: 24px;
                    margin: 28px;
                }}
            </style>
        </head>
        <body>
            <div class="box">
              <h1>{heading}</h1>
              <p>{detail}</p>
            </div>
        </body>
        </html>
        "#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    fn params(query: &[(&str, &str)]) -> CallbackParams {
        let map: HashMap<String, String> = query
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        serde_json::from_value(serde_json::to_value(map).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_login_redirect_stores_code_and_posts_success() {
        let bus = MessageBus::new();
        let mut sub = bus.subscribe();
        let store = new_code_store();

        let _ = handle_callback(
            params(&[("code", "auth-code-123"), ("state", "state-456")]),
            bus.clone(),
            Arc::clone(&store),
        )
        .await;

        let captured = store.lock().await.clone().unwrap();
        assert_eq!(captured.code, "auth-code-123");
        assert_eq!(captured.state, "state-456");

        let message = sub.recv().await.unwrap();
        assert_eq!(message.origin, callback_origin());
        assert_eq!(message.data["type"], "oauth_success");
    }

    #[tokio::test]
    async fn test_error_redirect_posts_error_with_description() {
        let bus = MessageBus::new();
        let mut sub = bus.subscribe();

        let _ = handle_callback(
            params(&[
                ("error", "access_denied"),
                ("error_description", "User denied access"),
            ]),
            bus.clone(),
            new_code_store(),
        )
        .await;

        let message = sub.recv().await.unwrap();
        assert_eq!(message.data["type"], "oauth_error");
        assert_eq!(message.data["error"], "User denied access");
    }

    #[tokio::test]
    async fn test_error_redirect_falls_back_to_error_code() {
        let bus = MessageBus::new();
        let mut sub = bus.subscribe();

        let _ = handle_callback(
            params(&[("error", "access_denied")]),
            bus.clone(),
            new_code_store(),
        )
        .await;

        let message = sub.recv().await.unwrap();
        assert_eq!(message.data["error"], "access_denied");
    }

    #[tokio::test]
    async fn test_connect_redirect_posts_platform_success() {
        let bus = MessageBus::new();
        let mut sub = bus.subscribe();
        let store = new_code_store();

        let _ = handle_callback(
            params(&[("connected", "reddit")]),
            bus.clone(),
            Arc::clone(&store),
        )
        .await;

        assert!(store.lock().await.is_none());
        let message = sub.recv().await.unwrap();
        assert_eq!(message.data["type"], "oauth_success");
        assert_eq!(message.data["platform"], "reddit");
    }

    #[tokio::test]
    async fn test_unrecognized_redirect_posts_nothing() {
        let bus = MessageBus::new();
        let mut sub = bus.subscribe();

        let _ = handle_callback(params(&[]), bus.clone(), new_code_store()).await;

        // Nothing may have been posted; recv would hang, so bound the wait.
        let pending = tokio::time::timeout(Duration::from_millis(50), sub.recv()).await;
        assert!(pending.is_err());
    }
}
