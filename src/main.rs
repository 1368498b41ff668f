mod api;
mod auth;
mod cli;
mod commands;
mod config;
mod errors;
mod storage;
mod user_agent;
mod utils;

use crate::api::errors::ApiError;
use auth::AuthService;
use clap::Parser;
use cli::{Cli, Commands};
use commands::{accounts, connect, login, logout, post, queue, status, watch};
use config::Settings;
use errors::AppError;
use serde_json::Value;
use std::process;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1) Load settings
    let settings = Settings::new()?;

    // 2) Init AuthService
    let mut auth_service = AuthService::new(
        settings.api_base.clone(),
        settings.credentials_dir.clone(),
        &settings.profile,
    );

    // 3) Dispatch commands
    match Cli::parse().command {
        Commands::Version => {
            const VERSION: &str = env!("CARGO_PKG_VERSION");
            const NAME: &str = env!("CARGO_PKG_NAME");
            println!("{NAME} {VERSION}");
        }
        Commands::Login => {
            if let Err(e) = login::execute(&mut auth_service, &settings).await {
                match &e {
                    AppError::Api(ApiError::Unauthorized(body))
                    | AppError::Api(ApiError::BadRequest(body)) => {
                        let err_code = serde_json::from_str::<Value>(body.as_str())
                            .ok()
                            .and_then(|v| v.get("error").and_then(Value::as_str).map(String::from))
                            .unwrap_or_else(|| "unknown_error".into());

                        let (msg, hint) = match err_code.as_str() {
                            "invalid_client" => (
                                "Invalid client ID".to_string(),
                                "Check your `client_id` in ~/.crosspost/config.toml".to_string(),
                            ),
                            "invalid_request" => (
                                "Malformed request".to_string(),
                                "Ensure `client_id` and `redirect_uri` are set".to_string(),
                            ),
                            "invalid_grant" => (
                                "Authorization code rejected".to_string(),
                                "The code may have expired; run `xpost login` again".to_string(),
                            ),
                            other => (
                                format!("Authentication error: {other}"),
                                "See API docs for error codes".to_string(),
                            ),
                        };

                        eprintln!();
                        eprintln!("error: {msg}");
                        eprintln!("hint: {hint}");
                    }
                    _ => {
                        eprintln!();
                        eprintln!("error: {e}");
                    }
                }
                process::exit(1);
            }
        }
        Commands::Logout => {
            auth_service.clear_tokens();
            logout::execute();
        }
        Commands::Status => {
            status::execute(&mut auth_service).await?;
        }
        Commands::Connect { platform } => {
            require_auth(&mut auth_service).await;

            if let Err(e) = connect::execute(&mut auth_service, &settings, platform).await {
                eprintln!("\nerror: {e}");
                process::exit(1);
            }
        }
        Commands::Disconnect { platform } => {
            require_auth(&mut auth_service).await;

            if let Err(e) = connect::disconnect(&mut auth_service, &settings, platform).await {
                eprintln!("\nerror: {e}");
                process::exit(1);
            }
        }
        Commands::Accounts { cached } => {
            if cached {
                // The cached list is local-only and works logged out
                if let Err(e) = accounts::list_cached(&settings.accounts_cache_path()) {
                    eprintln!("\nerror: {e}");
                    process::exit(1);
                }
            } else {
                require_auth(&mut auth_service).await;

                if let Err(e) = accounts::list(&mut auth_service).await {
                    eprintln!("\nerror: {e}");
                    process::exit(1);
                }
            }
        }
        Commands::Post {
            messages,
            platforms,
            edit,
            media,
            schedule,
            yes,
        } => {
            require_auth(&mut auth_service).await;

            let content = if edit {
                match utils::editor::open_in_editor(Some(utils::editor::DEFAULT_TEMPLATE)) {
                    Ok(content) => {
                        if content.is_empty() {
                            eprintln!("No content provided. Aborting.");
                            process::exit(1);
                        }
                        content
                    }
                    Err(e) => {
                        eprintln!("\nerror: {e}");
                        process::exit(1);
                    }
                }
            } else {
                messages.join("\n\n")
            };

            if let Err(e) = post::execute(
                &mut auth_service,
                &settings,
                &content,
                platforms,
                &media.unwrap_or_default(),
                schedule.as_deref(),
                yes,
            )
            .await
            {
                eprintln!("\nerror: {e}");
                process::exit(1);
            }
        }
        Commands::Queue {
            status,
            limit,
            verbose,
        } => {
            require_auth(&mut auth_service).await;

            if let Err(e) = queue::execute(&mut auth_service, status.as_deref(), limit, verbose).await
            {
                eprintln!("\nerror: {e}");
                process::exit(1);
            }
        }
        Commands::Watch { post_id } => {
            require_auth(&mut auth_service).await;

            if let Err(e) = watch::execute(&mut auth_service, &post_id).await {
                eprintln!("\nerror: {e}");
                process::exit(1);
            }
        }
    }

    Ok(())
}

/// Exits with guidance when the stored token is missing or no longer valid.
async fn require_auth(auth_service: &mut AuthService) {
    if let Err(e) = auth_service.ensure_authenticated().await {
        if matches!(e, AppError::Auth(_)) {
            eprintln!();
            eprintln!("You are not authenticated. Run `xpost login` first.");
            process::exit(1);
        } else {
            eprintln!();
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
