use crate::api::endpoints;
use crate::api::models::{Platform, PublishAction, PublishRequest};
use crate::auth::AuthService;
use crate::config::Settings;
use crate::errors::AppError;
use crate::utils::schedule::{format_instant, parse_schedule};
use crate::utils::spinner::Spinner;
use crate::utils::status_format::format_delivery;
use inquire::{Confirm, MultiSelect};
use serde_json::Value;
use std::sync::atomic::{AtomicU32, Ordering};

/// How many 2-second spinner polls to wait for the first delivery report
/// before handing off to `xpost watch`.
const MAX_DELIVERY_POLLS: u32 = 15;

/// Creates a post and hands it to the publishing automation, either
/// immediately or at the parsed schedule instant.
pub async fn execute(
    auth_service: &mut AuthService,
    settings: &Settings,
    content: &str,
    platform_flags: Option<Vec<Platform>>,
    media_urls: &[String],
    schedule: Option<&str>,
    skip_confirm: bool,
) -> Result<(), AppError> {
    if content.trim().is_empty() {
        return Err(AppError::ParseError("Post content cannot be empty".into()));
    }

    let platforms = match resolve_platforms(platform_flags, &settings.default_platforms) {
        Some(platforms) => platforms,
        None => prompt_platforms()?,
    };

    let scheduled_for = schedule
        .map(parse_schedule)
        .transpose()
        .map_err(AppError::Api)?;

    if scheduled_for.is_none() && !skip_confirm {
        let proceed = Confirm::new(&format!("Publish now to {}?", platform_list(&platforms)))
            .with_default(true)
            .prompt()
            .map_err(|e| AppError::ParseError(format!("Confirmation failed: {e}")))?;

        if !proceed {
            println!("Operation cancelled.");
            return Ok(());
        }
    }

    let scheduled_instant = scheduled_for.map(format_instant);
    let response = endpoints::create_post(
        auth_service.api_client(),
        content,
        &platforms,
        scheduled_instant.as_deref(),
        media_urls,
    )
    .await
    .map_err(AppError::Api)?;

    let post_id = response
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::ParseError("Create-post response carried no id".into()))?
        .to_string();

    let user_id = auth_service
        .user_id()
        .ok_or_else(|| {
            AppError::Other("No authenticated user id; run `xpost login` again".into())
        })?
        .to_string();

    let request = PublishRequest {
        post_id: post_id.clone(),
        user_id,
        content: content.to_string(),
        platforms: platforms.clone(),
        scheduled_for,
        media_urls: media_urls.to_vec(),
        action: match scheduled_for {
            Some(_) => PublishAction::Schedule,
            None => PublishAction::PostNow,
        },
    };

    endpoints::trigger_publish(auth_service.api_client(), &settings.webhook_url, &request)
        .await
        .map_err(AppError::Api)?;

    match scheduled_instant {
        Some(instant) => {
            println!("✓ Post {post_id} scheduled for {instant}");
        }
        None => {
            println!("✓ Post {post_id} handed to the publisher");
            wait_for_first_delivery(auth_service, &post_id).await;
        }
    }

    Ok(())
}

/// Polls briefly for the automation's first delivery report so an immediate
/// publish shows its outcome in place.
async fn wait_for_first_delivery(auth_service: &AuthService, post_id: &str) {
    let api_client = auth_service.api_client();
    let polls = AtomicU32::new(0);

    let mut spinner = Spinner::new();
    let deliveries = spinner
        .spin_with_callback(|| async {
            if polls.fetch_add(1, Ordering::SeqCst) >= MAX_DELIVERY_POLLS {
                return Some(None);
            }
            match endpoints::fetch_deliveries(api_client, post_id).await {
                Ok(list) if !list.is_empty() => Some(Some(list)),
                _ => None,
            }
        })
        .await;

    match deliveries {
        Some(deliveries) => {
            for delivery in &deliveries {
                println!("{}", format_delivery(delivery));
            }
        }
        None => {
            println!("No delivery report yet. Check later with `xpost watch {post_id}`.");
        }
    }
}

/// Platforms from flags win; otherwise the configured defaults; otherwise
/// the caller falls back to the interactive picker.
fn resolve_platforms(
    flags: Option<Vec<Platform>>,
    defaults: &[Platform],
) -> Option<Vec<Platform>> {
    match flags {
        Some(platforms) if !platforms.is_empty() => Some(dedup(platforms)),
        _ if !defaults.is_empty() => Some(defaults.to_vec()),
        _ => None,
    }
}

fn prompt_platforms() -> Result<Vec<Platform>, AppError> {
    let options: Vec<String> = Platform::ALL.iter().map(ToString::to_string).collect();
    let chosen = MultiSelect::new("Select platforms to post to:", options)
        .with_help_message("Space to toggle, Enter to confirm")
        .prompt()
        .map_err(|e| AppError::ParseError(format!("Selection failed: {e}")))?;

    if chosen.is_empty() {
        return Err(AppError::ParseError(
            "At least one platform is required".into(),
        ));
    }

    chosen
        .iter()
        .map(|name| name.parse::<Platform>().map_err(AppError::ParseError))
        .collect()
}

fn dedup(platforms: Vec<Platform>) -> Vec<Platform> {
    let mut seen = Vec::new();
    for platform in platforms {
        if !seen.contains(&platform) {
            seen.push(platform);
        }
    }
    seen
}

fn platform_list(platforms: &[Platform]) -> String {
    platforms
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
