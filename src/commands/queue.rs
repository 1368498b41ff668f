use crate::api::endpoints::fetch_posts;
use crate::auth::AuthService;
use crate::errors::AppError;
use crate::utils::status_format::status_label;
use chrono::{DateTime, Utc};
use colored::*;
use crossterm::event::{read, Event, KeyCode, KeyEvent};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use serde_json::Value;
use std::io::{self, Write};

pub async fn execute(
    auth_service: &mut AuthService,
    status: Option<&str>,
    limit: u32,
    verbose: bool,
) -> Result<(), AppError> {
    let api_client = auth_service.api_client();
    let mut cursor: Option<String> = None;
    let mut all_posts_loaded = false;

    // Load first page
    let response = fetch_posts(api_client, status, limit, cursor.as_deref()).await?;

    if let Some(posts) = response.get("posts").and_then(Value::as_array) {
        if posts.is_empty() {
            println!("No posts found.");
            return Ok(());
        }

        for post in posts {
            print_post(post, verbose);
        }

        // Check if we have more pages
        let meta = response.get("meta");
        if let Some(end_cursor) = meta.and_then(|m| m.get("end_cursor").and_then(Value::as_str)) {
            cursor = Some(end_cursor.to_string());
        } else {
            all_posts_loaded = true;
        }

        if !all_posts_loaded {
            interactive_pagination(auth_service, status, limit, verbose, &mut cursor).await?;
        }
    } else {
        println!("No posts found.");
    }

    Ok(())
}

async fn interactive_pagination(
    auth_service: &mut AuthService,
    status: Option<&str>,
    limit: u32,
    verbose: bool,
    cursor: &mut Option<String>,
) -> Result<(), AppError> {
    let api_client = auth_service.api_client();

    loop {
        // Show pagination prompt
        print!("{}", "Press ".bright_black());
        print!("{}", "SPACE".bright_white());
        print!("{}", " for more, ".bright_black());
        print!("{}", "q".bright_white());
        print!("{}", " to quit: ".bright_black());
        io::stdout().flush().unwrap();

        // Enable raw mode for single key input
        enable_raw_mode()
            .map_err(|e| AppError::Other(format!("Failed to enable raw mode: {e}")))?;

        let key_result = read();

        // Always disable raw mode before continuing
        disable_raw_mode()
            .map_err(|e| AppError::Other(format!("Failed to disable raw mode: {e}")))?;

        match key_result {
            Ok(Event::Key(KeyEvent { code, .. })) => match code {
                KeyCode::Char(' ') | KeyCode::Enter => {
                    clear_prompt_line();

                    let response = fetch_posts(api_client, status, limit, cursor.as_deref()).await?;

                    let Some(posts) = response.get("posts").and_then(Value::as_array) else {
                        println!("No more posts.");
                        break;
                    };

                    if posts.is_empty() {
                        println!("No more posts.");
                        break;
                    }

                    for post in posts {
                        print_post(post, verbose);
                    }

                    // Update cursor for next page
                    let meta = response.get("meta");
                    if let Some(end_cursor) =
                        meta.and_then(|m| m.get("end_cursor").and_then(Value::as_str))
                    {
                        *cursor = Some(end_cursor.to_string());
                    } else {
                        println!("No more posts.");
                        break;
                    }
                }
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    clear_prompt_line();
                    break;
                }
                _ => {
                    clear_prompt_line();
                    continue;
                }
            },
            Ok(_) => continue,
            Err(e) => {
                return Err(AppError::Other(format!("Error reading key: {e}")));
            }
        }
    }

    Ok(())
}

fn clear_prompt_line() {
    print!("\r{}\r", " ".repeat(50));
    io::stdout().flush().unwrap();
}

fn print_post(post: &Value, verbose: bool) {
    let id = post.get("id").and_then(Value::as_str).unwrap_or("unknown");
    let content = post.get("content").and_then(Value::as_str).unwrap_or("");
    let status = post.get("status").and_then(Value::as_str).unwrap_or("unknown");

    let platforms = post
        .get("platforms")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default();

    let scheduled = post
        .get("scheduled_for")
        .and_then(Value::as_str)
        .and_then(|raw| raw.parse::<DateTime<Utc>>().ok())
        .map(|dt| format!(" @ {}", dt.format("%Y-%m-%d %H:%M UTC")))
        .unwrap_or_default();

    let short_id = if id.len() >= 8 { &id[..8] } else { id };
    println!(
        "{} ({}){}",
        status_label(status),
        short_id.bright_black(),
        scheduled.bright_blue()
    );

    if verbose {
        println!("  {}", content.white());
    } else {
        let first_line = content.lines().next().unwrap_or("");
        let truncated = if first_line.len() > 80 {
            format!("{}...", &first_line[..77])
        } else {
            first_line.to_string()
        };

        if !truncated.is_empty() {
            println!("  {}", truncated.white());
        }
    }

    if !platforms.is_empty() {
        println!("  Platforms: {}", platforms.bright_yellow());
    }
    println!();
}
