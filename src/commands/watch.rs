use crate::api::endpoints::fetch_deliveries;
use crate::auth::AuthService;
use crate::errors::AppError;
use crate::utils::status_format::format_delivery;
use futures::StreamExt;

/// Shows the delivery reports for a post, then follows the event stream
/// until the automation reaches a terminal outcome.
pub async fn execute(auth_service: &mut AuthService, post_id: &str) -> Result<(), AppError> {
    let deliveries = fetch_deliveries(auth_service.api_client(), post_id)
        .await
        .map_err(AppError::Api)?;

    if deliveries.is_empty() {
        println!("No delivery reports yet for {post_id}.");
    } else {
        for delivery in &deliveries {
            println!("{}", format_delivery(delivery));
            println!();
        }
    }

    if deliveries
        .iter()
        .any(|delivery| is_terminal(&delivery.status))
    {
        return Ok(());
    }

    println!("Waiting for delivery updates... (Ctrl-C to stop)");

    let endpoint = format!("api/v1/posts/{post_id}/events");
    let mut stream = auth_service
        .api_client()
        .stream_sse(&endpoint)
        .await
        .map_err(AppError::Api)?;

    while let Some(event) = stream.next().await {
        match event {
            Ok(delivery) => {
                println!("{}", format_delivery(&delivery));
                println!();
                if is_terminal(&delivery.status) {
                    break;
                }
            }
            Err(e) => {
                eprintln!("Stream error: {e}");
                break;
            }
        }
    }

    Ok(())
}

/// A delivery run ends in exactly one of these states. Note that partial is
/// terminal and distinct; it never collapses into published.
fn is_terminal(status: &str) -> bool {
    matches!(status, "published" | "partial" | "failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(is_terminal("published"));
        assert!(is_terminal("partial"));
        assert!(is_terminal("failed"));
        assert!(!is_terminal("queued"));
        assert!(!is_terminal("publishing"));
    }
}
