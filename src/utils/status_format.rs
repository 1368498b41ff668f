use crate::api::models::DeliveryStatus;
use colored::*;

/// Colored label for a post or delivery status.
///
/// A partial delivery keeps its own label: some platforms succeeded, some
/// failed, and collapsing that into "published" would hide the failures.
pub fn status_label(status: &str) -> String {
    match status {
        "draft" => "draft".bright_black().to_string(),
        "queued" => "queued".bright_yellow().to_string(),
        "publishing" => "publishing".bright_blue().to_string(),
        "published" => "published".bright_green().to_string(),
        "partial" => "partial".bright_magenta().to_string(),
        "failed" => "failed".bright_red().to_string(),
        other => other.white().to_string(),
    }
}

/// Renders one delivery report as terminal lines.
pub fn format_delivery(delivery: &DeliveryStatus) -> String {
    let mut lines = vec![format!(
        "{} — {} succeeded, {} failed",
        status_label(&delivery.status),
        delivery.success_count,
        delivery.failure_count
    )];

    let mut platforms: Vec<_> = delivery.platform_post_ids.iter().collect();
    platforms.sort();
    for (platform, post_id) in platforms {
        lines.push(format!("  {}: {}", platform.bright_green(), post_id));
    }

    if let Some(message) = &delivery.error_message {
        lines.push(format!("  {}", message.bright_red()));
    }

    if let Some(execution) = &delivery.execution_id {
        lines.push(format!("  run {}", execution.bright_black()));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn delivery(status: &str) -> DeliveryStatus {
        DeliveryStatus {
            post_id: "post-1".into(),
            queue_id: None,
            status: status.into(),
            platform_post_ids: HashMap::new(),
            error_message: None,
            execution_id: None,
            success_count: 0,
            failure_count: 0,
        }
    }

    #[test]
    fn test_partial_is_never_reported_as_published() {
        colored::control::set_override(false);

        let mut report = delivery("partial");
        report.success_count = 1;
        report.failure_count = 1;
        report.error_message = Some("twitter: rate limited".into());

        let rendered = format_delivery(&report);
        assert!(rendered.starts_with("partial"));
        assert!(!rendered.contains("published"));
        assert!(rendered.contains("1 succeeded, 1 failed"));
        assert!(rendered.contains("twitter: rate limited"));
    }

    #[test]
    fn test_published_delivery_lists_platform_post_ids() {
        colored::control::set_override(false);

        let mut report = delivery("published");
        report.success_count = 2;
        report.platform_post_ids =
            HashMap::from([("reddit".to_string(), "t3_abc".to_string())]);
        report.execution_id = Some("exec-9".into());

        let rendered = format_delivery(&report);
        assert!(rendered.contains("published — 2 succeeded, 0 failed"));
        assert!(rendered.contains("reddit: t3_abc"));
        assert!(rendered.contains("run exec-9"));
    }

    #[test]
    fn test_unknown_status_passes_through() {
        colored::control::set_override(false);
        assert_eq!(status_label("retrying"), "retrying");
    }
}
