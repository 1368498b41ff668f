use crate::api::errors::ApiError;
use chrono::{DateTime, Datelike, Duration, Local, NaiveDateTime, TimeZone, Utc};
use regex::Regex;

/// Parses a schedule expression and returns the publish instant in UTC.
///
/// Supports mixed offset formats, counted forward from now:
/// - "2h" -> in 2 hours
/// - "1d12h30m" -> in 1 day, 12 hours, and 30 minutes
/// - "1w" -> in 1 week
///
/// Named expressions (local time):
/// - "tonight" -> 20:00 today, or 20:00 tomorrow if that already passed
/// - "tomorrow" -> 09:00 tomorrow
/// - "tomorrow-evening" -> 19:00 tomorrow
/// - "next-week" -> 09:00 on the coming Monday
///
/// Absolute instants:
/// - "2030-09-01T09:00" or "2030-09-01 09:00" (local time)
/// - full RFC3339, e.g. "2030-09-01T09:00:00Z"
///
/// Absolute instants in the past are rejected; a post cannot be scheduled
/// backwards.
pub fn parse_schedule(expr: &str) -> Result<DateTime<Utc>, ApiError> {
    // Handle named expressions first
    match expr {
        "tonight" => {
            let now = Local::now();
            let tonight = now.date_naive().and_hms_opt(20, 0, 0).unwrap();
            let mut instant = local_to_utc(tonight)?;
            if instant <= Utc::now() {
                instant += Duration::days(1);
            }
            return Ok(instant);
        }
        "tomorrow" => {
            let now = Local::now() + Duration::days(1);
            let morning = now.date_naive().and_hms_opt(9, 0, 0).unwrap();
            return local_to_utc(morning);
        }
        "tomorrow-evening" => {
            let now = Local::now() + Duration::days(1);
            let evening = now.date_naive().and_hms_opt(19, 0, 0).unwrap();
            return local_to_utc(evening);
        }
        "next-week" => {
            let now = Local::now();
            let days_until_monday = 7 - now.weekday().num_days_from_monday();
            let monday = now + Duration::days(days_until_monday as i64);
            let morning = monday.date_naive().and_hms_opt(9, 0, 0).unwrap();
            return local_to_utc(morning);
        }
        _ => {
            // Continue with absolute and offset parsing
        }
    }

    if let Some(instant) = parse_absolute(expr)? {
        if instant <= Utc::now() {
            return Err(ApiError::InvalidInput(format!(
                "Scheduled time {expr} is in the past"
            )));
        }
        return Ok(instant);
    }

    let regex = Regex::new(r"(\d+)([wdhm])")
        .map_err(|e| ApiError::InvalidInput(format!("Failed to compile schedule regex: {e}")))?;

    let mut total_offset = Duration::zero();
    let mut found_match = false;

    for cap in regex.captures_iter(expr) {
        found_match = true;
        let value: i64 = cap[1].parse().map_err(|_| {
            ApiError::InvalidInput(format!("Invalid number in schedule offset: {}", &cap[1]))
        })?;

        let unit = &cap[2];
        let offset = match unit {
            "w" => Duration::weeks(value),
            "d" => Duration::days(value),
            "h" => Duration::hours(value),
            "m" => Duration::minutes(value),
            _ => {
                return Err(ApiError::InvalidInput(format!(
                    "Unsupported schedule unit: {unit}"
                )))
            }
        };

        total_offset += offset;
    }

    if !found_match {
        return Err(ApiError::InvalidInput(
            "Invalid schedule format. Use offsets like '2h', '1d12h30m', '1w', named expressions: 'tonight', 'tomorrow', 'tomorrow-evening', 'next-week', or an absolute time like '2030-09-01T09:00'".to_string(),
        ));
    }

    Ok(Utc::now() + total_offset)
}

/// Formats a publish instant the way the backend expects it.
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

fn parse_absolute(expr: &str) -> Result<Option<DateTime<Utc>>, ApiError> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(expr) {
        return Ok(Some(instant.with_timezone(&Utc)));
    }

    for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(expr, format) {
            return local_to_utc(naive).map(Some);
        }
    }

    Ok(None)
}

fn local_to_utc(naive: NaiveDateTime) -> Result<DateTime<Utc>, ApiError> {
    Local
        .from_local_datetime(&naive)
        .single()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| {
            ApiError::InvalidInput(format!("Ambiguous local time: {naive}"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hours_offset() {
        let parsed = parse_schedule("2h").unwrap();
        let expected = Utc::now() + Duration::hours(2);

        // Allow for small differences in execution time
        let diff = (parsed - expected).abs();
        assert!(diff < Duration::seconds(1));
    }

    #[test]
    fn test_parse_mixed_offset() {
        let parsed = parse_schedule("1d12h30m").unwrap();
        let expected =
            Utc::now() + Duration::days(1) + Duration::hours(12) + Duration::minutes(30);

        let diff = (parsed - expected).abs();
        assert!(diff < Duration::seconds(1));
    }

    #[test]
    fn test_parse_weeks_offset() {
        let parsed = parse_schedule("2w").unwrap();
        let expected = Utc::now() + Duration::weeks(2);

        let diff = (parsed - expected).abs();
        assert!(diff < Duration::seconds(1));
    }

    #[test]
    fn test_tonight_is_always_in_the_future() {
        let parsed = parse_schedule("tonight").unwrap();
        assert!(parsed > Utc::now());

        let local = parsed.with_timezone(&Local);
        assert_eq!(local.format("%H:%M:%S").to_string(), "20:00:00");
    }

    #[test]
    fn test_tomorrow_morning() {
        let parsed = parse_schedule("tomorrow").unwrap();

        let tomorrow = Local::now() + Duration::days(1);
        let expected_naive = tomorrow.date_naive().and_hms_opt(9, 0, 0).unwrap();
        let expected = Local
            .from_local_datetime(&expected_naive)
            .single()
            .unwrap()
            .with_timezone(&Utc);

        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_tomorrow_evening() {
        let parsed = parse_schedule("tomorrow-evening").unwrap();

        let tomorrow = Local::now() + Duration::days(1);
        let expected_naive = tomorrow.date_naive().and_hms_opt(19, 0, 0).unwrap();
        let expected = Local
            .from_local_datetime(&expected_naive)
            .single()
            .unwrap()
            .with_timezone(&Utc);

        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_next_week_is_a_future_monday_morning() {
        let parsed = parse_schedule("next-week").unwrap();
        assert!(parsed > Utc::now());

        let local = parsed.with_timezone(&Local);
        assert_eq!(local.weekday().num_days_from_monday(), 0);
        assert_eq!(local.format("%H:%M:%S").to_string(), "09:00:00");
    }

    #[test]
    fn test_absolute_rfc3339_passes_through() {
        let parsed = parse_schedule("2030-09-01T09:00:00Z").unwrap();
        assert_eq!(format_instant(parsed), "2030-09-01T09:00:00Z");
    }

    #[test]
    fn test_absolute_local_time() {
        let parsed = parse_schedule("2030-09-01T09:00").unwrap();

        let expected_naive = NaiveDateTime::parse_from_str("2030-09-01T09:00", "%Y-%m-%dT%H:%M")
            .unwrap();
        let expected = Local
            .from_local_datetime(&expected_naive)
            .single()
            .unwrap()
            .with_timezone(&Utc);

        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_absolute_in_the_past_is_rejected() {
        let result = parse_schedule("2000-01-01T00:00:00Z");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("in the past"));
    }

    #[test]
    fn test_invalid_format() {
        let result = parse_schedule("whenever");
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Invalid schedule format"));
    }

    #[test]
    fn test_seconds_unit_is_not_supported() {
        let result = parse_schedule("30s");
        // The regex doesn't match 's' so it should report the generic format error
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Invalid schedule format"));
    }

    #[test]
    fn test_empty_string() {
        assert!(parse_schedule("").is_err());
    }
}
