//! Human-readable times for the panels. All absolute times are UTC.

use chrono::{DateTime, Utc};
use foundation::time::EpochMillis;

/// `Nov 14, 2023 22:13:20`.
pub fn event_time(time: EpochMillis) -> String {
    match DateTime::<Utc>::from_timestamp_millis(time.0) {
        Some(t) => t.format("%b %d, %Y %H:%M:%S").to_string(),
        None => "Unknown time".to_string(),
    }
}

/// `HH:MM:SS` of a fetch, for the info panel header.
pub fn clock_time(at: DateTime<Utc>) -> String {
    at.format("%H:%M:%S").to_string()
}

/// Age of an event: minutes under an hour, hours under a day, then days.
pub fn time_ago(time: EpochMillis, now: DateTime<Utc>) -> String {
    let diff_ms = time.elapsed_until(EpochMillis(now.timestamp_millis()));
    let minutes = diff_ms / 60_000;
    let hours = diff_ms / 3_600_000;
    let days = diff_ms / 86_400_000;
    if minutes < 60 {
        format!("{minutes} min ago")
    } else if hours < 24 {
        format!("{hours} hours ago")
    } else {
        format!("{days} days ago")
    }
}

/// Age of the last successful fetch, or `Never`.
pub fn last_updated(fetched_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(at) = fetched_at else {
        return "Never".to_string();
    };
    let secs = (now - at).num_seconds().max(0);
    if secs < 60 {
        format!("{secs}s ago")
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else {
        format!("{}h ago", secs / 3600)
    }
}

#[cfg(test)]
mod tests {
    use super::{event_time, last_updated, time_ago};
    use chrono::{Duration, TimeZone, Utc};
    use foundation::time::EpochMillis;

    #[test]
    fn formats_absolute_time_in_utc() {
        assert_eq!(event_time(EpochMillis(1_700_000_000_000)), "Nov 14, 2023 22:13:20");
        assert_eq!(event_time(EpochMillis(0)), "Jan 01, 1970 00:00:00");
    }

    #[test]
    fn relative_event_age() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let at = |d: Duration| EpochMillis((now - d).timestamp_millis());
        assert_eq!(time_ago(at(Duration::seconds(30)), now), "0 min ago");
        assert_eq!(time_ago(at(Duration::minutes(59)), now), "59 min ago");
        assert_eq!(time_ago(at(Duration::minutes(60)), now), "1 hours ago");
        assert_eq!(time_ago(at(Duration::hours(23)), now), "23 hours ago");
        assert_eq!(time_ago(at(Duration::days(3)), now), "3 days ago");
        assert_eq!(time_ago(at(Duration::minutes(-5)), now), "0 min ago");
    }

    #[test]
    fn last_updated_buckets() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert_eq!(last_updated(None, now), "Never");
        assert_eq!(last_updated(Some(now - Duration::seconds(42)), now), "42s ago");
        assert_eq!(last_updated(Some(now - Duration::seconds(150)), now), "2m ago");
        assert_eq!(last_updated(Some(now - Duration::hours(5)), now), "5h ago");
    }
}
