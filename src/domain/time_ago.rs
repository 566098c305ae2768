use time::OffsetDateTime;

const SECONDS_PER_HOUR: i64 = 60 * 60;

pub fn format_time_ago(timestamp: OffsetDateTime) -> String {
    format_time_ago_at(timestamp, OffsetDateTime::now_utc())
}

/// Coarse relative age of `timestamp` as seen at `now`. Timestamps in the
/// future read as "Just now".
pub fn format_time_ago_at(timestamp: OffsetDateTime, now: OffsetDateTime) -> String {
    let hours = (now - timestamp).whole_seconds().div_euclid(SECONDS_PER_HOUR);

    match hours {
        h if h < 1 => "Just now".to_string(),
        1 => "1 hour ago".to_string(),
        h if h < 24 => format!("{} hours ago", h),
        h => match h / 24 {
            1 => "1 day ago".to_string(),
            days => format!("{} days ago", days),
        },
    }
}
