//! The `DD-MM-YYYY` date codec shared with the order backend, and the
//! relative-time wording used on booking cards.

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

/// Backend date format. The backend matches dates as strings, so this must
/// be reproduced exactly (zero padded, dash separated).
pub const ORDER_DATE_FORMAT: &str = "%d-%m-%Y";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid order date '{input}': expected DD-MM-YYYY")]
pub struct DateParseError {
    pub input: String,
}

pub fn format_order_date(date: NaiveDate) -> String {
    date.format(ORDER_DATE_FORMAT).to_string()
}

pub fn parse_order_date(input: &str) -> Result<NaiveDate, DateParseError> {
    NaiveDate::parse_from_str(input.trim(), ORDER_DATE_FORMAT).map_err(|_| DateParseError {
        input: input.to_string(),
    })
}

/// Humanized distance between `then` and `now`, e.g. "5 minutes ago".
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now.signed_duration_since(then).num_seconds();
    let phrase = distance_phrase(delta.unsigned_abs());
    if delta < 0 {
        format!("in {phrase}")
    } else {
        format!("{phrase} ago")
    }
}

fn distance_phrase(seconds: u64) -> String {
    let rounded = |unit: u64| (seconds + unit / 2) / unit;
    match seconds {
        0..=44 => "a few seconds".to_string(),
        45..=89 => "a minute".to_string(),
        s if s < 45 * 60 => format!("{} minutes", rounded(60)),
        s if s < 90 * 60 => "an hour".to_string(),
        s if s < 22 * 3600 => format!("{} hours", rounded(3600)),
        s if s < 36 * 3600 => "a day".to_string(),
        s if s < 26 * 86_400 => format!("{} days", rounded(86_400)),
        s if s < 45 * 86_400 => "a month".to_string(),
        s if s < 320 * 86_400 => format!("{} months", rounded(30 * 86_400)),
        s if s < 548 * 86_400 => "a year".to_string(),
        _ => format!("{} years", rounded(365 * 86_400)),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn formats_with_zero_padding() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 5).expect("date");
        assert_eq!(format_order_date(date), "05-06-2024");
    }

    #[test]
    fn parses_backend_format_and_rejects_iso() {
        let date = parse_order_date("07-06-2024").expect("parse");
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 6, 7).expect("date"));

        let err = parse_order_date("2024-06-07").expect_err("iso is not accepted");
        assert_eq!(err.input, "2024-06-07");
    }

    #[test]
    fn relative_time_wording() {
        let now: DateTime<Utc> = "2024-06-05T12:00:00Z".parse().expect("timestamp");
        assert_eq!(relative_time(now - Duration::seconds(10), now), "a few seconds ago");
        assert_eq!(relative_time(now - Duration::minutes(5), now), "5 minutes ago");
        assert_eq!(relative_time(now - Duration::minutes(70), now), "an hour ago");
        assert_eq!(relative_time(now - Duration::hours(3), now), "3 hours ago");
        assert_eq!(relative_time(now - Duration::days(2), now), "2 days ago");
        assert_eq!(relative_time(now - Duration::days(400), now), "a year ago");
        assert_eq!(relative_time(now + Duration::hours(2), now), "in 2 hours");
    }
}
