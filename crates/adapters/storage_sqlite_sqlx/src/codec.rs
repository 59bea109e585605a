//! Column encodings shared by the repositories.
//!
//! Dates are stored as `YYYY-MM-DD` text, timestamps as fixed-width RFC 3339
//! text (so `ORDER BY` on the column is chronological), and small collections
//! as JSON text.

use chrono::SecondsFormat;
use serde::de::DeserializeOwned;

use warren_domain::time::{Date, Timestamp, parse_date};

pub(crate) fn encode_date(date: Date) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn decode_date(raw: &str) -> Result<Date, sqlx::Error> {
    parse_date(raw).ok_or_else(|| sqlx::Error::Decode(format!("invalid date {raw:?}").into()))
}

pub(crate) fn decode_optional_date(raw: Option<String>) -> Result<Option<Date>, sqlx::Error> {
    raw.as_deref().map(decode_date).transpose()
}

pub(crate) fn encode_timestamp(ts: Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode_timestamp(raw: &str) -> Result<Timestamp, sqlx::Error> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.to_utc())
        .map_err(|err| sqlx::Error::Decode(Box::new(err)))
}

pub(crate) fn decode_json<T: DeserializeOwned>(raw: &str) -> Result<T, sqlx::Error> {
    serde_json::from_str(raw).map_err(|err| sqlx::Error::Decode(Box::new(err)))
}

/// Decode a text column through the type's `FromStr`.
pub(crate) fn decode_parsed<T>(raw: &str) -> Result<T, sqlx::Error>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse::<T>().map_err(|err| sqlx::Error::Decode(Box::new(err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn should_store_dates_as_iso_text() {
        let date = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        assert_eq!(encode_date(date), "2025-02-01");
        assert_eq!(decode_date("2025-02-01").unwrap(), date);
    }

    #[test]
    fn should_encode_timestamps_with_fixed_width() {
        let whole = "2025-01-01T08:00:00Z".parse::<Timestamp>().unwrap();
        let fraction = "2025-01-01T08:00:00.5Z".parse::<Timestamp>().unwrap();
        assert_eq!(encode_timestamp(whole), "2025-01-01T08:00:00.000000Z");
        assert!(encode_timestamp(whole) < encode_timestamp(fraction));
        assert_eq!(decode_timestamp(&encode_timestamp(fraction)).unwrap(), fraction);
    }

    #[test]
    fn should_report_decode_error_for_garbage() {
        assert!(matches!(decode_date("soon"), Err(sqlx::Error::Decode(_))));
        assert!(matches!(
            decode_timestamp("yesterday"),
            Err(sqlx::Error::Decode(_))
        ));
        assert!(matches!(
            decode_json::<Vec<String>>("{"),
            Err(sqlx::Error::Decode(_))
        ));
    }

    #[test]
    fn should_keep_missing_optional_date() {
        assert_eq!(decode_optional_date(None).unwrap(), None);
    }
}
