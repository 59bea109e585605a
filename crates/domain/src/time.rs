//! Time, calendar-date and gestation helpers.

use chrono::{DateTime, Days, NaiveDate, Utc};

/// UTC timestamp used for `created_at`, `removed_at`, and similar audit fields.
pub type Timestamp = DateTime<Utc>;

/// Calendar date used for mating, pregnancy, and birth dates.
pub type Date = NaiveDate;

/// Days from mating to expected birth.
pub const GESTATION_DAYS: u64 = 31;

/// A pregnant doe is "due" this many days before her expected birth date.
pub const DUE_WINDOW_DAYS: u64 = 7;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Return the current UTC calendar date.
#[must_use]
pub fn today() -> Date {
    Utc::now().date_naive()
}

/// Parse a `YYYY-MM-DD` date, ignoring surrounding whitespace.
#[must_use]
pub fn parse_date(raw: &str) -> Option<Date> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Expected birth date for a gestation starting on `start`.
#[must_use]
pub fn gestation_end(start: Date) -> Date {
    start
        .checked_add_days(Days::new(GESTATION_DAYS))
        .unwrap_or(NaiveDate::MAX)
}

/// Mating date implied by a birth on `birth`.
#[must_use]
pub fn gestation_start(birth: Date) -> Date {
    birth
        .checked_sub_days(Days::new(GESTATION_DAYS))
        .unwrap_or(NaiveDate::MIN)
}
