//! Time utility functions

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc};

/// Convert microseconds since Unix epoch to DateTime<Utc>
pub fn micros_to_datetime(micros: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_micros(micros).unwrap_or_else(|| {
        tracing::warn!(micros, "Invalid timestamp, using epoch");
        DateTime::UNIX_EPOCH
    })
}

/// First day of the month containing `d`.
pub fn month_start(d: NaiveDate) -> NaiveDate {
    d.with_day(1).unwrap_or(d)
}

/// Inclusive range covering the full calendar month before the one
/// containing `today`.
pub fn prev_month_range(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let this_start = month_start(today);
    let end = this_start.pred_opt().unwrap_or(this_start);
    (month_start(end), end)
}

/// Inclusive range covering the full calendar month after the one
/// containing `today`.
pub fn next_month_range(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = month_start(today) + Months::new(1);
    let end = (start + Months::new(1)).pred_opt().unwrap_or(start);
    (start, end)
}

/// `today` shifted backwards by `n` days, saturating at the epoch.
pub fn days_back(today: NaiveDate, n: u64) -> NaiveDate {
    today.checked_sub_days(Days::new(n)).unwrap_or(today)
}

/// `today` shifted forwards by `n` days, saturating at the far future.
pub fn days_forward(today: NaiveDate, n: u64) -> NaiveDate {
    today.checked_add_days(Days::new(n)).unwrap_or(today)
}
