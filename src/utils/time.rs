use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// This is the standard way of converting a date to a string in waterlog. It matches the keys of
/// the `history` object in the persisted document.
pub fn date_to_record_name(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Combines a date with an hour of that day.
pub fn at_hour(date: NaiveDate, hour: u32) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN))
}

/// Fractional number of seconds between two moments, to the microsecond. Negative if `to` is
/// before `from`.
pub fn seconds_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    let delta: Duration = to - from;
    // Microseconds only overflow past ~292 000 years.
    delta
        .num_microseconds()
        .map(|v| v as f64 / 1e6)
        .unwrap_or_else(|| delta.num_milliseconds() as f64 / 1e3)
}
