use chrono::prelude::*;
use chrono_tz::Tz;

pub const MINUTE_MILLIS: i64 = 60 * 1000;
pub const HOUR_MILLIS: i64 = 60 * MINUTE_MILLIS;
pub const DAY_MILLIS: i64 = 24 * HOUR_MILLIS;

/// Wall clock time in `tz` for a UTC timestamp in millis
pub fn to_local(timestamp_millis: i64, tz: &Tz) -> Option<DateTime<Tz>> {
    tz.timestamp_millis_opt(timestamp_millis).single()
}

/// The instant at which the wall clock in `tz` shows `hour`:00 on `date`.
/// Hours skipped by a DST transition resolve to the next hour that exists.
pub fn local_hour_on(date: NaiveDate, hour: u32, tz: &Tz) -> Option<DateTime<Tz>> {
    (hour..24).find_map(|h| {
        let naive = date.and_hms_opt(h, 0, 0)?;
        tz.from_local_datetime(&naive).earliest()
    })
}

/// RFC 3339 UTC representation with millisecond precision, e.g. `2026-01-10T10:00:00.000Z`
pub fn format_timestamp(timestamp_millis: i64) -> String {
    match Utc.timestamp_millis_opt(timestamp_millis).single() {
        Some(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => timestamp_millis.to_string(),
    }
}

pub fn parse_timestamp(datestr: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(datestr.trim())
        .ok()
        .map(|dt| dt.timestamp_millis())
}

/// Weekday in the 0 = Sunday .. 6 = Saturday numbering used by `ContextSettings`
pub fn weekday_index(date: &DateTime<Tz>) -> u32 {
    date.weekday().num_days_from_sunday()
}
