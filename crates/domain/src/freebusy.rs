use crate::{
    date::{parse_timestamp, DAY_MILLIS, MINUTE_MILLIS},
    shared::entity::ID,
};
use serde::{Deserialize, Serialize};

/// How long a fetched free/busy result can be trusted
pub const FREEBUSY_CACHE_TTL_MILLIS: i64 = 10 * MINUTE_MILLIS;
/// How far past the requested instant a refresh fetches busy intervals
pub const FREEBUSY_COVERAGE_MILLIS: i64 = DAY_MILLIS;
/// Postponing past a busy interval lands this long after it ends
pub const POSTPONE_BUFFER_MILLIS: i64 = 2 * MINUTE_MILLIS;

/// Busy interval as delivered by a calendar feed, timestamps are RFC 3339 strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBusyInterval {
    pub start: String,
    pub end: String,
}

impl RawBusyInterval {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// Half open interval `[start_ts, end_ts)` during which a calendar is busy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusyInterval {
    pub start_ts: i64,
    pub end_ts: i64,
}

impl BusyInterval {
    pub fn contains(&self, at: i64) -> bool {
        self.start_ts <= at && at < self.end_ts
    }
}

/// Cached free/busy lookup result for one user covering `[time_min, time_max]`
#[derive(Debug, Clone, PartialEq)]
pub struct FreeBusyCacheEntry {
    pub user_id: ID,
    /// Sorted by `start_ts`, see `normalize_busy_intervals`
    pub busy: Vec<BusyInterval>,
    pub time_min: i64,
    pub time_max: i64,
    pub fetched_at: i64,
}

/// Parses and sorts raw busy intervals. Entries with unparsable timestamps
/// or with `end <= start` are dropped.
///
/// Overlapping intervals are kept as they are, so `find_busy_interval_at`
/// only gives exact answers for feeds that never return overlaps.
pub fn normalize_busy_intervals(raw: &[RawBusyInterval]) -> Vec<BusyInterval> {
    let mut intervals = raw
        .iter()
        .filter_map(|interval| {
            let start_ts = parse_timestamp(&interval.start)?;
            let end_ts = parse_timestamp(&interval.end)?;
            if end_ts <= start_ts {
                return None;
            }
            Some(BusyInterval { start_ts, end_ts })
        })
        .collect::<Vec<_>>();
    intervals.sort_by_key(|interval| interval.start_ts);
    intervals
}

pub fn is_cache_fresh(
    cache: &FreeBusyCacheEntry,
    window_start: i64,
    window_end: i64,
    now: i64,
    ttl_millis: i64,
) -> bool {
    now - cache.fetched_at <= ttl_millis
        && cache.time_min <= window_start
        && cache.time_max >= window_end
}

/// Binary search for the interval containing `at` in a sorted, disjoint list
pub fn find_busy_interval_at(busy: &[BusyInterval], at: i64) -> Option<&BusyInterval> {
    // Number of intervals starting at or before `at`
    let idx = busy.partition_point(|interval| interval.start_ts <= at);
    if idx == 0 {
        return None;
    }
    let candidate = &busy[idx - 1];
    if candidate.contains(at) {
        Some(candidate)
    } else {
        None
    }
}

pub fn compute_postpone_until(
    now: i64,
    snooze_minutes: i64,
    busy_interval: Option<&BusyInterval>,
) -> i64 {
    let base = now + snooze_minutes * MINUTE_MILLIS;
    match busy_interval {
        Some(interval) => std::cmp::max(base, interval.end_ts + POSTPONE_BUFFER_MILLIS),
        None => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interval(start_ts: i64, end_ts: i64) -> BusyInterval {
        BusyInterval { start_ts, end_ts }
    }

    fn cache_entry(fetched_at: i64) -> FreeBusyCacheEntry {
        FreeBusyCacheEntry {
            user_id: ID::default(),
            busy: vec![],
            time_min: 0,
            time_max: FREEBUSY_COVERAGE_MILLIS,
            fetched_at,
        }
    }

    #[test]
    fn normalizes_raw_intervals() {
        let raw = vec![
            RawBusyInterval::new("2026-01-10T12:00:00Z", "2026-01-10T13:00:00Z"),
            RawBusyInterval::new("garbage", "2026-01-10T13:00:00Z"),
            RawBusyInterval::new("2026-01-10T09:00:00Z", "2026-01-10T09:30:00Z"),
            // Empty
            RawBusyInterval::new("2026-01-10T10:00:00Z", "2026-01-10T10:00:00Z"),
            // Inverted
            RawBusyInterval::new("2026-01-10T11:00:00Z", "2026-01-10T10:00:00Z"),
        ];
        let busy = normalize_busy_intervals(&raw);
        assert_eq!(busy.len(), 2);
        assert_eq!(
            busy[0].start_ts,
            parse_timestamp("2026-01-10T09:00:00Z").unwrap()
        );
        assert_eq!(
            busy[1].start_ts,
            parse_timestamp("2026-01-10T12:00:00Z").unwrap()
        );
    }

    #[test]
    fn normalizer_does_not_merge_overlaps() {
        let raw = vec![
            RawBusyInterval::new("2026-01-10T09:00:00Z", "2026-01-10T11:00:00Z"),
            RawBusyInterval::new("2026-01-10T10:00:00Z", "2026-01-10T12:00:00Z"),
        ];
        assert_eq!(normalize_busy_intervals(&raw).len(), 2);
    }

    #[test]
    fn cache_freshness_requires_ttl_and_coverage() {
        let now = 10 * FREEBUSY_COVERAGE_MILLIS;
        let mut cache = cache_entry(now - 1000);
        cache.time_min = now;
        cache.time_max = now + FREEBUSY_COVERAGE_MILLIS;

        assert!(is_cache_fresh(
            &cache,
            now,
            now + FREEBUSY_COVERAGE_MILLIS,
            now,
            FREEBUSY_CACHE_TTL_MILLIS
        ));

        cache.fetched_at = now - FREEBUSY_CACHE_TTL_MILLIS - 1;
        assert!(!is_cache_fresh(
            &cache,
            now,
            now + FREEBUSY_COVERAGE_MILLIS,
            now,
            FREEBUSY_CACHE_TTL_MILLIS
        ));

        // Exactly at the ttl is still fresh
        cache.fetched_at = now - FREEBUSY_CACHE_TTL_MILLIS;
        assert!(is_cache_fresh(
            &cache,
            now,
            now + FREEBUSY_COVERAGE_MILLIS,
            now,
            FREEBUSY_CACHE_TTL_MILLIS
        ));

        // Fresh but not covering the requested window
        cache.fetched_at = now;
        assert!(!is_cache_fresh(
            &cache,
            now - 1,
            now + FREEBUSY_COVERAGE_MILLIS,
            now,
            FREEBUSY_CACHE_TTL_MILLIS
        ));
        assert!(!is_cache_fresh(
            &cache,
            now,
            now + FREEBUSY_COVERAGE_MILLIS + 1,
            now,
            FREEBUSY_CACHE_TTL_MILLIS
        ));
    }

    #[test]
    fn finds_containing_interval() {
        let busy = vec![interval(10, 20), interval(30, 40), interval(50, 60)];

        assert_eq!(find_busy_interval_at(&busy, 10), Some(&busy[0]));
        assert_eq!(find_busy_interval_at(&busy, 19), Some(&busy[0]));
        assert_eq!(find_busy_interval_at(&busy, 35), Some(&busy[1]));
        assert_eq!(find_busy_interval_at(&busy, 59), Some(&busy[2]));

        // End is exclusive
        assert_eq!(find_busy_interval_at(&busy, 20), None);
        assert_eq!(find_busy_interval_at(&busy, 60), None);
        assert_eq!(find_busy_interval_at(&busy, 9), None);
        assert_eq!(find_busy_interval_at(&busy, 45), None);
        assert_eq!(find_busy_interval_at(&[], 45), None);
    }

    #[test]
    fn postpones_past_busy_interval() {
        let now = 1_000_000;
        let busy = interval(now - MINUTE_MILLIS, now + 20 * MINUTE_MILLIS);
        assert_eq!(
            compute_postpone_until(now, 15, Some(&busy)),
            now + 22 * MINUTE_MILLIS
        );

        // Snooze outlasts the busy interval
        assert_eq!(
            compute_postpone_until(now, 30, Some(&busy)),
            now + 30 * MINUTE_MILLIS
        );
        assert_eq!(compute_postpone_until(now, 15, None), now + 15 * MINUTE_MILLIS);
    }
}
