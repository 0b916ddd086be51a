use crate::date::MINUTE_MILLIS;

/// How far back a run looks for jobs that became due while the external
/// scheduler was late
pub const DEFAULT_GRACE_MINUTES: i64 = 120;
pub const DEFAULT_LOOKAHEAD_MINUTES: i64 = 17;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CronWindow {
    pub window_start: i64,
    pub window_end: i64,
}

pub fn build_cron_window(now: i64, grace_minutes: i64, lookahead_minutes: i64) -> CronWindow {
    CronWindow {
        window_start: now - grace_minutes * MINUTE_MILLIS,
        window_end: now + lookahead_minutes * MINUTE_MILLIS,
    }
}

/// A job is due once its time has passed, as long as it is not older than
/// the start of the window. The lookahead end of the window is ignored here.
pub fn is_job_due(now: i64, window_start: i64, job_time: i64) -> bool {
    window_start <= job_time && job_time <= now
}
