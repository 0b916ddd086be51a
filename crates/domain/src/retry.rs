use crate::date::MINUTE_MILLIS;

pub const RETRY_BACKOFF_MINUTES: [i64; 5] = [1, 5, 15, 60, 180];
pub const MAX_RETRIES: i64 = 5;

pub fn should_retry(retry_count: i64, max_retries: i64) -> bool {
    retry_count < max_retries
}

pub fn get_retry_delay_minutes(retry_count: i64) -> i64 {
    if retry_count <= 0 {
        return RETRY_BACKOFF_MINUTES[0];
    }
    let idx = std::cmp::min(retry_count - 1, RETRY_BACKOFF_MINUTES.len() as i64 - 1);
    RETRY_BACKOFF_MINUTES[idx as usize]
}

pub fn get_next_retry_at(now: i64, retry_count: i64) -> i64 {
    now + get_retry_delay_minutes(retry_count) * MINUTE_MILLIS
}

/// Retry bookkeeping for one delivery channel of one occurrence.
///
/// Nothing gates resends on `next_retry_at`, a failed delivery is simply
/// attempted again by the next dispatch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    pub retry_count: i64,
    /// `None` once the retry budget is spent
    pub next_retry_at: Option<i64>,
}

impl RetryState {
    /// State after one more failed attempt on top of `previous_retry_count`
    pub fn after_failure(previous_retry_count: i64, now: i64) -> Self {
        let retry_count = previous_retry_count + 1;
        let next_retry_at = if should_retry(retry_count, MAX_RETRIES) {
            Some(get_next_retry_at(now, retry_count))
        } else {
            None
        };
        Self {
            retry_count,
            next_retry_at,
        }
    }
}
