use crate::{dispatch::SendDueNotificationsUseCase, shared::usecase::execute};
use actix_web::rt::time::{interval, sleep_until, Instant};
use nudge_infra::NudgeContext;
use std::time::Duration;
use tracing::info;

/// Seconds from `now` (millis) until the next whole minute, a full minute
/// when `now` is exactly on one
pub fn secs_to_next_minute(now: i64) -> u64 {
    (60 - (now / 1000).rem_euclid(60)) as u64
}

/// Runs a dispatch pass at the start of every minute. Meant for deployments
/// without an external scheduler calling the cron route.
pub fn start_dispatch_job(ctx: NudgeContext) {
    actix_web::rt::spawn(async move {
        let secs_to_next_run = secs_to_next_minute(ctx.sys.get_timestamp_millis());
        let start = Instant::now() + Duration::from_secs(secs_to_next_run);
        info!("Internal dispatch job starts in {} seconds", secs_to_next_run);

        sleep_until(start).await;
        let mut minutely_interval = interval(Duration::from_secs(60));
        loop {
            minutely_interval.tick().await;
            let context = ctx.clone();
            actix_web::rt::spawn(async move {
                // Errors are logged by `execute`
                let _ = execute(SendDueNotificationsUseCase, &context).await;
            });
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waits_for_the_next_minute() {
        assert_eq!(secs_to_next_minute(50 * 1000), 10);
        assert_eq!(secs_to_next_minute(59 * 1000), 1);
        assert_eq!(secs_to_next_minute(59 * 1000 + 999), 1);
        assert_eq!(secs_to_next_minute(60 * 1000), 60);
        assert_eq!(secs_to_next_minute(0), 60);
        // 2026-03-02T12:00:30Z
        assert_eq!(secs_to_next_minute(1_772_452_830_000), 30);
    }
}
