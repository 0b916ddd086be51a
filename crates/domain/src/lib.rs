mod context_evaluator;
mod context_settings;
mod cron_window;
pub mod date;
mod delivery;
mod freebusy;
mod job_key;
mod notification;
mod occurrence;
mod reminder;
mod retry;
mod shared;
mod smart_snooze;
mod user;

pub use context_evaluator::{
    evaluate_reminder_context, ContextDecision, EvaluationInput, SkipReason, SnoozeReason,
};
pub use context_settings::{
    parse_context_settings, CalendarBusySettings, ContextSettings, TimeWindowSettings,
};
pub use cron_window::{
    build_cron_window, is_job_due, CronWindow, DEFAULT_GRACE_MINUTES, DEFAULT_LOOKAHEAD_MINUTES,
};
pub use delivery::{
    DeliveryChannel, DeliveryLogEntry, DeliveryReservation, DeliveryStatus, FcmToken,
    PushSubscription, RESERVATION_LEASE_MINUTES,
};
pub use freebusy::{
    compute_postpone_until, find_busy_interval_at, is_cache_fresh, normalize_busy_intervals,
    BusyInterval, FreeBusyCacheEntry, RawBusyInterval, FREEBUSY_CACHE_TTL_MILLIS,
    FREEBUSY_COVERAGE_MILLIS, POSTPONE_BUFFER_MILLIS,
};
pub use job_key::{
    build_notification_job_key, job_key_to_notification_id, NotificationJob, OCCURRENCE_ENTITY,
};
pub use notification::{NotificationContent, NotificationPayload};
pub use occurrence::{Occurrence, OccurrenceStatus};
pub use reminder::Reminder;
pub use retry::{
    get_next_retry_at, get_retry_delay_minutes, should_retry, RetryState, MAX_RETRIES,
    RETRY_BACKOFF_MINUTES,
};
pub use shared::entity::{Entity, InvalidIDError, ID};
pub use smart_snooze::{
    get_smart_snooze_options, is_medication_category, SnoozeOption, SnoozeOptionsInput,
    SnoozeTarget, MAX_SNOOZE_OPTIONS,
};
pub use user::{CalendarConnection, User};
