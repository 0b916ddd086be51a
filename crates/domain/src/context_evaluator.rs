use crate::{
    context_settings::{ContextSettings, TimeWindowSettings},
    date::{weekday_index, MINUTE_MILLIS},
};
use chrono::prelude::*;
use chrono_tz::Tz;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    OutsideDayWindow,
    OutsideTimeWindow,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OutsideDayWindow => "outside_day_window",
            Self::OutsideTimeWindow => "outside_time_window",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnoozeReason {
    CalendarBusy,
}

impl SnoozeReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CalendarBusy => "calendar_busy",
        }
    }
}

/// What to do with a due occurrence right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextDecision {
    SendNow,
    /// Leave the occurrence untouched, it is evaluated again on the next pass
    SkipForNow { reason: SkipReason },
    /// Move the occurrence to `new_scheduled_at` without notifying
    AutoSnooze {
        new_scheduled_at: i64,
        reason: SnoozeReason,
    },
}

pub struct EvaluationInput<'a> {
    /// Evaluation instant expressed in the zone the time window applies to
    pub now: DateTime<Tz>,
    /// Scheduled instant of the occurrence. Not part of the decision, the
    /// dispatcher logs it next to skips and snoozes.
    pub reminder_due_at: i64,
    pub settings: &'a ContextSettings,
    pub is_calendar_busy: bool,
}

pub fn evaluate_reminder_context(input: &EvaluationInput) -> ContextDecision {
    let settings = input.settings;

    if settings.time_window.enabled {
        if let Some(reason) = time_window_violation(&settings.time_window, &input.now) {
            return ContextDecision::SkipForNow { reason };
        }
    }

    if settings.calendar_busy.enabled && input.is_calendar_busy {
        return ContextDecision::AutoSnooze {
            new_scheduled_at: input.now.timestamp_millis()
                + settings.calendar_busy.snooze_minutes * MINUTE_MILLIS,
            reason: SnoozeReason::CalendarBusy,
        };
    }

    ContextDecision::SendNow
}

fn time_window_violation(window: &TimeWindowSettings, now: &DateTime<Tz>) -> Option<SkipReason> {
    let day = weekday_index(now);
    if !window.days_of_week.is_empty() && !window.days_of_week.contains(&day) {
        return Some(SkipReason::OutsideDayWindow);
    }
    if !hour_in_window(now.hour(), window.start_hour, window.end_hour) {
        return Some(SkipReason::OutsideTimeWindow);
    }
    None
}

/// `[start, end)` on the local clock. A window with `start >= end` admits no hour.
fn hour_in_window(hour: u32, start: u32, end: u32) -> bool {
    hour >= start && hour < end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context_settings::CalendarBusySettings;

    fn at(tz: Tz, y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Tz> {
        tz.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn window(start_hour: u32, end_hour: u32, days_of_week: Vec<u32>) -> ContextSettings {
        ContextSettings {
            time_window: TimeWindowSettings {
                enabled: true,
                start_hour,
                end_hour,
                days_of_week,
            },
            ..Default::default()
        }
    }

    fn evaluate(now: DateTime<Tz>, settings: &ContextSettings, busy: bool) -> ContextDecision {
        evaluate_reminder_context(&EvaluationInput {
            now,
            reminder_due_at: now.timestamp_millis(),
            settings,
            is_calendar_busy: busy,
        })
    }

    #[test]
    fn sends_when_nothing_is_configured() {
        let settings = ContextSettings::default();
        let now = at(Tz::UTC, 2026, 1, 10, 3, 0);
        assert_eq!(evaluate(now, &settings, true), ContextDecision::SendNow);
    }

    #[test]
    fn skips_outside_hours() {
        let settings = window(8, 21, vec![]);
        assert_eq!(
            evaluate(at(Tz::UTC, 2026, 1, 10, 7, 59), &settings, false),
            ContextDecision::SkipForNow {
                reason: SkipReason::OutsideTimeWindow
            }
        );
        assert_eq!(
            evaluate(at(Tz::UTC, 2026, 1, 10, 21, 0), &settings, false),
            ContextDecision::SkipForNow {
                reason: SkipReason::OutsideTimeWindow
            }
        );
        assert_eq!(
            evaluate(at(Tz::UTC, 2026, 1, 10, 8, 0), &settings, false),
            ContextDecision::SendNow
        );
    }

    #[test]
    fn skips_on_excluded_days_before_checking_hours() {
        // 2026-01-10 is a Saturday
        let settings = window(8, 21, vec![1, 2, 3, 4, 5]);
        assert_eq!(
            evaluate(at(Tz::UTC, 2026, 1, 10, 3, 0), &settings, false),
            ContextDecision::SkipForNow {
                reason: SkipReason::OutsideDayWindow
            }
        );
        assert_eq!(
            evaluate(at(Tz::UTC, 2026, 1, 12, 10, 0), &settings, false),
            ContextDecision::SendNow
        );
    }

    #[test]
    fn uses_local_time_of_now() {
        let settings = window(8, 21, vec![]);
        // 07:30 UTC is 08:30 in Oslo during winter
        let oslo = at(Tz::UTC, 2026, 1, 10, 7, 30).with_timezone(&chrono_tz::Europe::Oslo);
        assert_eq!(evaluate(oslo, &settings, false), ContextDecision::SendNow);
    }

    #[test]
    fn does_not_wrap_windows_past_midnight() {
        let settings = window(22, 6, vec![]);
        for hour in [23, 2, 5, 6, 12] {
            assert_eq!(
                evaluate(at(Tz::UTC, 2026, 1, 10, hour, 0), &settings, false),
                ContextDecision::SkipForNow {
                    reason: SkipReason::OutsideTimeWindow
                }
            );
        }

        let empty = window(9, 9, vec![]);
        assert!(matches!(
            evaluate(at(Tz::UTC, 2026, 1, 10, 9, 0), &empty, false),
            ContextDecision::SkipForNow { .. }
        ));
    }

    #[test]
    fn auto_snoozes_when_calendar_is_busy() {
        let settings = ContextSettings {
            calendar_busy: CalendarBusySettings {
                enabled: true,
                snooze_minutes: 15,
            },
            ..Default::default()
        };
        let now = at(Tz::UTC, 2026, 1, 10, 10, 0);
        assert_eq!(
            evaluate(now, &settings, true),
            ContextDecision::AutoSnooze {
                new_scheduled_at: now.timestamp_millis() + 15 * MINUTE_MILLIS,
                reason: SnoozeReason::CalendarBusy,
            }
        );
        assert_eq!(evaluate(now, &settings, false), ContextDecision::SendNow);
    }

    #[test]
    fn time_window_wins_over_calendar() {
        let mut settings = window(8, 21, vec![]);
        settings.calendar_busy.enabled = true;
        assert_eq!(
            evaluate(at(Tz::UTC, 2026, 1, 10, 22, 0), &settings, true),
            ContextDecision::SkipForNow {
                reason: SkipReason::OutsideTimeWindow
            }
        );
        assert!(matches!(
            evaluate(at(Tz::UTC, 2026, 1, 10, 12, 0), &settings, true),
            ContextDecision::AutoSnooze { .. }
        ));
    }
}
