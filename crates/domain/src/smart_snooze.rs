use crate::date::{local_hour_on, to_local, DAY_MILLIS, HOUR_MILLIS};
use chrono::{prelude::*, Duration};
use chrono_tz::Tz;

pub const MAX_SNOOZE_OPTIONS: usize = 8;

const MORNING_HOUR: u32 = 9;
const EVENING_HOUR: u32 = 20;
const WEEKEND_HOUR: u32 = 10;

const MEDICATION_KEYWORDS: [&str; 11] = [
    "medication",
    "medicine",
    "meds",
    "pill",
    "dose",
    "dosage",
    "prescription",
    "vitamin",
    "supplement",
    "insulin",
    "inhaler",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnoozeTarget {
    At(i64),
    /// The caller has to ask the user for a time
    Custom,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnoozeOption {
    pub id: &'static str,
    pub label: &'static str,
    pub target: SnoozeTarget,
}

impl SnoozeOption {
    fn at(id: &'static str, label: &'static str, target: i64) -> Self {
        Self {
            id,
            label,
            target: SnoozeTarget::At(target),
        }
    }

    fn custom() -> Self {
        Self {
            id: "custom",
            label: "Pick a time",
            target: SnoozeTarget::Custom,
        }
    }
}

pub struct SnoozeOptionsInput<'a> {
    pub now: DateTime<Tz>,
    pub category: Option<&'a str>,
    pub due_at: Option<i64>,
}

pub fn is_medication_category(category: &str) -> bool {
    let category = category.to_lowercase();
    MEDICATION_KEYWORDS
        .iter()
        .any(|keyword| category.contains(keyword))
}

/// Ordered snooze suggestions. Every computed target lies strictly after `now`
/// and the list always ends with `custom`. Two entries may share a target,
/// late in the evening `later-today` resolves to tomorrow morning.
pub fn get_smart_snooze_options(input: &SnoozeOptionsInput) -> Vec<SnoozeOption> {
    let now = &input.now;
    let now_ts = now.timestamp_millis();
    let tz = now.timezone();
    let today = now.date_naive();
    let tomorrow = today + Duration::days(1);

    let mut candidates = Vec::new();

    if input.category.map(is_medication_category).unwrap_or(false) {
        candidates.push(Some(SnoozeOption::at(
            "in-1-hour",
            "In 1 hour",
            now_ts + HOUR_MILLIS,
        )));
        candidates.push(Some(SnoozeOption::at(
            "in-2-hours",
            "In 2 hours",
            now_ts + 2 * HOUR_MILLIS,
        )));
    }

    let later_today = local_ts(today, EVENING_HOUR, &tz)
        .filter(|ts| *ts > now_ts)
        .or_else(|| local_ts(tomorrow, MORNING_HOUR, &tz));
    candidates.push(later_today.map(|ts| SnoozeOption::at("later-today", "Later today", ts)));

    candidates.push(
        local_ts(tomorrow, MORNING_HOUR, &tz)
            .map(|ts| SnoozeOption::at("tomorrow", "Tomorrow morning", ts)),
    );

    candidates.push(
        this_weekend(now_ts, today, &tz)
            .map(|ts| SnoozeOption::at("this-weekend", "This weekend", ts)),
    );

    let days_to_monday = match today.weekday().num_days_from_monday() {
        0 => 7,
        n => 7 - n,
    };
    candidates.push(
        local_ts(
            today + Duration::days(days_to_monday as i64),
            MORNING_HOUR,
            &tz,
        )
        .map(|ts| SnoozeOption::at("next-week", "Next week", ts)),
    );

    if let Some(due_at) = input.due_at {
        candidates.push(
            before_due(now_ts, due_at, 3, &tz)
                .map(|ts| SnoozeOption::at("before-due-3-days", "3 days before due", ts)),
        );
        candidates.push(
            before_due(now_ts, due_at, 1, &tz)
                .map(|ts| SnoozeOption::at("before-due-1-day", "1 day before due", ts)),
        );
    }

    let mut options: Vec<SnoozeOption> = Vec::with_capacity(MAX_SNOOZE_OPTIONS);
    for option in candidates.into_iter().flatten() {
        if options.len() == MAX_SNOOZE_OPTIONS - 1 {
            break;
        }
        if matches!(option.target, SnoozeTarget::At(ts) if ts > now_ts) {
            options.push(option);
        }
    }
    options.push(SnoozeOption::custom());
    options
}

fn local_ts(date: NaiveDate, hour: u32, tz: &Tz) -> Option<i64> {
    local_hour_on(date, hour, tz).map(|dt| dt.timestamp_millis())
}

/// Saturday 10:00, or today / tomorrow when already in the weekend
fn this_weekend(now_ts: i64, today: NaiveDate, tz: &Tz) -> Option<i64> {
    let offsets = match today.weekday() {
        Weekday::Sat => vec![0, 1, 7],
        Weekday::Sun => vec![0, 6],
        weekday => vec![6 - weekday.num_days_from_sunday() as i64],
    };
    offsets
        .into_iter()
        .filter_map(|offset| local_ts(today + Duration::days(offset), WEEKEND_HOUR, tz))
        .find(|ts| *ts > now_ts)
}

/// 09:00 local time `days` days before `due_at`, offered when the due date
/// is at least that far ahead
fn before_due(now_ts: i64, due_at: i64, days: i64, tz: &Tz) -> Option<i64> {
    if due_at - now_ts < days * DAY_MILLIS {
        return None;
    }
    let day = to_local(due_at - days * DAY_MILLIS, tz)?.date_naive();
    local_ts(day, MORNING_HOUR, tz).filter(|ts| *ts > now_ts)
}
