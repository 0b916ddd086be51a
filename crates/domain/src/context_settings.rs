use chrono_tz::Tz;
use serde_json::{Map, Value};

pub const DEFAULT_START_HOUR: u32 = 8;
pub const DEFAULT_END_HOUR: u32 = 21;
pub const DEFAULT_SNOOZE_MINUTES: i64 = 15;
const MAX_SNOOZE_MINUTES: i64 = 24 * 60;

/// Hours of the day and days of the week during which a reminder may notify
#[derive(Debug, Clone, PartialEq)]
pub struct TimeWindowSettings {
    pub enabled: bool,
    /// Inclusive, 0 - 23
    pub start_hour: u32,
    /// Exclusive, 0 - 24
    pub end_hour: u32,
    /// 0 = Sunday .. 6 = Saturday. Empty means every day.
    pub days_of_week: Vec<u32>,
}

impl Default for TimeWindowSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            start_hour: DEFAULT_START_HOUR,
            end_hour: DEFAULT_END_HOUR,
            days_of_week: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarBusySettings {
    pub enabled: bool,
    pub snooze_minutes: i64,
}

impl Default for CalendarBusySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            snooze_minutes: DEFAULT_SNOOZE_MINUTES,
        }
    }
}

/// Per reminder rules deciding whether and when a notification may fire
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContextSettings {
    pub time_window: TimeWindowSettings,
    pub calendar_busy: CalendarBusySettings,
    pub category: Option<String>,
    /// Zone the time window is evaluated in
    pub timezone: Option<Tz>,
}

impl ContextSettings {
    /// Parses settings stored as untyped json. Never fails: anything missing,
    /// mistyped or out of range falls back to its default.
    pub fn parse(raw: &Value) -> Self {
        let root = match as_object(raw) {
            Some(root) => root,
            None => return Self::default(),
        };

        let time_window = field(&root, "timeWindow", "time_window")
            .and_then(as_object)
            .map(|obj| parse_time_window(&obj))
            .unwrap_or_default();
        let calendar_busy = field(&root, "calendarBusy", "calendar_busy")
            .and_then(as_object)
            .map(|obj| parse_calendar_busy(&obj))
            .unwrap_or_default();
        let category = field(&root, "category", "category")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|category| !category.is_empty())
            .map(String::from);
        let timezone = field(&root, "timezone", "time_zone")
            .and_then(Value::as_str)
            .and_then(|tz| tz.trim().parse::<Tz>().ok());

        Self {
            time_window,
            calendar_busy,
            category,
            timezone,
        }
    }
}

pub fn parse_context_settings(raw: Option<&Value>) -> ContextSettings {
    raw.map(ContextSettings::parse).unwrap_or_default()
}

fn parse_time_window(obj: &Map<String, Value>) -> TimeWindowSettings {
    let defaults = TimeWindowSettings::default();
    let days_of_week = match field(obj, "daysOfWeek", "days_of_week").and_then(Value::as_array) {
        Some(days) => {
            let mut days = days
                .iter()
                .filter_map(|day| as_integer(day))
                .filter(|day| (0..=6).contains(day))
                .map(|day| day as u32)
                .collect::<Vec<_>>();
            days.sort_unstable();
            days.dedup();
            days
        }
        None => defaults.days_of_week,
    };

    TimeWindowSettings {
        enabled: field(obj, "enabled", "enabled")
            .and_then(as_bool)
            .unwrap_or(defaults.enabled),
        start_hour: field(obj, "startHour", "start_hour")
            .and_then(as_integer)
            .filter(|hour| (0..=23).contains(hour))
            .map(|hour| hour as u32)
            .unwrap_or(defaults.start_hour),
        end_hour: field(obj, "endHour", "end_hour")
            .and_then(as_integer)
            .filter(|hour| (0..=24).contains(hour))
            .map(|hour| hour as u32)
            .unwrap_or(defaults.end_hour),
        days_of_week,
    }
}

fn parse_calendar_busy(obj: &Map<String, Value>) -> CalendarBusySettings {
    let defaults = CalendarBusySettings::default();
    CalendarBusySettings {
        enabled: field(obj, "enabled", "enabled")
            .and_then(as_bool)
            .unwrap_or(defaults.enabled),
        snooze_minutes: field(obj, "snoozeMinutes", "snooze_minutes")
            .and_then(as_integer)
            .filter(|minutes| *minutes > 0 && *minutes <= MAX_SNOOZE_MINUTES)
            .unwrap_or(defaults.snooze_minutes),
    }
}

/// Objects, or strings holding a json encoded object
fn as_object(value: &Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(obj) => Some(obj.clone()),
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Object(obj)) => Some(obj),
            _ => None,
        },
        _ => None,
    }
}

fn field<'a>(obj: &'a Map<String, Value>, key: &str, alias: &str) -> Option<&'a Value> {
    obj.get(key).or_else(|| obj.get(alias))
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.is_finite())
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_complete_settings() {
        let settings = ContextSettings::parse(&json!({
            "timeWindow": { "enabled": true, "startHour": 7, "endHour": 22, "daysOfWeek": [5, 1, 1, 3] },
            "calendarBusy": { "enabled": true, "snoozeMinutes": 30 },
            "category": "Medication",
            "timezone": "Europe/Oslo"
        }));

        assert!(settings.time_window.enabled);
        assert_eq!(settings.time_window.start_hour, 7);
        assert_eq!(settings.time_window.end_hour, 22);
        assert_eq!(settings.time_window.days_of_week, vec![1, 3, 5]);
        assert!(settings.calendar_busy.enabled);
        assert_eq!(settings.calendar_busy.snooze_minutes, 30);
        assert_eq!(settings.category.as_deref(), Some("Medication"));
        assert_eq!(settings.timezone, Some(chrono_tz::Europe::Oslo));
    }

    #[test]
    fn falls_back_to_defaults_for_malformed_input() {
        for raw in [
            Value::Null,
            json!([1, 2, 3]),
            json!("not json"),
            json!(42),
            json!({}),
        ] {
            assert_eq!(ContextSettings::parse(&raw), ContextSettings::default());
        }
        assert_eq!(parse_context_settings(None), ContextSettings::default());
    }

    #[test]
    fn falls_back_per_field() {
        let settings = ContextSettings::parse(&json!({
            "timeWindow": { "enabled": "yes", "startHour": 25, "endHour": "20", "daysOfWeek": [0, 7, "x", -1, 6.0] },
            "calendarBusy": { "enabled": true, "snoozeMinutes": -5 },
            "category": "   ",
            "timezone": "Mars/Olympus"
        }));

        assert!(!settings.time_window.enabled);
        assert_eq!(settings.time_window.start_hour, DEFAULT_START_HOUR);
        assert_eq!(settings.time_window.end_hour, 20);
        assert_eq!(settings.time_window.days_of_week, vec![0, 6]);
        assert!(settings.calendar_busy.enabled);
        assert_eq!(settings.calendar_busy.snooze_minutes, DEFAULT_SNOOZE_MINUTES);
        assert_eq!(settings.category, None);
        assert_eq!(settings.timezone, None);
    }

    #[test]
    fn accepts_snake_case_and_encoded_json() {
        let encoded = json!(
            "{\"time_window\":{\"enabled\":true,\"start_hour\":9,\"end_hour\":17,\"days_of_week\":[1]}}"
        );
        let settings = ContextSettings::parse(&encoded);
        assert!(settings.time_window.enabled);
        assert_eq!(settings.time_window.start_hour, 9);
        assert_eq!(settings.time_window.end_hour, 17);
        assert_eq!(settings.time_window.days_of_week, vec![1]);
    }

    #[test]
    fn non_array_days_mean_every_day() {
        let settings = ContextSettings::parse(&json!({
            "timeWindow": { "enabled": true, "daysOfWeek": "weekdays" }
        }));
        assert!(settings.time_window.days_of_week.is_empty());
    }
}
