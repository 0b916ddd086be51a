use crate::shared::entity::{Entity, ID};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One scheduled firing instant of a `Reminder`.
///
/// Occurrences are never deleted, they only move between statuses as users
/// act on them or as the dispatcher auto-snoozes them.
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence {
    pub id: ID,
    pub reminder_id: ID,
    /// Instant generated by the reminder recurrence
    pub occur_at: i64,
    /// Overrides `occur_at` when present
    pub snoozed_until: Option<i64>,
    pub status: OccurrenceStatus,
    pub performed_by: Option<ID>,
}

impl Occurrence {
    pub fn new(reminder_id: ID, occur_at: i64) -> Self {
        Self {
            id: Default::default(),
            reminder_id,
            occur_at,
            snoozed_until: None,
            status: OccurrenceStatus::Open,
            performed_by: None,
        }
    }

    /// `snoozed_until` if present, else `occur_at`
    pub fn effective_due_at(&self) -> i64 {
        self.snoozed_until.unwrap_or(self.occur_at)
    }

    /// Whether the dispatcher should consider this occurrence at `now`
    pub fn is_due(&self, now: i64) -> bool {
        match self.status {
            OccurrenceStatus::Snoozed => matches!(self.snoozed_until, Some(until) if until <= now),
            OccurrenceStatus::Open => self.occur_at <= now,
            OccurrenceStatus::Done | OccurrenceStatus::Missed => false,
        }
    }

    pub fn snooze(&mut self, until: i64) {
        self.snoozed_until = Some(until);
        self.status = OccurrenceStatus::Snoozed;
    }
}

impl Entity for Occurrence {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OccurrenceStatus {
    Open,
    Snoozed,
    Done,
    Missed,
}

impl OccurrenceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Snoozed => "snoozed",
            Self::Done => "done",
            Self::Missed => "missed",
        }
    }
}

impl FromStr for OccurrenceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "snoozed" => Ok(Self::Snoozed),
            "done" => Ok(Self::Done),
            "missed" => Ok(Self::Missed),
            _ => Err(format!("Unknown occurrence status: {}", s)),
        }
    }
}
