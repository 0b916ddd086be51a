use crate::{
    date::MINUTE_MILLIS,
    shared::entity::{Entity, ID},
};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryChannel {
    Email,
    /// Web push through the browser push services
    Push,
    /// Mobile push through Firebase Cloud Messaging
    Fcm,
}

impl DeliveryChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Push => "push",
            Self::Fcm => "fcm",
        }
    }
}

impl Display for DeliveryChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(Self::Email),
            "push" => Ok(Self::Push),
            "fcm" => Ok(Self::Fcm),
            _ => Err(format!("Unknown delivery channel: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    /// Reserved, the transport has not reported back yet
    Pending,
    Sent,
    Skipped,
    /// The transport rejected the message
    Failed,
    /// The transport could not be reached or answered with something unexpected
    Error,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
            Self::Error => "error",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::Error)
    }
}

impl FromStr for DeliveryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "sent" => Ok(Self::Sent),
            "skipped" => Ok(Self::Skipped),
            "failed" => Ok(Self::Failed),
            "error" => Ok(Self::Error),
            _ => Err(format!("Unknown delivery status: {}", s)),
        }
    }
}

/// How long a `Pending` reservation holds its job key. A pass that dies
/// between reserving and finalizing leaves the row pending, and the key is
/// handed out again once the lease has run out.
pub const RESERVATION_LEASE_MINUTES: i64 = 10;

/// One attempt to notify about an `Occurrence` on one `DeliveryChannel`.
///
/// Rows are reserved as `Pending` before the transport is called and
/// finalized afterwards. The unique `job_key` makes the log double as the
/// idempotency guard of the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryLogEntry {
    pub id: ID,
    pub occurrence_id: ID,
    pub channel: DeliveryChannel,
    pub job_key: String,
    pub status: DeliveryStatus,
    pub attempted_at: i64,
    pub updated_at: i64,
    pub retry_count: i64,
    pub next_retry_at: Option<i64>,
}

impl DeliveryLogEntry {
    pub fn reserve(occurrence_id: ID, channel: DeliveryChannel, job_key: String, now: i64) -> Self {
        Self {
            id: Default::default(),
            occurrence_id,
            channel,
            job_key,
            status: DeliveryStatus::Pending,
            attempted_at: now,
            updated_at: now,
            retry_count: 0,
            next_retry_at: None,
        }
    }

    /// Whether this row keeps `job_key` from being reserved at `now`
    pub fn blocks_reservation(&self, now: i64) -> bool {
        match self.status {
            DeliveryStatus::Sent => true,
            DeliveryStatus::Pending => {
                now - self.attempted_at < RESERVATION_LEASE_MINUTES * MINUTE_MILLIS
            }
            _ => false,
        }
    }
}

impl Entity for DeliveryLogEntry {
    fn id(&self) -> &ID {
        &self.id
    }
}

/// Handed out by a successful reservation
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryReservation {
    pub log_id: ID,
    /// Failed attempts recorded on the row before this reservation
    pub retry_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushSubscription {
    pub endpoint: String,
    pub user_id: ID,
    pub p256dh: String,
    pub auth: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FcmToken {
    pub token: String,
    pub user_id: ID,
    pub platform: Option<String>,
}
