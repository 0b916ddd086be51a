mod calendar_api;

use crate::repos::ICalendarConnectionRepo;
use calendar_api::{FreeBusyCalendar, FreeBusyRequest, GoogleCalendarRestApi, GoogleDateTime};
use nudge_domain::{RawBusyInterval, ID};
use reqwest::Client;
use std::sync::{Arc, Mutex};
use tracing::warn;

// https://developers.google.com/calendar/v3/reference/freebusy/query

const PRIMARY_CALENDAR_ID: &str = "primary";

/// Source of busy intervals for a user's calendars
#[async_trait::async_trait]
pub trait IFreeBusyProvider: Send + Sync {
    /// Busy intervals overlapping `[time_min, time_max]`, exactly as the
    /// calendar reported them
    async fn fetch_free_busy(
        &self,
        user_id: &ID,
        time_min: i64,
        time_max: i64,
    ) -> anyhow::Result<Vec<RawBusyInterval>>;
}

/// Queries the Google Calendar `freeBusy` endpoint with the access token of
/// the user's calendar connection. Users without a connection are always free.
pub struct GoogleFreeBusyProvider {
    client: Client,
    connections: Arc<dyn ICalendarConnectionRepo>,
}

impl GoogleFreeBusyProvider {
    pub fn new(connections: Arc<dyn ICalendarConnectionRepo>) -> Self {
        Self {
            client: Client::new(),
            connections,
        }
    }
}

#[async_trait::async_trait]
impl IFreeBusyProvider for GoogleFreeBusyProvider {
    async fn fetch_free_busy(
        &self,
        user_id: &ID,
        time_min: i64,
        time_max: i64,
    ) -> anyhow::Result<Vec<RawBusyInterval>> {
        let connection = match self.connections.find_by_user(user_id).await? {
            Some(connection) => connection,
            None => return Ok(vec![]),
        };
        let calendar_ids = if connection.calendar_ids.is_empty() {
            vec![PRIMARY_CALENDAR_ID.to_string()]
        } else {
            connection.calendar_ids
        };

        let api = GoogleCalendarRestApi::new(self.client.clone(), connection.access_token);
        let body = FreeBusyRequest {
            time_min: GoogleDateTime::from_timestamp_millis(time_min),
            time_max: GoogleDateTime::from_timestamp_millis(time_max),
            time_zone: "UTC".to_string(),
            items: calendar_ids.into_iter().map(FreeBusyCalendar::new).collect(),
        };
        let res = api.freebusy(&body).await?;

        let mut intervals = vec![];
        for (calendar_id, calendar) in res.calendars {
            if !calendar.errors.is_empty() {
                warn!(
                    "Google calendar {} reported errors: {:?}",
                    calendar_id, calendar.errors
                );
            }
            for busy in calendar.busy {
                intervals.push(RawBusyInterval::new(
                    busy.start.into_inner(),
                    busy.end.into_inner(),
                ));
            }
        }
        Ok(intervals)
    }
}

/// Serves canned intervals and counts the lookups
pub struct InMemoryFreeBusyProvider {
    busy: Mutex<Vec<(ID, RawBusyInterval)>>,
    calls: Mutex<usize>,
    failing: Mutex<bool>,
}

impl InMemoryFreeBusyProvider {
    pub fn new() -> Self {
        Self {
            busy: Mutex::new(vec![]),
            calls: Mutex::new(0),
            failing: Mutex::new(false),
        }
    }

    pub fn add_busy(&self, user_id: &ID, interval: RawBusyInterval) {
        self.busy.lock().unwrap().push((user_id.clone(), interval));
    }

    /// Makes subsequent lookups fail
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl Default for InMemoryFreeBusyProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IFreeBusyProvider for InMemoryFreeBusyProvider {
    async fn fetch_free_busy(
        &self,
        user_id: &ID,
        _time_min: i64,
        _time_max: i64,
    ) -> anyhow::Result<Vec<RawBusyInterval>> {
        *self.calls.lock().unwrap() += 1;
        if *self.failing.lock().unwrap() {
            return Err(anyhow::Error::msg("Calendar provider is unavailable"));
        }
        Ok(self
            .busy
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == user_id)
            .map(|(_, interval)| interval.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::Repos;

    #[tokio::test]
    async fn users_without_connection_are_free() {
        let repos = Repos::create_inmemory();
        let provider = GoogleFreeBusyProvider::new(repos.calendar_connections.clone());
        let busy = provider
            .fetch_free_busy(&ID::default(), 0, 1000)
            .await
            .unwrap();
        assert!(busy.is_empty());
    }

    #[test]
    fn formats_request_times_as_rfc3339() {
        let dt = GoogleDateTime::from_timestamp_millis(1_768_039_200_000);
        assert_eq!(dt.into_inner(), "2026-01-10T10:00:00+00:00");
    }
}
