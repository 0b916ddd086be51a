use chrono::{TimeZone, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::error;

const GOOGLE_API_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

pub struct GoogleCalendarRestApi {
    client: Client,
    access_token: String,
}

impl GoogleCalendarRestApi {
    pub fn new(client: Client, access_token: String) -> Self {
        Self {
            client,
            access_token,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GoogleDateTime(String);

impl GoogleDateTime {
    pub fn from_timestamp_millis(timestamp: i64) -> Self {
        let datetime_str = match Utc.timestamp_millis_opt(timestamp).single() {
            Some(dt) => dt.to_rfc3339(),
            None => timestamp.to_string(),
        };
        Self(datetime_str)
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeBusyCalendarResponse {
    #[serde(default)]
    pub busy: Vec<FreeBusyTimeSpanResponse>,
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeBusyTimeSpanResponse {
    pub start: GoogleDateTime,
    pub end: GoogleDateTime,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeBusyResponse {
    #[serde(default)]
    pub calendars: HashMap<String, FreeBusyCalendarResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeBusyCalendar {
    pub id: String,
}

impl FreeBusyCalendar {
    pub fn new(id: String) -> Self {
        Self { id }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeBusyRequest {
    pub time_min: GoogleDateTime,
    pub time_max: GoogleDateTime,
    pub time_zone: String,
    pub items: Vec<FreeBusyCalendar>,
}

impl GoogleCalendarRestApi {
    async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        body: &impl Serialize,
        path: String,
    ) -> anyhow::Result<T> {
        match self
            .client
            .post(&format!("{}/{}", GOOGLE_API_BASE_URL, path))
            .header("authorization", format!("Bearer {}", self.access_token))
            .json(body)
            .send()
            .await
        {
            Ok(res) => res
                .error_for_status()
                .map_err(|e| {
                    error!(
                        "[Rejected] Google Calendar API POST error. Error message: {:?}",
                        e
                    );
                    anyhow::Error::new(e)
                })?
                .json::<T>()
                .await
                .map_err(|e| {
                    error!(
                        "[Unexpected Response] Google Calendar API POST error. Error message: {:?}",
                        e
                    );
                    anyhow::Error::new(e)
                }),
            Err(e) => {
                error!(
                    "[Network Error] Google Calendar API POST error. Error message: {:?}",
                    e
                );
                Err(anyhow::Error::new(e))
            }
        }
    }

    pub async fn freebusy(&self, body: &FreeBusyRequest) -> anyhow::Result<FreeBusyResponse> {
        self.post(body, "freeBusy".into()).await.map_err(|e| {
            error!(
                "Failed to get freebusy from google calendar with request: {:?}. Error message: {:?}",
                body, e
            );
            e
        })
    }
}
