use crate::dtos::SnoozeOptionDTO;
use nudge_domain::SnoozeOption;
use serde::{Deserialize, Serialize};

pub mod get_snooze_options {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct QueryParams {
        pub due_ts: Option<i64>,
        pub category: Option<String>,
        /// IANA name, the server default timezone when absent
        pub timezone: Option<String>,
    }

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub options: Vec<SnoozeOptionDTO>,
    }

    impl APIResponse {
        pub fn new(options: Vec<SnoozeOption>) -> Self {
            Self {
                options: options.into_iter().map(SnoozeOptionDTO::new).collect(),
            }
        }
    }
}
