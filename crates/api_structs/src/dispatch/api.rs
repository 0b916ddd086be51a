use serde::{Deserialize, Serialize};

pub mod send_due_notifications {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        /// Due occurrences looked at, not notifications sent
        pub processed: usize,
    }
}
