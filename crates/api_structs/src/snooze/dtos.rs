use nudge_domain::{SnoozeOption, SnoozeTarget};
use serde::{Deserialize, Serialize};

/// Millis timestamp, or `"custom"` when the user has to pick the time
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SnoozeTargetDTO {
    At(i64),
    Custom(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnoozeOptionDTO {
    pub id: String,
    pub label: String,
    pub target: SnoozeTargetDTO,
}

impl SnoozeOptionDTO {
    pub fn new(option: SnoozeOption) -> Self {
        Self {
            id: option.id.to_string(),
            label: option.label.to_string(),
            target: match option.target {
                SnoozeTarget::At(ts) => SnoozeTargetDTO::At(ts),
                SnoozeTarget::Custom => SnoozeTargetDTO::Custom("custom".into()),
            },
        }
    }
}
