use super::IReminderRepo;
use crate::repos::shared::inmemory_repo::*;
use nudge_domain::{Reminder, ID};
use serde_json::Value;

pub struct InMemoryReminderRepo {
    reminders: std::sync::Mutex<Vec<Reminder>>,
    context_settings: std::sync::Mutex<Vec<(ID, Value)>>,
}

impl InMemoryReminderRepo {
    pub fn new() -> Self {
        Self {
            reminders: std::sync::Mutex::new(vec![]),
            context_settings: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl IReminderRepo for InMemoryReminderRepo {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()> {
        insert(reminder, &self.reminders);
        Ok(())
    }

    async fn find(&self, reminder_id: &ID) -> anyhow::Result<Option<Reminder>> {
        Ok(find(reminder_id, &self.reminders))
    }

    async fn set_context_settings(
        &self,
        reminder_id: &ID,
        settings: &Value,
    ) -> anyhow::Result<()> {
        upsert_by(
            &(reminder_id.clone(), settings.clone()),
            &self.context_settings,
            |(id, _)| id == reminder_id,
        );
        Ok(())
    }

    async fn find_context_settings(&self, reminder_id: &ID) -> anyhow::Result<Option<Value>> {
        Ok(find_by(&self.context_settings, |(id, _)| id == reminder_id)
            .pop()
            .map(|(_, settings)| settings))
    }
}
