mod inmemory;
mod postgres;

pub use inmemory::InMemoryReminderRepo;
use nudge_domain::{Reminder, ID};
pub use postgres::PostgresReminderRepo;
use serde_json::Value;

#[async_trait::async_trait]
pub trait IReminderRepo: Send + Sync {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()>;
    async fn find(&self, reminder_id: &ID) -> anyhow::Result<Option<Reminder>>;
    async fn set_context_settings(&self, reminder_id: &ID, settings: &Value)
        -> anyhow::Result<()>;
    /// The stored settings exactly as written, they are not validated on the way in
    async fn find_context_settings(&self, reminder_id: &ID) -> anyhow::Result<Option<Value>>;
}

#[cfg(test)]
mod tests {
    use crate::repos::Repos;
    use nudge_domain::{Reminder, ID};
    use serde_json::json;

    #[tokio::test]
    async fn stores_reminders_and_raw_settings() {
        let repos = Repos::create_inmemory();
        let reminder = Reminder::new(ID::default(), "Water the plants");
        repos.reminders.insert(&reminder).await.unwrap();

        assert_eq!(
            repos.reminders.find(&reminder.id).await.unwrap(),
            Some(reminder.clone())
        );
        assert_eq!(repos.reminders.find(&ID::default()).await.unwrap(), None);
        assert_eq!(
            repos
                .reminders
                .find_context_settings(&reminder.id)
                .await
                .unwrap(),
            None
        );

        repos
            .reminders
            .set_context_settings(&reminder.id, &json!({ "category": "plants" }))
            .await
            .unwrap();
        repos
            .reminders
            .set_context_settings(&reminder.id, &json!("garbage"))
            .await
            .unwrap();
        assert_eq!(
            repos
                .reminders
                .find_context_settings(&reminder.id)
                .await
                .unwrap(),
            Some(json!("garbage"))
        );
    }
}
