use super::IReminderRepo;
use nudge_domain::{Reminder, ID};
use serde_json::Value;
use sqlx::{types::Uuid, FromRow, PgPool};

pub struct PostgresReminderRepo {
    pool: PgPool,
}

impl PostgresReminderRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ReminderRaw {
    reminder_uid: Uuid,
    owner_uid: Option<Uuid>,
    title: String,
    notes: Option<String>,
    is_active: bool,
}

impl From<ReminderRaw> for Reminder {
    fn from(raw: ReminderRaw) -> Self {
        Self {
            id: raw.reminder_uid.into(),
            owner_id: raw.owner_uid.map(ID::from),
            title: raw.title,
            notes: raw.notes,
            is_active: raw.is_active,
        }
    }
}

#[derive(Debug, FromRow)]
struct ContextSettingsRaw {
    context_settings: Option<Value>,
}

#[async_trait::async_trait]
impl IReminderRepo for PostgresReminderRepo {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reminders
            (reminder_uid, owner_uid, title, notes, is_active)
            VALUES($1, $2, $3, $4, $5)
            "#,
        )
        .bind(reminder.id.inner_ref())
        .bind(reminder.owner_id.as_ref().map(|id| *id.inner_ref()))
        .bind(&reminder.title)
        .bind(&reminder.notes)
        .bind(reminder.is_active)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, reminder_id: &ID) -> anyhow::Result<Option<Reminder>> {
        let raw: Option<ReminderRaw> = sqlx::query_as(
            r#"
            SELECT r.reminder_uid, r.owner_uid, r.title, r.notes, r.is_active
            FROM reminders AS r
            WHERE r.reminder_uid = $1
            "#,
        )
        .bind(reminder_id.inner_ref())
        .fetch_optional(&self.pool)
        .await?;
        Ok(raw.map(Reminder::from))
    }

    async fn set_context_settings(
        &self,
        reminder_id: &ID,
        settings: &Value,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE reminders
            SET context_settings = $2
            WHERE reminder_uid = $1
            "#,
        )
        .bind(reminder_id.inner_ref())
        .bind(settings)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_context_settings(&self, reminder_id: &ID) -> anyhow::Result<Option<Value>> {
        let raw: Option<ContextSettingsRaw> = sqlx::query_as(
            r#"
            SELECT r.context_settings FROM reminders AS r
            WHERE r.reminder_uid = $1
            "#,
        )
        .bind(reminder_id.inner_ref())
        .fetch_optional(&self.pool)
        .await?;
        Ok(raw.and_then(|raw| raw.context_settings))
    }
}
