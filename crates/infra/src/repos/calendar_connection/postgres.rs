use super::ICalendarConnectionRepo;
use nudge_domain::{CalendarConnection, ID};
use sqlx::{types::Uuid, FromRow, PgPool};

pub struct PostgresCalendarConnectionRepo {
    pool: PgPool,
}

impl PostgresCalendarConnectionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct CalendarConnectionRaw {
    user_uid: Uuid,
    access_token: String,
    calendar_ids: Vec<String>,
}

impl From<CalendarConnectionRaw> for CalendarConnection {
    fn from(raw: CalendarConnectionRaw) -> Self {
        Self {
            user_id: raw.user_uid.into(),
            access_token: raw.access_token,
            calendar_ids: raw.calendar_ids,
        }
    }
}

#[async_trait::async_trait]
impl ICalendarConnectionRepo for PostgresCalendarConnectionRepo {
    async fn upsert(&self, connection: &CalendarConnection) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO calendar_connections(user_uid, access_token, calendar_ids)
            VALUES($1, $2, $3)
            ON CONFLICT(user_uid) DO UPDATE
            SET access_token = EXCLUDED.access_token,
            calendar_ids = EXCLUDED.calendar_ids
            "#,
        )
        .bind(connection.user_id.inner_ref())
        .bind(&connection.access_token)
        .bind(&connection.calendar_ids)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_user(&self, user_id: &ID) -> anyhow::Result<Option<CalendarConnection>> {
        let raw: Option<CalendarConnectionRaw> = sqlx::query_as(
            r#"
            SELECT * FROM calendar_connections AS c
            WHERE c.user_uid = $1
            "#,
        )
        .bind(user_id.inner_ref())
        .fetch_optional(&self.pool)
        .await?;
        Ok(raw.map(CalendarConnection::from))
    }
}
