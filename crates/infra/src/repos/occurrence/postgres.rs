use super::IOccurrenceRepo;
use nudge_domain::{Occurrence, OccurrenceStatus, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use std::convert::TryFrom;

pub struct PostgresOccurrenceRepo {
    pool: PgPool,
}

impl PostgresOccurrenceRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct OccurrenceRaw {
    occurrence_uid: Uuid,
    reminder_uid: Uuid,
    occur_at: i64,
    snoozed_until: Option<i64>,
    status: String,
    performed_by: Option<Uuid>,
}

impl TryFrom<OccurrenceRaw> for Occurrence {
    type Error = anyhow::Error;

    fn try_from(raw: OccurrenceRaw) -> anyhow::Result<Self> {
        Ok(Self {
            id: raw.occurrence_uid.into(),
            reminder_id: raw.reminder_uid.into(),
            occur_at: raw.occur_at,
            snoozed_until: raw.snoozed_until,
            status: raw
                .status
                .parse::<OccurrenceStatus>()
                .map_err(anyhow::Error::msg)?,
            performed_by: raw.performed_by.map(ID::from),
        })
    }
}

#[async_trait::async_trait]
impl IOccurrenceRepo for PostgresOccurrenceRepo {
    async fn insert(&self, occurrence: &Occurrence) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO occurrences
            (occurrence_uid, reminder_uid, occur_at, snoozed_until, status, performed_by)
            VALUES($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(occurrence.id.inner_ref())
        .bind(occurrence.reminder_id.inner_ref())
        .bind(occurrence.occur_at)
        .bind(occurrence.snoozed_until)
        .bind(occurrence.status.as_str())
        .bind(occurrence.performed_by.as_ref().map(|id| *id.inner_ref()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, occurrence_id: &ID) -> anyhow::Result<Option<Occurrence>> {
        let raw: Option<OccurrenceRaw> = sqlx::query_as(
            r#"
            SELECT * FROM occurrences AS o
            WHERE o.occurrence_uid = $1
            "#,
        )
        .bind(occurrence_id.inner_ref())
        .fetch_optional(&self.pool)
        .await?;

        raw.map(Occurrence::try_from).transpose()
    }

    async fn find_due(&self, now: i64) -> anyhow::Result<Vec<Occurrence>> {
        let rows: Vec<OccurrenceRaw> = sqlx::query_as(
            r#"
            SELECT * FROM occurrences AS o
            WHERE (o.status = 'snoozed' AND o.snoozed_until <= $1)
            OR (o.status = 'open' AND o.occur_at <= $1)
            ORDER BY COALESCE(o.snoozed_until, o.occur_at)
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Occurrence::try_from).collect()
    }

    async fn update_snooze(
        &self,
        occurrence_id: &ID,
        snoozed_until: i64,
        status: OccurrenceStatus,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE occurrences
            SET snoozed_until = $2,
            status = $3
            WHERE occurrence_uid = $1
            "#,
        )
        .bind(occurrence_id.inner_ref())
        .bind(snoozed_until)
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
