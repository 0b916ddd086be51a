use super::IDeliveryLogRepo;
use nudge_domain::{
    date::MINUTE_MILLIS, DeliveryChannel, DeliveryLogEntry, DeliveryReservation, DeliveryStatus,
    RetryState, ID, RESERVATION_LEASE_MINUTES,
};
use sqlx::{types::Uuid, FromRow, PgPool};
use std::convert::TryFrom;

pub struct PostgresDeliveryLogRepo {
    pool: PgPool,
}

impl PostgresDeliveryLogRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct DeliveryLogRaw {
    log_uid: Uuid,
    occurrence_uid: Uuid,
    channel: String,
    job_key: String,
    status: String,
    attempted_at: i64,
    updated_at: i64,
    retry_count: i64,
    next_retry_at: Option<i64>,
}

impl TryFrom<DeliveryLogRaw> for DeliveryLogEntry {
    type Error = anyhow::Error;

    fn try_from(raw: DeliveryLogRaw) -> anyhow::Result<Self> {
        Ok(Self {
            id: raw.log_uid.into(),
            occurrence_id: raw.occurrence_uid.into(),
            channel: raw.channel.parse().map_err(anyhow::Error::msg)?,
            job_key: raw.job_key,
            status: raw.status.parse().map_err(anyhow::Error::msg)?,
            attempted_at: raw.attempted_at,
            updated_at: raw.updated_at,
            retry_count: raw.retry_count,
            next_retry_at: raw.next_retry_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ReservationRaw {
    log_uid: Uuid,
    retry_count: i64,
}

#[async_trait::async_trait]
impl IDeliveryLogRepo for PostgresDeliveryLogRepo {
    async fn reserve(
        &self,
        occurrence_id: &ID,
        channel: DeliveryChannel,
        job_key: &str,
        now: i64,
    ) -> anyhow::Result<Option<DeliveryReservation>> {
        let log = DeliveryLogEntry::reserve(occurrence_id.clone(), channel, job_key.to_string(), now);
        // The conditional upsert returns no row when the key is sent or
        // pending within its lease
        let raw: Option<ReservationRaw> = sqlx::query_as(
            r#"
            INSERT INTO delivery_logs
            (log_uid, occurrence_uid, channel, job_key, status, attempted_at, updated_at, retry_count, next_retry_at)
            VALUES($1, $2, $3, $4, $5, $6, $6, 0, NULL)
            ON CONFLICT(job_key) DO UPDATE
            SET status = EXCLUDED.status,
            attempted_at = EXCLUDED.attempted_at,
            updated_at = EXCLUDED.updated_at
            WHERE delivery_logs.status <> 'sent'
            AND NOT (delivery_logs.status = 'pending' AND delivery_logs.attempted_at > $7)
            RETURNING log_uid, retry_count
            "#,
        )
        .bind(log.id.inner_ref())
        .bind(log.occurrence_id.inner_ref())
        .bind(log.channel.as_str())
        .bind(&log.job_key)
        .bind(log.status.as_str())
        .bind(now)
        .bind(now - RESERVATION_LEASE_MINUTES * MINUTE_MILLIS)
        .fetch_optional(&self.pool)
        .await?;

        Ok(raw.map(|raw| DeliveryReservation {
            log_id: raw.log_uid.into(),
            retry_count: raw.retry_count,
        }))
    }

    async fn finalize(
        &self,
        log_id: &ID,
        status: DeliveryStatus,
        retry: Option<RetryState>,
        now: i64,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE delivery_logs
            SET status = $2,
            updated_at = $3,
            retry_count = COALESCE($4, retry_count),
            next_retry_at = $5
            WHERE log_uid = $1
            "#,
        )
        .bind(log_id.inner_ref())
        .bind(status.as_str())
        .bind(now)
        .bind(retry.map(|r| r.retry_count))
        .bind(retry.and_then(|r| r.next_retry_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_occurrence(&self, occurrence_id: &ID) -> anyhow::Result<Vec<DeliveryLogEntry>> {
        let rows: Vec<DeliveryLogRaw> = sqlx::query_as(
            r#"
            SELECT * FROM delivery_logs AS l
            WHERE l.occurrence_uid = $1
            ORDER BY l.attempted_at
            "#,
        )
        .bind(occurrence_id.inner_ref())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(DeliveryLogEntry::try_from).collect()
    }
}
