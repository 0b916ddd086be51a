use super::IFreeBusyCacheRepo;
use nudge_domain::{BusyInterval, FreeBusyCacheEntry, ID};
use sqlx::{
    types::{Json, Uuid},
    FromRow, PgPool,
};

pub struct PostgresFreeBusyCacheRepo {
    pool: PgPool,
}

impl PostgresFreeBusyCacheRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct FreeBusyCacheRaw {
    user_uid: Uuid,
    busy: Json<Vec<BusyInterval>>,
    time_min: i64,
    time_max: i64,
    fetched_at: i64,
}

impl From<FreeBusyCacheRaw> for FreeBusyCacheEntry {
    fn from(raw: FreeBusyCacheRaw) -> Self {
        Self {
            user_id: raw.user_uid.into(),
            busy: raw.busy.0,
            time_min: raw.time_min,
            time_max: raw.time_max,
            fetched_at: raw.fetched_at,
        }
    }
}

#[async_trait::async_trait]
impl IFreeBusyCacheRepo for PostgresFreeBusyCacheRepo {
    async fn find(&self, user_id: &ID) -> anyhow::Result<Option<FreeBusyCacheEntry>> {
        let raw: Option<FreeBusyCacheRaw> = sqlx::query_as(
            r#"
            SELECT * FROM freebusy_cache AS c
            WHERE c.user_uid = $1
            "#,
        )
        .bind(user_id.inner_ref())
        .fetch_optional(&self.pool)
        .await?;
        Ok(raw.map(FreeBusyCacheEntry::from))
    }

    async fn save(&self, entry: &FreeBusyCacheEntry) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO freebusy_cache(user_uid, busy, time_min, time_max, fetched_at)
            VALUES($1, $2, $3, $4, $5)
            ON CONFLICT(user_uid) DO UPDATE
            SET busy = EXCLUDED.busy,
            time_min = EXCLUDED.time_min,
            time_max = EXCLUDED.time_max,
            fetched_at = EXCLUDED.fetched_at
            "#,
        )
        .bind(entry.user_id.inner_ref())
        .bind(Json(&entry.busy))
        .bind(entry.time_min)
        .bind(entry.time_max)
        .bind(entry.fetched_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
