use super::IPushSubscriptionRepo;
use nudge_domain::{PushSubscription, ID};
use sqlx::{types::Uuid, FromRow, PgPool};

pub struct PostgresPushSubscriptionRepo {
    pool: PgPool,
}

impl PostgresPushSubscriptionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PushSubscriptionRaw {
    endpoint: String,
    user_uid: Uuid,
    p256dh: String,
    auth: String,
}

impl From<PushSubscriptionRaw> for PushSubscription {
    fn from(raw: PushSubscriptionRaw) -> Self {
        Self {
            endpoint: raw.endpoint,
            user_id: raw.user_uid.into(),
            p256dh: raw.p256dh,
            auth: raw.auth,
        }
    }
}

#[async_trait::async_trait]
impl IPushSubscriptionRepo for PostgresPushSubscriptionRepo {
    async fn upsert(&self, subscription: &PushSubscription) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO push_subscriptions(endpoint, user_uid, p256dh, auth)
            VALUES($1, $2, $3, $4)
            ON CONFLICT(endpoint) DO UPDATE
            SET user_uid = EXCLUDED.user_uid,
            p256dh = EXCLUDED.p256dh,
            auth = EXCLUDED.auth
            "#,
        )
        .bind(&subscription.endpoint)
        .bind(subscription.user_id.inner_ref())
        .bind(&subscription.p256dh)
        .bind(&subscription.auth)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_user(&self, user_id: &ID) -> anyhow::Result<Vec<PushSubscription>> {
        let rows: Vec<PushSubscriptionRaw> = sqlx::query_as(
            r#"
            SELECT * FROM push_subscriptions AS s
            WHERE s.user_uid = $1
            "#,
        )
        .bind(user_id.inner_ref())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(PushSubscription::from).collect())
    }

    async fn delete_by_endpoints(&self, endpoints: &[String]) -> anyhow::Result<u64> {
        if endpoints.is_empty() {
            return Ok(0);
        }
        let res = sqlx::query(
            r#"
            DELETE FROM push_subscriptions AS s
            WHERE s.endpoint = ANY($1)
            "#,
        )
        .bind(endpoints)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected())
    }
}
