use super::IFcmTokenRepo;
use nudge_domain::{FcmToken, ID};
use sqlx::{types::Uuid, FromRow, PgPool};

pub struct PostgresFcmTokenRepo {
    pool: PgPool,
}

impl PostgresFcmTokenRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct FcmTokenRaw {
    token: String,
    user_uid: Uuid,
    platform: Option<String>,
}

impl From<FcmTokenRaw> for FcmToken {
    fn from(raw: FcmTokenRaw) -> Self {
        Self {
            token: raw.token,
            user_id: raw.user_uid.into(),
            platform: raw.platform,
        }
    }
}

#[async_trait::async_trait]
impl IFcmTokenRepo for PostgresFcmTokenRepo {
    async fn upsert(&self, token: &FcmToken) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO fcm_tokens(token, user_uid, platform)
            VALUES($1, $2, $3)
            ON CONFLICT(token) DO UPDATE
            SET user_uid = EXCLUDED.user_uid,
            platform = EXCLUDED.platform
            "#,
        )
        .bind(&token.token)
        .bind(token.user_id.inner_ref())
        .bind(&token.platform)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_user(&self, user_id: &ID) -> anyhow::Result<Vec<FcmToken>> {
        let rows: Vec<FcmTokenRaw> = sqlx::query_as(
            r#"
            SELECT * FROM fcm_tokens AS t
            WHERE t.user_uid = $1
            "#,
        )
        .bind(user_id.inner_ref())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(FcmToken::from).collect())
    }

    async fn delete_by_tokens(&self, tokens: &[String]) -> anyhow::Result<u64> {
        if tokens.is_empty() {
            return Ok(0);
        }
        let res = sqlx::query(
            r#"
            DELETE FROM fcm_tokens AS t
            WHERE t.token = ANY($1)
            "#,
        )
        .bind(tokens)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected())
    }
}
