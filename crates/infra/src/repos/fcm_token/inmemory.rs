use super::IFcmTokenRepo;
use crate::repos::shared::inmemory_repo::*;
use nudge_domain::{FcmToken, ID};

pub struct InMemoryFcmTokenRepo {
    tokens: std::sync::Mutex<Vec<FcmToken>>,
}

impl InMemoryFcmTokenRepo {
    pub fn new() -> Self {
        Self {
            tokens: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl IFcmTokenRepo for InMemoryFcmTokenRepo {
    async fn upsert(&self, token: &FcmToken) -> anyhow::Result<()> {
        upsert_by(token, &self.tokens, |t| t.token == token.token);
        Ok(())
    }

    async fn find_by_user(&self, user_id: &ID) -> anyhow::Result<Vec<FcmToken>> {
        Ok(find_by(&self.tokens, |t| t.user_id == *user_id))
    }

    async fn delete_by_tokens(&self, tokens: &[String]) -> anyhow::Result<u64> {
        Ok(delete_by(&self.tokens, |t| tokens.contains(&t.token)))
    }
}
