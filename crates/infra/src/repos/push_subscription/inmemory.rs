use super::IPushSubscriptionRepo;
use crate::repos::shared::inmemory_repo::*;
use nudge_domain::{PushSubscription, ID};

pub struct InMemoryPushSubscriptionRepo {
    subscriptions: std::sync::Mutex<Vec<PushSubscription>>,
}

impl InMemoryPushSubscriptionRepo {
    pub fn new() -> Self {
        Self {
            subscriptions: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl IPushSubscriptionRepo for InMemoryPushSubscriptionRepo {
    async fn upsert(&self, subscription: &PushSubscription) -> anyhow::Result<()> {
        upsert_by(subscription, &self.subscriptions, |s| {
            s.endpoint == subscription.endpoint
        });
        Ok(())
    }

    async fn find_by_user(&self, user_id: &ID) -> anyhow::Result<Vec<PushSubscription>> {
        Ok(find_by(&self.subscriptions, |s| s.user_id == *user_id))
    }

    async fn delete_by_endpoints(&self, endpoints: &[String]) -> anyhow::Result<u64> {
        Ok(delete_by(&self.subscriptions, |s| {
            endpoints.contains(&s.endpoint)
        }))
    }
}
