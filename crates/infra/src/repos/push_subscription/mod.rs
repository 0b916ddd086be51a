mod inmemory;
mod postgres;

pub use inmemory::InMemoryPushSubscriptionRepo;
use nudge_domain::{PushSubscription, ID};
pub use postgres::PostgresPushSubscriptionRepo;

#[async_trait::async_trait]
pub trait IPushSubscriptionRepo: Send + Sync {
    /// Endpoints are unique, subscribing the same endpoint again replaces it
    async fn upsert(&self, subscription: &PushSubscription) -> anyhow::Result<()>;
    async fn find_by_user(&self, user_id: &ID) -> anyhow::Result<Vec<PushSubscription>>;
    /// Returns the number of removed subscriptions
    async fn delete_by_endpoints(&self, endpoints: &[String]) -> anyhow::Result<u64>;
}

#[cfg(test)]
mod tests {
    use crate::repos::Repos;
    use nudge_domain::{PushSubscription, ID};

    fn subscription(endpoint: &str, user_id: &ID) -> PushSubscription {
        PushSubscription {
            endpoint: endpoint.into(),
            user_id: user_id.clone(),
            p256dh: "key".into(),
            auth: "auth".into(),
        }
    }

    #[tokio::test]
    async fn manages_subscriptions() {
        let repos = Repos::create_inmemory();
        let user_id = ID::default();
        let other_user_id = ID::default();

        repos
            .push_subscriptions
            .upsert(&subscription("https://push/a", &user_id))
            .await
            .unwrap();
        repos
            .push_subscriptions
            .upsert(&subscription("https://push/b", &user_id))
            .await
            .unwrap();
        // Same endpoint moving to another user
        repos
            .push_subscriptions
            .upsert(&subscription("https://push/b", &other_user_id))
            .await
            .unwrap();

        let own = repos.push_subscriptions.find_by_user(&user_id).await.unwrap();
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].endpoint, "https://push/a");

        let deleted = repos
            .push_subscriptions
            .delete_by_endpoints(&["https://push/a".into(), "https://push/unknown".into()])
            .await
            .unwrap();
        assert_eq!(deleted, 1);
        assert!(repos
            .push_subscriptions
            .find_by_user(&user_id)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            repos
                .push_subscriptions
                .delete_by_endpoints(&[])
                .await
                .unwrap(),
            0
        );
    }
}
