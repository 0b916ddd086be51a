mod inmemory;
mod postgres;

pub use inmemory::InMemoryFcmTokenRepo;
use nudge_domain::{FcmToken, ID};
pub use postgres::PostgresFcmTokenRepo;

#[async_trait::async_trait]
pub trait IFcmTokenRepo: Send + Sync {
    /// Tokens are unique, registering the same token again replaces it
    async fn upsert(&self, token: &FcmToken) -> anyhow::Result<()>;
    async fn find_by_user(&self, user_id: &ID) -> anyhow::Result<Vec<FcmToken>>;
    /// Returns the number of removed tokens
    async fn delete_by_tokens(&self, tokens: &[String]) -> anyhow::Result<u64>;
}
