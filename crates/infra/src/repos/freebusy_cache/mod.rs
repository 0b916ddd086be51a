mod inmemory;
mod postgres;

pub use inmemory::InMemoryFreeBusyCacheRepo;
use nudge_domain::{FreeBusyCacheEntry, ID};
pub use postgres::PostgresFreeBusyCacheRepo;

#[async_trait::async_trait]
pub trait IFreeBusyCacheRepo: Send + Sync {
    async fn find(&self, user_id: &ID) -> anyhow::Result<Option<FreeBusyCacheEntry>>;
    /// Overwrites the entry of the user
    async fn save(&self, entry: &FreeBusyCacheEntry) -> anyhow::Result<()>;
}
