mod inmemory;
mod postgres;

pub use inmemory::InMemoryCalendarConnectionRepo;
use nudge_domain::{CalendarConnection, ID};
pub use postgres::PostgresCalendarConnectionRepo;

#[async_trait::async_trait]
pub trait ICalendarConnectionRepo: Send + Sync {
    /// One connection per user, connecting again replaces it
    async fn upsert(&self, connection: &CalendarConnection) -> anyhow::Result<()>;
    async fn find_by_user(&self, user_id: &ID) -> anyhow::Result<Option<CalendarConnection>>;
}
