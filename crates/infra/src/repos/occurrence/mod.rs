mod inmemory;
mod postgres;

pub use inmemory::InMemoryOccurrenceRepo;
use nudge_domain::{Occurrence, OccurrenceStatus, ID};
pub use postgres::PostgresOccurrenceRepo;

#[async_trait::async_trait]
pub trait IOccurrenceRepo: Send + Sync {
    async fn insert(&self, occurrence: &Occurrence) -> anyhow::Result<()>;
    async fn find(&self, occurrence_id: &ID) -> anyhow::Result<Option<Occurrence>>;
    /// Snoozed occurrences whose snooze has run out and open occurrences
    /// that are past their instant, ordered by effective due time
    async fn find_due(&self, now: i64) -> anyhow::Result<Vec<Occurrence>>;
    async fn update_snooze(
        &self,
        occurrence_id: &ID,
        snoozed_until: i64,
        status: OccurrenceStatus,
    ) -> anyhow::Result<()>;
}
