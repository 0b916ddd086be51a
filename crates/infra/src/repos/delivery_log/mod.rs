mod inmemory;
mod postgres;

pub use inmemory::InMemoryDeliveryLogRepo;
use nudge_domain::{
    DeliveryChannel, DeliveryLogEntry, DeliveryReservation, DeliveryStatus, RetryState, ID,
};
pub use postgres::PostgresDeliveryLogRepo;

/// Delivery log with two phase writes: a row is reserved as `pending` before
/// the transport is called and finalized with the outcome afterwards.
#[async_trait::async_trait]
pub trait IDeliveryLogRepo: Send + Sync {
    /// Reserves `job_key` for an attempt.
    ///
    /// Returns `None` when the key is `sent`, or `pending` and reserved less
    /// than `RESERVATION_LEASE_MINUTES` ago. Any other row, including an
    /// abandoned reservation, is re-armed to `pending` and keeps its retry
    /// count.
    async fn reserve(
        &self,
        occurrence_id: &ID,
        channel: DeliveryChannel,
        job_key: &str,
        now: i64,
    ) -> anyhow::Result<Option<DeliveryReservation>>;
    /// Records the outcome of a reserved attempt. Without `retry` the retry
    /// count is left as is and `next_retry_at` is cleared.
    async fn finalize(
        &self,
        log_id: &ID,
        status: DeliveryStatus,
        retry: Option<RetryState>,
        now: i64,
    ) -> anyhow::Result<()>;
    async fn find_by_occurrence(
        &self,
        occurrence_id: &ID,
    ) -> anyhow::Result<Vec<DeliveryLogEntry>>;
}
