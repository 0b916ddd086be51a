use super::IDeliveryLogRepo;
use crate::repos::shared::inmemory_repo::*;
use nudge_domain::{
    DeliveryChannel, DeliveryLogEntry, DeliveryReservation, DeliveryStatus, RetryState, ID,
};

pub struct InMemoryDeliveryLogRepo {
    logs: std::sync::Mutex<Vec<DeliveryLogEntry>>,
}

impl InMemoryDeliveryLogRepo {
    pub fn new() -> Self {
        Self {
            logs: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl IDeliveryLogRepo for InMemoryDeliveryLogRepo {
    async fn reserve(
        &self,
        occurrence_id: &ID,
        channel: DeliveryChannel,
        job_key: &str,
        now: i64,
    ) -> anyhow::Result<Option<DeliveryReservation>> {
        // Check and write under one lock so that reservations stay exclusive
        let mut logs = self.logs.lock().unwrap();
        match logs.iter_mut().find(|log| log.job_key == job_key) {
            Some(log) if log.blocks_reservation(now) => Ok(None),
            Some(log) => {
                log.status = DeliveryStatus::Pending;
                log.attempted_at = now;
                log.updated_at = now;
                Ok(Some(DeliveryReservation {
                    log_id: log.id.clone(),
                    retry_count: log.retry_count,
                }))
            }
            None => {
                let log = DeliveryLogEntry::reserve(
                    occurrence_id.clone(),
                    channel,
                    job_key.to_string(),
                    now,
                );
                let reservation = DeliveryReservation {
                    log_id: log.id.clone(),
                    retry_count: log.retry_count,
                };
                logs.push(log);
                Ok(Some(reservation))
            }
        }
    }

    async fn finalize(
        &self,
        log_id: &ID,
        status: DeliveryStatus,
        retry: Option<RetryState>,
        now: i64,
    ) -> anyhow::Result<()> {
        update_many(
            &self.logs,
            |log| log.id == *log_id,
            |log| {
                log.status = status;
                log.updated_at = now;
                match retry {
                    Some(retry) => {
                        log.retry_count = retry.retry_count;
                        log.next_retry_at = retry.next_retry_at;
                    }
                    None => log.next_retry_at = None,
                }
            },
        );
        Ok(())
    }

    async fn find_by_occurrence(&self, occurrence_id: &ID) -> anyhow::Result<Vec<DeliveryLogEntry>> {
        Ok(find_by(&self.logs, |log| log.occurrence_id == *occurrence_id))
    }
}
