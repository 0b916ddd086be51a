use super::IOccurrenceRepo;
use crate::repos::shared::inmemory_repo::*;
use nudge_domain::{Occurrence, OccurrenceStatus, ID};

pub struct InMemoryOccurrenceRepo {
    occurrences: std::sync::Mutex<Vec<Occurrence>>,
}

impl InMemoryOccurrenceRepo {
    pub fn new() -> Self {
        Self {
            occurrences: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl IOccurrenceRepo for InMemoryOccurrenceRepo {
    async fn insert(&self, occurrence: &Occurrence) -> anyhow::Result<()> {
        insert(occurrence, &self.occurrences);
        Ok(())
    }

    async fn find(&self, occurrence_id: &ID) -> anyhow::Result<Option<Occurrence>> {
        Ok(find(occurrence_id, &self.occurrences))
    }

    async fn find_due(&self, now: i64) -> anyhow::Result<Vec<Occurrence>> {
        let mut due = find_by(&self.occurrences, |o| o.is_due(now));
        due.sort_by_key(|o| o.effective_due_at());
        Ok(due)
    }

    async fn update_snooze(
        &self,
        occurrence_id: &ID,
        snoozed_until: i64,
        status: OccurrenceStatus,
    ) -> anyhow::Result<()> {
        update_many(
            &self.occurrences,
            |o| o.id == *occurrence_id,
            |o| {
                o.snoozed_until = Some(snoozed_until);
                o.status = status;
            },
        );
        Ok(())
    }
}
