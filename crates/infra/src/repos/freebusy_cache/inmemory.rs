use super::IFreeBusyCacheRepo;
use crate::repos::shared::inmemory_repo::*;
use nudge_domain::{FreeBusyCacheEntry, ID};

pub struct InMemoryFreeBusyCacheRepo {
    entries: std::sync::Mutex<Vec<FreeBusyCacheEntry>>,
}

impl InMemoryFreeBusyCacheRepo {
    pub fn new() -> Self {
        Self {
            entries: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl IFreeBusyCacheRepo for InMemoryFreeBusyCacheRepo {
    async fn find(&self, user_id: &ID) -> anyhow::Result<Option<FreeBusyCacheEntry>> {
        Ok(find_by(&self.entries, |e| e.user_id == *user_id).pop())
    }

    async fn save(&self, entry: &FreeBusyCacheEntry) -> anyhow::Result<()> {
        upsert_by(entry, &self.entries, |e| e.user_id == entry.user_id);
        Ok(())
    }
}
