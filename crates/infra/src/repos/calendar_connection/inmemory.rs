use super::ICalendarConnectionRepo;
use crate::repos::shared::inmemory_repo::*;
use nudge_domain::{CalendarConnection, ID};

pub struct InMemoryCalendarConnectionRepo {
    connections: std::sync::Mutex<Vec<CalendarConnection>>,
}

impl InMemoryCalendarConnectionRepo {
    pub fn new() -> Self {
        Self {
            connections: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl ICalendarConnectionRepo for InMemoryCalendarConnectionRepo {
    async fn upsert(&self, connection: &CalendarConnection) -> anyhow::Result<()> {
        upsert_by(connection, &self.connections, |c| {
            c.user_id == connection.user_id
        });
        Ok(())
    }

    async fn find_by_user(&self, user_id: &ID) -> anyhow::Result<Option<CalendarConnection>> {
        Ok(find_by(&self.connections, |c| c.user_id == *user_id).pop())
    }
}
