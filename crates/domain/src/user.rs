use crate::shared::entity::{Entity, ID};

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: ID,
    pub email: Option<String>,
}

impl User {
    pub fn new(email: Option<String>) -> Self {
        Self {
            id: Default::default(),
            email,
        }
    }
}

impl Entity for User {
    fn id(&self) -> &ID {
        &self.id
    }
}

/// Access to a user's external calendar, used to look up free/busy information
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarConnection {
    pub user_id: ID,
    pub access_token: String,
    /// Calendars to consider, the provider's primary calendar when empty
    pub calendar_ids: Vec<String>,
}
