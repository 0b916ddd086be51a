use crate::shared::entity::{Entity, ID};

/// The parts of a household `Reminder` that notification dispatch needs.
/// Reminders are owned and edited elsewhere, this is a read model.
#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub id: ID,
    /// The household member who receives the notifications. Reminders
    /// without an owner are never dispatched.
    pub owner_id: Option<ID>,
    pub title: String,
    pub notes: Option<String>,
    pub is_active: bool,
}

impl Reminder {
    pub fn new(owner_id: ID, title: impl Into<String>) -> Self {
        Self {
            id: Default::default(),
            owner_id: Some(owner_id),
            title: title.into(),
            notes: None,
            is_active: true,
        }
    }
}

impl Entity for Reminder {
    fn id(&self) -> &ID {
        &self.id
    }
}
