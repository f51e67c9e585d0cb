use diesel::prelude::*;

use crate::domain::event::Event as DomainEvent;
use crate::domain::types::{EventCategory, EventId, TypeConstraintError};

/// Diesel model representing the `events` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::events)]
pub struct Event {
    pub id: String,
    pub category: String,
    pub is_active: bool,
}

impl TryFrom<Event> for DomainEvent {
    type Error = TypeConstraintError;

    fn try_from(event: Event) -> Result<Self, Self::Error> {
        Ok(Self {
            id: EventId::new(event.id)?,
            category: EventCategory::try_from(event.category)?,
            is_active: event.is_active,
        })
    }
}

impl From<&DomainEvent> for Event {
    fn from(event: &DomainEvent) -> Self {
        Self {
            id: event.id.as_str().to_string(),
            category: event.category.as_str().to_string(),
            is_active: event.is_active,
        }
    }
}
