use serde::{Deserialize, Serialize};

use crate::domain::types::{EventCategory, EventId};

/// Catalog entry the ledger validates swipes against.
///
/// Events are owned by the catalog; the ledger only reads them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    pub id: EventId,
    pub category: EventCategory,
    pub is_active: bool,
}

impl Event {
    pub fn new(id: EventId, category: EventCategory) -> Self {
        Self {
            id,
            category,
            is_active: true,
        }
    }

    /// Marks the event as no longer accepting swipes.
    pub fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }
}
