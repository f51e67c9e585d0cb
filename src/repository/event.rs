use diesel::prelude::*;

use crate::domain::event::Event;
use crate::domain::types::EventId;
use crate::models::event::Event as DbEvent;
use crate::repository::{DieselRepository, EventReader, EventWriter, RepositoryResult};

impl EventReader for DieselRepository {
    fn get_event_by_id(&self, id: &EventId) -> RepositoryResult<Option<Event>> {
        use crate::schema::events;

        let mut conn = self.conn()?;

        let event = events::table
            .filter(events::id.eq(id.as_str()))
            .select(DbEvent::as_select())
            .first::<DbEvent>(&mut conn)
            .optional()?;

        let event = event.map(TryInto::try_into).transpose()?;
        Ok(event)
    }
}

impl EventWriter for DieselRepository {
    fn upsert_event(&self, event: &Event) -> RepositoryResult<usize> {
        use crate::schema::events;

        let mut conn = self.conn()?;
        let db_event = DbEvent::from(event);

        let affected = diesel::insert_into(events::table)
            .values(&db_event)
            .on_conflict(events::id)
            .do_update()
            .set((
                events::category.eq(&db_event.category),
                events::is_active.eq(db_event.is_active),
            ))
            .execute(&mut conn)?;

        Ok(affected)
    }
}
