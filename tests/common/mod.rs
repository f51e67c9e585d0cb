//! Helpers for integration tests.

use chrono::{DateTime, NaiveDateTime};
use godo_swipes::db::{DbPool, establish_connection_pool, run_pending_migrations};
use godo_swipes::domain::event::Event;
use godo_swipes::domain::types::{EventCategory, EventId, UserId};
use godo_swipes::repository::{DieselRepository, EventWriter};
use tempfile::NamedTempFile;

/// Temporary database used in integration tests.
pub struct TestDb {
    _tempfile: NamedTempFile,
    pool: DbPool,
}

impl TestDb {
    pub fn new() -> Self {
        let tempfile = NamedTempFile::new().expect("Failed to create temp file");
        let pool = establish_connection_pool(tempfile.path().to_str().unwrap())
            .expect("Failed to establish SQLite connection.");
        run_pending_migrations(&pool).expect("Migrations failed");
        TestDb {
            _tempfile: tempfile,
            pool,
        }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    /// Repository over this database with `events` already in the catalog.
    pub fn repo_with_events(&self, events: &[Event]) -> DieselRepository {
        let repo = DieselRepository::new(self.pool());
        for event in events {
            repo.upsert_event(event).expect("should seed event");
        }
        repo
    }
}

pub fn user(id: &str) -> UserId {
    UserId::new(id).expect("valid user id")
}

pub fn event_id(id: &str) -> EventId {
    EventId::new(id).expect("valid event id")
}

pub fn event(id: &str, category: EventCategory) -> Event {
    Event::new(event_id(id), category)
}

/// Deterministic timestamp `seconds` after the epoch.
pub fn at(seconds: i64) -> NaiveDateTime {
    DateTime::from_timestamp(seconds, 0)
        .expect("valid timestamp")
        .naive_utc()
}
