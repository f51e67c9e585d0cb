use chrono::NaiveDateTime;

use crate::db::{DbConnection, DbPool};
use crate::domain::event::Event;
use crate::domain::preference::UserPreference;
use crate::domain::swipe::{
    BucketStats, DirectionCounts, NewSwipe, RecordedSwipe, SwipeHistoryEntry, SwipeRecord,
};
use crate::domain::types::{EventCategory, EventId, SwipeDirection, UserId};
use crate::pagination::Pagination;

pub use errors::{RepositoryError, RepositoryResult};
pub use memory::InMemoryRepository;

pub mod errors;
pub mod event;
pub mod memory;
pub mod preference;
pub mod swipe;

/// Repository implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be passed around freely between callers.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a pooled database connection.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Query parameters used when listing a user's live swipes.
///
/// Results are ordered by `updated_at` descending, then by event id.
#[derive(Debug, Clone)]
pub struct SwipeListQuery {
    /// Owner of the swipes.
    pub user_id: UserId,
    /// Directions to include; empty means every direction.
    pub directions: Vec<SwipeDirection>,
    /// Pagination parameters.
    pub pagination: Option<Pagination>,
}

impl SwipeListQuery {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            directions: Vec::new(),
            pagination: None,
        }
    }
    pub fn direction(mut self, direction: SwipeDirection) -> Self {
        if !self.directions.contains(&direction) {
            self.directions.push(direction);
        }
        self
    }
    pub fn directions(self, directions: &[SwipeDirection]) -> Self {
        directions
            .iter()
            .fold(self, |query, direction| query.direction(*direction))
    }
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }

    /// Whether a record with `direction` belongs in the result.
    pub fn matches(&self, direction: SwipeDirection) -> bool {
        self.directions.is_empty() || self.directions.contains(&direction)
    }
}

/// Read-only access to the event catalog.
pub trait EventReader {
    /// Retrieve an event by its identifier.
    fn get_event_by_id(&self, id: &EventId) -> RepositoryResult<Option<Event>>;
}

/// Catalog maintenance used for seeding and deactivation.
pub trait EventWriter {
    /// Insert the event or overwrite its category and active flag.
    fn upsert_event(&self, event: &Event) -> RepositoryResult<usize>;
}

/// Read-only operations over the swipe ledger.
pub trait SwipeReader {
    /// Retrieve the live swipe for a user and event.
    fn get_swipe(&self, user_id: &UserId, event_id: &EventId)
    -> RepositoryResult<Option<SwipeRecord>>;
    /// List live swipes matching the query, returning the unpaginated total.
    fn list_swipes(&self, query: SwipeListQuery) -> RepositoryResult<(usize, Vec<SwipeRecord>)>;
    /// Per-bucket tallies and the most recent `updated_at` of a user's live
    /// swipes, read from a single snapshot.
    fn swipe_stats(&self, user_id: &UserId) -> RepositoryResult<BucketStats>;
    /// Count live swipes on an event per direction, across all users.
    fn count_event_swipes(&self, event_id: &EventId) -> RepositoryResult<DirectionCounts>;
    /// Every history entry of a user in replay order.
    fn list_swipe_history(&self, user_id: &UserId) -> RepositoryResult<Vec<SwipeHistoryEntry>>;
    /// Identifiers of every user with at least one history entry.
    fn list_swiping_users(&self) -> RepositoryResult<Vec<UserId>>;
}

/// Write operations over the swipe ledger.
pub trait SwipeWriter {
    /// Insert or reclassify the swipe, append it to history and apply its
    /// preference adjustment, all in one atomic write.
    ///
    /// Scores are accumulated in history order, so replaying the history
    /// always reproduces them.
    fn record_swipe(&self, swipe: &NewSwipe) -> RepositoryResult<RecordedSwipe>;
    /// Delete the live swipe, leaving history untouched.
    fn remove_swipe(&self, user_id: &UserId, event_id: &EventId) -> RepositoryResult<usize>;
}

/// Read-only access to stored preference scores.
pub trait PreferenceReader {
    /// Retrieve the stored score for a user and category.
    fn get_preference(
        &self,
        user_id: &UserId,
        category: EventCategory,
    ) -> RepositoryResult<Option<UserPreference>>;
    /// List every stored score of a user ordered by category.
    fn list_preferences(&self, user_id: &UserId) -> RepositoryResult<Vec<UserPreference>>;
}

/// Write operations for preference scores.
pub trait PreferenceWriter {
    /// Apply one swipe's adjustment as an atomic read-modify-write.
    fn apply_swipe_adjustment(
        &self,
        user_id: &UserId,
        category: EventCategory,
        direction: SwipeDirection,
        at: NaiveDateTime,
    ) -> RepositoryResult<UserPreference>;
    /// Replace every stored score of a user with `preferences`.
    fn replace_preferences(
        &self,
        user_id: &UserId,
        preferences: &[UserPreference],
    ) -> RepositoryResult<usize>;
}
