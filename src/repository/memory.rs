use std::collections::{BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDateTime;

use crate::domain::event::Event;
use crate::domain::preference::UserPreference;
use crate::domain::swipe::{
    BucketStats, DirectionCounts, NewSwipe, RecordedSwipe, SwipeHistoryEntry, SwipeRecord,
};
use crate::domain::types::{EventCategory, EventId, PreferenceScore, SwipeDirection, UserId};
use crate::repository::{
    EventReader, EventWriter, PreferenceReader, PreferenceWriter, RepositoryError,
    RepositoryResult, SwipeListQuery, SwipeReader, SwipeWriter,
};

#[derive(Default)]
struct LedgerState {
    events: HashMap<EventId, Event>,
    swipes: HashMap<(UserId, EventId), SwipeRecord>,
    history: Vec<SwipeHistoryEntry>,
    preferences: HashMap<(UserId, EventCategory), UserPreference>,
}

impl LedgerState {
    fn adjust_preference(
        &mut self,
        user_id: &UserId,
        category: EventCategory,
        direction: SwipeDirection,
        at: NaiveDateTime,
    ) -> UserPreference {
        let key = (user_id.clone(), category);
        let current = self
            .preferences
            .get(&key)
            .map_or(PreferenceScore::ZERO, |p| p.score);
        let preference = UserPreference {
            user_id: user_id.clone(),
            category,
            score: current.after_swipe(direction),
            updated_at: at,
        };
        self.preferences.insert(key, preference.clone());
        preference
    }
}

/// Ledger held in process memory.
///
/// A single reader-writer lock guards all state: writers are serialized and
/// readers always see whole records, never a half-applied swipe.
#[derive(Default)]
pub struct InMemoryRepository {
    state: RwLock<LedgerState>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the catalog with `events`.
    pub fn with_events(self, events: Vec<Event>) -> RepositoryResult<Self> {
        self.write()?
            .events
            .extend(events.into_iter().map(|e| (e.id.clone(), e)));
        Ok(self)
    }

    fn read(&self) -> RepositoryResult<RwLockReadGuard<'_, LedgerState>> {
        self.state.read().map_err(|_| RepositoryError::LockPoisoned)
    }

    fn write(&self) -> RepositoryResult<RwLockWriteGuard<'_, LedgerState>> {
        self.state.write().map_err(|_| RepositoryError::LockPoisoned)
    }
}

impl EventReader for InMemoryRepository {
    fn get_event_by_id(&self, id: &EventId) -> RepositoryResult<Option<Event>> {
        Ok(self.read()?.events.get(id).cloned())
    }
}

impl EventWriter for InMemoryRepository {
    fn upsert_event(&self, event: &Event) -> RepositoryResult<usize> {
        self.write()?.events.insert(event.id.clone(), event.clone());
        Ok(1)
    }
}

impl SwipeReader for InMemoryRepository {
    fn get_swipe(
        &self,
        user_id: &UserId,
        event_id: &EventId,
    ) -> RepositoryResult<Option<SwipeRecord>> {
        let key = (user_id.clone(), event_id.clone());
        Ok(self.read()?.swipes.get(&key).cloned())
    }

    fn list_swipes(&self, query: SwipeListQuery) -> RepositoryResult<(usize, Vec<SwipeRecord>)> {
        let mut items: Vec<SwipeRecord> = self
            .read()?
            .swipes
            .values()
            .filter(|s| s.user_id == query.user_id && query.matches(s.direction))
            .cloned()
            .collect();
        items.sort_by(SwipeRecord::recency_order);

        let total = items.len();
        if let Some(pagination) = &query.pagination {
            items = pagination.apply(items);
        }
        Ok((total, items))
    }

    fn swipe_stats(&self, user_id: &UserId) -> RepositoryResult<BucketStats> {
        let state = self.read()?;
        let owned: Vec<&SwipeRecord> = state
            .swipes
            .values()
            .filter(|s| &s.user_id == user_id)
            .collect();

        let counts: DirectionCounts = owned.iter().map(|s| s.direction).collect();
        let last_swiped_at = owned.iter().map(|s| s.updated_at).max();
        Ok(BucketStats::new(counts, last_swiped_at))
    }

    fn count_event_swipes(&self, event_id: &EventId) -> RepositoryResult<DirectionCounts> {
        Ok(self
            .read()?
            .swipes
            .values()
            .filter(|s| &s.event_id == event_id)
            .map(|s| s.direction)
            .collect())
    }

    fn list_swipe_history(&self, user_id: &UserId) -> RepositoryResult<Vec<SwipeHistoryEntry>> {
        let mut entries: Vec<SwipeHistoryEntry> = self
            .read()?
            .history
            .iter()
            .filter(|h| &h.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by(SwipeHistoryEntry::replay_order);
        Ok(entries)
    }

    fn list_swiping_users(&self) -> RepositoryResult<Vec<UserId>> {
        let users: BTreeSet<UserId> = self
            .read()?
            .history
            .iter()
            .map(|h| h.user_id.clone())
            .collect();
        Ok(users.into_iter().collect())
    }
}

impl SwipeWriter for InMemoryRepository {
    fn record_swipe(&self, swipe: &NewSwipe) -> RepositoryResult<RecordedSwipe> {
        let mut state = self.write()?;
        let key = (swipe.user_id.clone(), swipe.event_id.clone());

        let created_at = state
            .swipes
            .get(&key)
            .map_or(swipe.swiped_at, |existing| existing.created_at);
        let record = SwipeRecord {
            user_id: swipe.user_id.clone(),
            event_id: swipe.event_id.clone(),
            direction: swipe.direction,
            created_at,
            updated_at: swipe.swiped_at,
        };
        state.swipes.insert(key, record.clone());

        let sequence = state.history.len() as i64 + 1;
        state.history.push(SwipeHistoryEntry {
            sequence,
            user_id: swipe.user_id.clone(),
            event_id: swipe.event_id.clone(),
            category: swipe.category,
            direction: swipe.direction,
            swiped_at: swipe.swiped_at,
        });

        let preference = state.adjust_preference(
            &swipe.user_id,
            swipe.category,
            swipe.direction,
            swipe.swiped_at,
        );

        Ok(RecordedSwipe { record, preference })
    }

    fn remove_swipe(&self, user_id: &UserId, event_id: &EventId) -> RepositoryResult<usize> {
        let key = (user_id.clone(), event_id.clone());
        Ok(self.write()?.swipes.remove(&key).map_or(0, |_| 1))
    }
}

impl PreferenceReader for InMemoryRepository {
    fn get_preference(
        &self,
        user_id: &UserId,
        category: EventCategory,
    ) -> RepositoryResult<Option<UserPreference>> {
        let key = (user_id.clone(), category);
        Ok(self.read()?.preferences.get(&key).cloned())
    }

    fn list_preferences(&self, user_id: &UserId) -> RepositoryResult<Vec<UserPreference>> {
        let mut preferences: Vec<UserPreference> = self
            .read()?
            .preferences
            .values()
            .filter(|p| &p.user_id == user_id)
            .cloned()
            .collect();
        preferences.sort_by_key(|p| p.category);
        Ok(preferences)
    }
}

impl PreferenceWriter for InMemoryRepository {
    fn apply_swipe_adjustment(
        &self,
        user_id: &UserId,
        category: EventCategory,
        direction: SwipeDirection,
        at: NaiveDateTime,
    ) -> RepositoryResult<UserPreference> {
        Ok(self
            .write()?
            .adjust_preference(user_id, category, direction, at))
    }

    fn replace_preferences(
        &self,
        user_id: &UserId,
        preferences: &[UserPreference],
    ) -> RepositoryResult<usize> {
        let mut state = self.write()?;
        state.preferences.retain(|(owner, _), _| owner != user_id);
        for preference in preferences {
            state.preferences.insert(
                (user_id.clone(), preference.category),
                UserPreference {
                    user_id: user_id.clone(),
                    ..preference.clone()
                },
            );
        }
        Ok(preferences.len())
    }
}
