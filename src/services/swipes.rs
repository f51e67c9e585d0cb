use chrono::NaiveDateTime;

use crate::domain::event::Event;
use crate::domain::swipe::{NewSwipe, RecordedSwipe, SwipeRecord};
use crate::domain::types::{EventId, SwipeDirection, UserId};
use crate::forms::swipes::{GestureFormPayload, SwipeFormPayload};
use crate::gesture::{SwipeThresholds, classify};
use crate::repository::{EventReader, SwipeListQuery, SwipeReader, SwipeWriter};

use super::{ServiceError, ServiceResult};

fn require_active_event<R>(repo: &R, event_id: &EventId) -> ServiceResult<Event>
where
    R: EventReader,
{
    match repo.get_event_by_id(event_id) {
        Ok(Some(event)) if event.is_active => Ok(event),
        Ok(Some(_)) => {
            log::warn!("Rejected swipe on inactive event {event_id}");
            Err(ServiceError::InvalidEvent(event_id.clone()))
        }
        Ok(None) => {
            log::warn!("Rejected swipe on unknown event {event_id}");
            Err(ServiceError::InvalidEvent(event_id.clone()))
        }
        Err(e) => {
            log::error!("Failed to get event: {e}");
            Err(ServiceError::from(e))
        }
    }
}

/// Records a swipe, reclassifying any earlier swipe on the same event.
///
/// The ledger write, the history append and the preference adjustment for
/// the new direction happen in one atomic write, so the stored score always
/// equals a replay of the history.
pub fn record_swipe<R>(
    repo: &R,
    user_id: &UserId,
    event_id: &EventId,
    direction: SwipeDirection,
    now: NaiveDateTime,
) -> ServiceResult<SwipeRecord>
where
    R: EventReader + SwipeWriter,
{
    let event = require_active_event(repo, event_id)?;

    let swipe = NewSwipe {
        user_id: user_id.clone(),
        event_id: event_id.clone(),
        category: event.category,
        direction,
        swiped_at: now,
    };

    match repo.record_swipe(&swipe) {
        Ok(RecordedSwipe { record, preference }) => {
            log::info!(
                "{user_id} filed {event_id} as {} ({direction})",
                direction.bucket()
            );
            log::debug!(
                "Preference of {user_id} for {} is now {}",
                preference.category,
                preference.score
            );
            Ok(record)
        }
        Err(e) => {
            log::error!("Failed to record swipe: {e}");
            Err(ServiceError::from(e))
        }
    }
}

/// Deletes the user's swipe on an event. Returns whether anything was removed.
pub fn remove_swipe<R>(repo: &R, user_id: &UserId, event_id: &EventId) -> ServiceResult<bool>
where
    R: SwipeWriter,
{
    match repo.remove_swipe(user_id, event_id) {
        Ok(affected) => {
            if affected > 0 {
                log::info!("{user_id} removed {event_id}");
            }
            Ok(affected > 0)
        }
        Err(e) => {
            log::error!("Failed to remove swipe: {e}");
            Err(ServiceError::from(e))
        }
    }
}

pub fn get_swipe<R>(
    repo: &R,
    user_id: &UserId,
    event_id: &EventId,
) -> ServiceResult<Option<SwipeRecord>>
where
    R: SwipeReader,
{
    match repo.get_swipe(user_id, event_id) {
        Ok(swipe) => Ok(swipe),
        Err(e) => {
            log::error!("Failed to get swipe: {e}");
            Err(ServiceError::from(e))
        }
    }
}

/// Live swipes of one direction, most recently updated first.
pub fn list_by_direction<R>(
    repo: &R,
    user_id: &UserId,
    direction: SwipeDirection,
) -> ServiceResult<Vec<SwipeRecord>>
where
    R: SwipeReader,
{
    match repo.list_swipes(SwipeListQuery::new(user_id.clone()).direction(direction)) {
        Ok((_total, swipes)) => Ok(swipes),
        Err(e) => {
            log::error!("Failed to list swipes: {e}");
            Err(ServiceError::from(e))
        }
    }
}

/// Records a swipe submitted with an explicit direction.
pub fn submit_swipe<R>(
    payload: SwipeFormPayload,
    repo: &R,
    now: NaiveDateTime,
) -> ServiceResult<SwipeRecord>
where
    R: EventReader + SwipeWriter,
{
    record_swipe(
        repo,
        &payload.user_id,
        &payload.event_id,
        payload.direction,
        now,
    )
}

/// Classifies a released gesture and records it when it is strong enough.
///
/// Returns `None` without touching the ledger when the card should snap back.
pub fn submit_gesture<R>(
    payload: GestureFormPayload,
    thresholds: &SwipeThresholds,
    repo: &R,
    now: NaiveDateTime,
) -> ServiceResult<Option<SwipeRecord>>
where
    R: EventReader + SwipeWriter,
{
    let Some(direction) = classify(payload.translation, payload.velocity, thresholds) else {
        log::debug!("Gesture on {} too weak to classify", payload.event_id);
        return Ok(None);
    };

    record_swipe(repo, &payload.user_id, &payload.event_id, direction, now).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{EventCategory, PreferenceScore};
    use crate::gesture::Vector2;
    use crate::repository::InMemoryRepository;
    use crate::services::buckets::{get_going, get_public, get_saved};
    use crate::services::preferences::{get_preference_score, verify_preferences};
    use chrono::DateTime;

    fn at(seconds: i64) -> NaiveDateTime {
        DateTime::from_timestamp(seconds, 0).unwrap().naive_utc()
    }

    fn u1() -> UserId {
        UserId::new("u1").unwrap()
    }

    fn e1() -> EventId {
        EventId::new("e1").unwrap()
    }

    fn sample_repo() -> InMemoryRepository {
        InMemoryRepository::new().with_events(vec![
            Event::new(e1(), EventCategory::Food),
            Event::new(EventId::new("closed").unwrap(), EventCategory::Culture).deactivated(),
        ])
        .unwrap()
    }

    fn food_score(repo: &InMemoryRepository) -> f64 {
        get_preference_score(repo, &u1(), EventCategory::Food)
            .unwrap()
            .get()
    }

    #[test]
    fn reclassifying_moves_event_between_buckets() {
        let repo = sample_repo();

        record_swipe(&repo, &u1(), &e1(), SwipeDirection::Right, at(0)).unwrap();
        let going = get_going(&repo, &u1()).unwrap();
        assert_eq!(going.len(), 1);
        assert_eq!(going[0].event_id, e1());
        assert!((food_score(&repo) - 0.10).abs() < 1e-9);

        let record = record_swipe(&repo, &u1(), &e1(), SwipeDirection::Left, at(1)).unwrap();
        assert_eq!(record.created_at, at(0));
        assert_eq!(record.updated_at, at(1));
        assert!(get_going(&repo, &u1()).unwrap().is_empty());
        assert!(get_saved(&repo, &u1()).unwrap().is_empty());
        assert!(get_public(&repo, &u1()).unwrap().is_empty());
        assert!((food_score(&repo) - 0.05).abs() < 1e-9);
    }

    #[test]
    fn unknown_event_is_rejected_without_side_effects() {
        let repo = sample_repo();
        let missing = EventId::new("missing").unwrap();

        let err = record_swipe(&repo, &u1(), &missing, SwipeDirection::Right, at(0)).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidEvent(ref id) if *id == missing));
        assert_eq!(get_swipe(&repo, &u1(), &missing).unwrap(), None);
        assert_eq!(food_score(&repo), 0.0);
    }

    #[test]
    fn inactive_event_is_rejected() {
        let repo = sample_repo();
        let closed = EventId::new("closed").unwrap();

        let err = record_swipe(&repo, &u1(), &closed, SwipeDirection::Up, at(0)).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidEvent(_)));
        assert_eq!(
            get_preference_score(&repo, &u1(), EventCategory::Culture).unwrap(),
            PreferenceScore::ZERO
        );
    }

    #[test]
    fn removal_is_idempotent() {
        let repo = sample_repo();
        assert!(!remove_swipe(&repo, &u1(), &e1()).unwrap());

        record_swipe(&repo, &u1(), &e1(), SwipeDirection::Down, at(0)).unwrap();
        assert!(remove_swipe(&repo, &u1(), &e1()).unwrap());
        assert!(!remove_swipe(&repo, &u1(), &e1()).unwrap());
        assert_eq!(get_swipe(&repo, &u1(), &e1()).unwrap(), None);
    }

    #[test]
    fn removal_keeps_preference_score() {
        let repo = sample_repo();
        record_swipe(&repo, &u1(), &e1(), SwipeDirection::Right, at(0)).unwrap();
        remove_swipe(&repo, &u1(), &e1()).unwrap();
        assert!((food_score(&repo) - 0.10).abs() < 1e-9);
    }

    #[test]
    fn weak_gesture_leaves_ledger_untouched() {
        let repo = sample_repo();
        let payload = GestureFormPayload {
            user_id: u1(),
            event_id: e1(),
            translation: Vector2::new(40.0, 10.0),
            velocity: Vector2::new(100.0, 0.0),
        };

        let result = submit_gesture(payload, &SwipeThresholds::default(), &repo, at(0)).unwrap();
        assert_eq!(result, None);
        assert_eq!(get_swipe(&repo, &u1(), &e1()).unwrap(), None);
    }

    #[test]
    fn strong_gesture_is_recorded() {
        let repo = sample_repo();
        let payload = GestureFormPayload {
            user_id: u1(),
            event_id: e1(),
            translation: Vector2::new(-20.0, -180.0),
            velocity: Vector2::default(),
        };

        let record = submit_gesture(payload, &SwipeThresholds::default(), &repo, at(0))
            .unwrap()
            .unwrap();
        assert_eq!(record.direction, SwipeDirection::Up);
        assert_eq!(get_public(&repo, &u1()).unwrap(), vec![record]);
    }

    #[test]
    fn concurrent_swipes_on_one_event_leave_one_record() {
        let repo = sample_repo();
        std::thread::scope(|scope| {
            for (i, direction) in SwipeDirection::ALL.iter().cycle().take(16).enumerate() {
                let repo = &repo;
                scope.spawn(move || {
                    record_swipe(repo, &u1(), &e1(), *direction, at(i as i64)).unwrap();
                });
            }
        });

        let (total, _) = repo.list_swipes(SwipeListQuery::new(u1())).unwrap();
        assert_eq!(total, 1);
        assert_eq!(repo.list_swipe_history(&u1()).unwrap().len(), 16);
        assert!(verify_preferences(&repo, &u1()).unwrap().is_empty());
    }

    #[test]
    fn concurrent_swipes_across_events_keep_scores_replayable() {
        let repo = InMemoryRepository::new()
            .with_events(
                (0..8)
                    .map(|i| Event::new(EventId::new(format!("f{i}")).unwrap(), EventCategory::Food))
                    .collect(),
            )
            .unwrap();
        std::thread::scope(|scope| {
            for i in 0..32usize {
                let repo = &repo;
                let direction = if i % 3 == 0 {
                    SwipeDirection::Left
                } else {
                    SwipeDirection::Right
                };
                scope.spawn(move || {
                    let event = EventId::new(format!("f{}", i % 8)).unwrap();
                    // Later threads use earlier timestamps.
                    record_swipe(repo, &u1(), &event, direction, at(100 - i as i64)).unwrap();
                });
            }
        });

        assert_eq!(repo.list_swipe_history(&u1()).unwrap().len(), 32);
        assert!(verify_preferences(&repo, &u1()).unwrap().is_empty());
    }
}
