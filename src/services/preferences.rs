//! Preference accumulation and replay.
//!
//! Stored scores are a cache of [`replay`] over the swipe history; they can
//! always be rebuilt from it.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::preference::{UserPreference, replay};
use crate::domain::types::{EventCategory, PreferenceScore, SwipeDirection, UserId};
use crate::repository::{PreferenceReader, PreferenceWriter, SwipeReader};

use super::{ServiceError, ServiceResult};

/// Largest difference between stored and replayed scores treated as equal.
pub const REPLAY_TOLERANCE: f64 = 1e-9;

/// A category whose stored score disagrees with its replayed score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreferenceDrift {
    pub category: EventCategory,
    pub stored: Option<PreferenceScore>,
    pub replayed: PreferenceScore,
}

/// Applies one swipe's adjustment to the stored score and returns the result.
pub fn update_on_swipe<R>(
    repo: &R,
    user_id: &UserId,
    category: EventCategory,
    direction: SwipeDirection,
    at: NaiveDateTime,
) -> ServiceResult<PreferenceScore>
where
    R: PreferenceWriter,
{
    match repo.apply_swipe_adjustment(user_id, category, direction, at) {
        Ok(preference) => {
            log::debug!(
                "Preference of {user_id} for {category} is now {}",
                preference.score
            );
            Ok(preference.score)
        }
        Err(e) => {
            log::error!("Failed to update preference of {user_id} for {category}: {e}");
            Err(ServiceError::from(e))
        }
    }
}

/// Stored score for a category, or zero when the user never swiped it.
pub fn get_preference_score<R>(
    repo: &R,
    user_id: &UserId,
    category: EventCategory,
) -> ServiceResult<PreferenceScore>
where
    R: PreferenceReader,
{
    match repo.get_preference(user_id, category) {
        Ok(preference) => Ok(preference.map_or(PreferenceScore::ZERO, |p| p.score)),
        Err(e) => {
            log::error!("Failed to get preference: {e}");
            Err(ServiceError::from(e))
        }
    }
}

/// Recomputes every category score of a user from history alone.
pub fn replay_preferences<R>(
    repo: &R,
    user_id: &UserId,
) -> ServiceResult<BTreeMap<EventCategory, PreferenceScore>>
where
    R: SwipeReader,
{
    match repo.list_swipe_history(user_id) {
        Ok(history) => Ok(replay(&history)),
        Err(e) => {
            log::error!("Failed to list swipe history: {e}");
            Err(ServiceError::from(e))
        }
    }
}

/// Overwrites a user's stored scores with the replayed ones.
///
/// Each rebuilt score is stamped with the time of the last swipe that
/// touched its category.
pub fn rebuild_preferences<R>(repo: &R, user_id: &UserId) -> ServiceResult<Vec<UserPreference>>
where
    R: SwipeReader + PreferenceWriter,
{
    let history = match repo.list_swipe_history(user_id) {
        Ok(history) => history,
        Err(e) => {
            log::error!("Failed to list swipe history: {e}");
            return Err(ServiceError::from(e));
        }
    };

    let mut last_touched: BTreeMap<EventCategory, NaiveDateTime> = BTreeMap::new();
    for entry in &history {
        let at = last_touched.entry(entry.category).or_insert(entry.swiped_at);
        *at = (*at).max(entry.swiped_at);
    }

    let preferences: Vec<UserPreference> = replay(&history)
        .into_iter()
        .filter_map(|(category, score)| {
            last_touched.get(&category).map(|at| UserPreference {
                user_id: user_id.clone(),
                category,
                score,
                updated_at: *at,
            })
        })
        .collect();

    if let Err(e) = repo.replace_preferences(user_id, &preferences) {
        log::error!("Failed to replace preferences of {user_id}: {e}");
        return Err(ServiceError::from(e));
    }
    log::info!(
        "Rebuilt {} preference scores for {user_id} from {} swipes",
        preferences.len(),
        history.len()
    );

    Ok(preferences)
}

/// Lists categories whose stored score differs from the replayed score.
pub fn verify_preferences<R>(repo: &R, user_id: &UserId) -> ServiceResult<Vec<PreferenceDrift>>
where
    R: SwipeReader + PreferenceReader,
{
    let replayed = replay_preferences(repo, user_id)?;
    let stored: BTreeMap<EventCategory, PreferenceScore> = match repo.list_preferences(user_id) {
        Ok(preferences) => preferences
            .into_iter()
            .map(|p| (p.category, p.score))
            .collect(),
        Err(e) => {
            log::error!("Failed to list preferences: {e}");
            return Err(ServiceError::from(e));
        }
    };

    let drifts: Vec<PreferenceDrift> = EventCategory::ALL
        .iter()
        .filter_map(|category| {
            let stored = stored.get(category).copied();
            let replayed = replayed.get(category).copied();
            let expected = replayed.unwrap_or(PreferenceScore::ZERO);
            let agrees = match stored {
                Some(score) => (score.get() - expected.get()).abs() <= REPLAY_TOLERANCE,
                None => replayed.is_none(),
            };
            (!agrees).then_some(PreferenceDrift {
                category: *category,
                stored,
                replayed: expected,
            })
        })
        .collect();

    for drift in &drifts {
        log::warn!(
            "Preference drift for {user_id}/{}: stored {:?}, replayed {}",
            drift.category,
            drift.stored.map(PreferenceScore::get),
            drift.replayed
        );
    }

    Ok(drifts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::Event;
    use crate::domain::types::EventId;
    use crate::repository::InMemoryRepository;
    use crate::services::swipes::record_swipe;
    use chrono::DateTime;
    use proptest::prelude::*;

    fn at(seconds: i64) -> NaiveDateTime {
        DateTime::from_timestamp(seconds, 0).unwrap().naive_utc()
    }

    fn user() -> UserId {
        UserId::new("u1").unwrap()
    }

    fn event_id(index: usize) -> EventId {
        EventId::new(format!("e{index}")).unwrap()
    }

    fn catalog() -> InMemoryRepository {
        let categories = [EventCategory::Food, EventCategory::Culture, EventCategory::Food];
        InMemoryRepository::new().with_events(
            categories
                .iter()
                .enumerate()
                .map(|(i, category)| Event::new(event_id(i), *category))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn missing_score_reads_as_zero() {
        let repo = catalog();
        let score = get_preference_score(&repo, &user(), EventCategory::Nightlife).unwrap();
        assert_eq!(score, PreferenceScore::ZERO);
    }

    #[test]
    fn rebuild_repairs_tampered_scores() {
        let repo = catalog();
        record_swipe(&repo, &user(), &event_id(0), SwipeDirection::Right, at(0)).unwrap();
        record_swipe(&repo, &user(), &event_id(1), SwipeDirection::Up, at(1)).unwrap();

        repo.replace_preferences(
            &user(),
            &[UserPreference {
                user_id: user(),
                category: EventCategory::Food,
                score: PreferenceScore::new(0.9).unwrap(),
                updated_at: at(5),
            }],
        )
        .unwrap();

        let drifts = verify_preferences(&repo, &user()).unwrap();
        assert_eq!(drifts.len(), 2);

        let rebuilt = rebuild_preferences(&repo, &user()).unwrap();
        assert_eq!(rebuilt.len(), 2);
        assert_eq!(rebuilt[0].category, EventCategory::Culture);
        assert_eq!(rebuilt[0].updated_at, at(1));
        assert!(verify_preferences(&repo, &user()).unwrap().is_empty());
    }

    #[test]
    fn clock_moving_backwards_keeps_scores_replayable() {
        let repo = catalog();
        record_swipe(&repo, &user(), &event_id(0), SwipeDirection::Right, at(10)).unwrap();
        record_swipe(&repo, &user(), &event_id(2), SwipeDirection::Left, at(5)).unwrap();

        let stored = get_preference_score(&repo, &user(), EventCategory::Food).unwrap();
        assert!((stored.get() - 0.05).abs() < 1e-9);
        assert_eq!(replay_preferences(&repo, &user()).unwrap()[&EventCategory::Food], stored);
        assert!(verify_preferences(&repo, &user()).unwrap().is_empty());
    }

    #[test]
    fn update_on_swipe_adjusts_only_the_score() {
        let repo = catalog();
        let score =
            update_on_swipe(&repo, &user(), EventCategory::Culture, SwipeDirection::Down, at(0))
                .unwrap();
        assert!((score.get() - 0.02).abs() < 1e-9);
        assert!(repo.list_swipe_history(&user()).unwrap().is_empty());
    }

    fn direction_strategy() -> impl Strategy<Value = SwipeDirection> {
        prop::sample::select(SwipeDirection::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn incremental_scores_match_replay(
            swipes in prop::collection::vec((0usize..3, direction_strategy(), -3i64..4), 0..40)
        ) {
            let repo = catalog();
            let mut clock = 1_000;
            for (event, direction, step) in swipes {
                clock += step;
                record_swipe(&repo, &user(), &event_id(event), direction, at(clock)).unwrap();
            }

            let replayed = replay_preferences(&repo, &user()).unwrap();
            for category in [EventCategory::Food, EventCategory::Culture] {
                let stored = get_preference_score(&repo, &user(), category).unwrap();
                let expected = replayed.get(&category).copied().unwrap_or(PreferenceScore::ZERO);
                prop_assert!((stored.get() - expected.get()).abs() <= REPLAY_TOLERANCE);
            }
            prop_assert!(verify_preferences(&repo, &user()).unwrap().is_empty());
        }
    }
}
