//! Category affinity derived from swipe history.
//!
//! Scores start at [`PreferenceScore::ZERO`], move by a fixed amount per
//! swipe direction and saturate at the bounds of [`PreferenceScore`]. A
//! reclassification applies the new direction's adjustment only; the earlier
//! adjustment stays in the score.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::swipe::SwipeHistoryEntry;
use crate::domain::types::{EventCategory, PreferenceScore, SwipeDirection, UserId};

/// Score change applied when a user swipes an event of a category.
pub const fn adjustment(direction: SwipeDirection) -> f64 {
    match direction {
        SwipeDirection::Right => 0.10,
        SwipeDirection::Up => 0.05,
        SwipeDirection::Down => 0.02,
        SwipeDirection::Left => -0.05,
    }
}

/// Stored affinity of a user for one category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserPreference {
    pub user_id: UserId,
    pub category: EventCategory,
    pub score: PreferenceScore,
    pub updated_at: NaiveDateTime,
}

impl PreferenceScore {
    /// Score after one more swipe in `direction`.
    pub fn after_swipe(self, direction: SwipeDirection) -> Self {
        self.saturating_add(adjustment(direction))
    }
}

/// Recomputes every category score by folding history in replay order.
///
/// Entries may arrive in any order; they are sorted by
/// [`SwipeHistoryEntry::replay_order`] before folding.
pub fn replay(entries: &[SwipeHistoryEntry]) -> BTreeMap<EventCategory, PreferenceScore> {
    let mut ordered: Vec<&SwipeHistoryEntry> = entries.iter().collect();
    ordered.sort_by(|a, b| SwipeHistoryEntry::replay_order(a, b));

    ordered
        .into_iter()
        .fold(BTreeMap::new(), |mut scores, entry| {
            let score = scores.entry(entry.category).or_insert(PreferenceScore::ZERO);
            *score = score.after_swipe(entry.direction);
            scores
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::EventId;
    use chrono::DateTime;

    fn entry(
        sequence: i64,
        category: EventCategory,
        direction: SwipeDirection,
        seconds: i64,
    ) -> SwipeHistoryEntry {
        SwipeHistoryEntry {
            sequence,
            user_id: UserId::new("u1").unwrap(),
            event_id: EventId::new(format!("e{sequence}")).unwrap(),
            category,
            direction,
            swiped_at: DateTime::from_timestamp(seconds, 0).unwrap().naive_utc(),
        }
    }

    fn approx(score: PreferenceScore, expected: f64) -> bool {
        (score.get() - expected).abs() < 1e-9
    }

    #[test]
    fn reclassification_does_not_reverse_previous_adjustment() {
        let history = vec![
            entry(1, EventCategory::Food, SwipeDirection::Right, 0),
            entry(2, EventCategory::Food, SwipeDirection::Left, 1),
        ];
        let scores = replay(&history);
        assert!(approx(scores[&EventCategory::Food], 0.05));
    }

    #[test]
    fn negative_adjustments_saturate_at_zero() {
        let history = vec![
            entry(1, EventCategory::Outdoor, SwipeDirection::Left, 0),
            entry(2, EventCategory::Outdoor, SwipeDirection::Right, 1),
        ];
        let scores = replay(&history);
        assert!(approx(scores[&EventCategory::Outdoor], 0.10));
    }

    #[test]
    fn scores_saturate_at_one() {
        let history: Vec<_> = (0..15)
            .map(|i| entry(i, EventCategory::Culture, SwipeDirection::Right, i))
            .collect();
        assert_eq!(replay(&history)[&EventCategory::Culture].get(), 1.0);
    }

    #[test]
    fn replay_follows_append_order_not_timestamps() {
        // Left-then-Right gives 0.10, Right-then-Left gives 0.05.
        let history = vec![
            entry(2, EventCategory::Food, SwipeDirection::Left, 5),
            entry(1, EventCategory::Food, SwipeDirection::Right, 10),
        ];
        assert!(approx(replay(&history)[&EventCategory::Food], 0.05));
    }

    #[test]
    fn categories_are_independent() {
        let history = vec![
            entry(1, EventCategory::Food, SwipeDirection::Up, 0),
            entry(2, EventCategory::Fitness, SwipeDirection::Down, 1),
        ];
        let scores = replay(&history);
        assert!(approx(scores[&EventCategory::Food], 0.05));
        assert!(approx(scores[&EventCategory::Fitness], 0.02));
        assert!(!scores.contains_key(&EventCategory::Nightlife));
    }
}
