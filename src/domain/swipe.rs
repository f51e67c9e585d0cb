use std::cmp::Ordering;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::preference::UserPreference;
use crate::domain::types::{EventCategory, EventId, SwipeDirection, UserId};

/// The single live swipe a user holds on an event.
///
/// `created_at` is fixed by the first swipe; `updated_at` moves with every
/// reclassification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SwipeRecord {
    pub user_id: UserId,
    pub event_id: EventId,
    pub direction: SwipeDirection,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl SwipeRecord {
    /// Display order for bucket listings: most recent first, then by event.
    pub fn recency_order(a: &Self, b: &Self) -> Ordering {
        b.updated_at
            .cmp(&a.updated_at)
            .then_with(|| a.event_id.cmp(&b.event_id))
    }
}

/// Data required to record a swipe.
///
/// The category is captured from the catalog at swipe time and written to
/// the history alongside the direction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewSwipe {
    pub user_id: UserId,
    pub event_id: EventId,
    pub category: EventCategory,
    pub direction: SwipeDirection,
    pub swiped_at: NaiveDateTime,
}

/// Immutable history row written for every recorded swipe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SwipeHistoryEntry {
    pub sequence: i64,
    pub user_id: UserId,
    pub event_id: EventId,
    pub category: EventCategory,
    pub direction: SwipeDirection,
    pub swiped_at: NaiveDateTime,
}

impl SwipeHistoryEntry {
    /// Replay order: the order entries were appended in.
    ///
    /// `swiped_at` is caller-supplied and may move backwards, so it never
    /// decides the order scores were accumulated in.
    pub fn replay_order(a: &Self, b: &Self) -> Ordering {
        a.sequence.cmp(&b.sequence)
    }
}

/// Outcome of a recorded swipe: the live record and the category score the
/// same write left behind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordedSwipe {
    pub record: SwipeRecord,
    pub preference: UserPreference,
}

/// Number of live swipes per direction.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DirectionCounts {
    pub right: usize,
    pub left: usize,
    pub up: usize,
    pub down: usize,
}

impl DirectionCounts {
    pub fn add(&mut self, direction: SwipeDirection, count: usize) {
        match direction {
            SwipeDirection::Right => self.right += count,
            SwipeDirection::Left => self.left += count,
            SwipeDirection::Up => self.up += count,
            SwipeDirection::Down => self.down += count,
        }
    }

    pub fn get(&self, direction: SwipeDirection) -> usize {
        match direction {
            SwipeDirection::Right => self.right,
            SwipeDirection::Left => self.left,
            SwipeDirection::Up => self.up,
            SwipeDirection::Down => self.down,
        }
    }

    pub fn total(&self) -> usize {
        self.right + self.left + self.up + self.down
    }
}

impl FromIterator<SwipeDirection> for DirectionCounts {
    fn from_iter<I: IntoIterator<Item = SwipeDirection>>(iter: I) -> Self {
        let mut counts = Self::default();
        for direction in iter {
            counts.add(direction, 1);
        }
        counts
    }
}

/// Bucket tallies for one user's calendar and stats views.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BucketStats {
    pub going: usize,
    pub public: usize,
    pub saved: usize,
    pub pass: usize,
    pub total: usize,
    pub last_swiped_at: Option<NaiveDateTime>,
}

impl BucketStats {
    pub fn new(counts: DirectionCounts, last_swiped_at: Option<NaiveDateTime>) -> Self {
        Self {
            going: counts.right,
            public: counts.up,
            saved: counts.down,
            pass: counts.left,
            total: counts.total(),
            last_swiped_at,
        }
    }
}

/// How users collectively filed a single event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventSwipeAnalytics {
    pub event_id: EventId,
    pub counts: DirectionCounts,
    pub total: usize,
    pub right_rate: f64,
    pub left_rate: f64,
    pub up_rate: f64,
    pub down_rate: f64,
}

impl EventSwipeAnalytics {
    pub fn new(event_id: EventId, counts: DirectionCounts) -> Self {
        let total = counts.total();
        let rate = |direction| {
            if total == 0 {
                0.0
            } else {
                counts.get(direction) as f64 / total as f64
            }
        };
        Self {
            event_id,
            total,
            right_rate: rate(SwipeDirection::Right),
            left_rate: rate(SwipeDirection::Left),
            up_rate: rate(SwipeDirection::Up),
            down_rate: rate(SwipeDirection::Down),
            counts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn at(seconds: i64) -> NaiveDateTime {
        DateTime::from_timestamp(seconds, 0).unwrap().naive_utc()
    }

    fn record(event: &str, updated: i64) -> SwipeRecord {
        SwipeRecord {
            user_id: UserId::new("u1").unwrap(),
            event_id: EventId::new(event).unwrap(),
            direction: SwipeDirection::Right,
            created_at: at(0),
            updated_at: at(updated),
        }
    }

    #[test]
    fn recency_order_puts_latest_first() {
        let mut records = vec![record("a", 1), record("c", 5), record("b", 5)];
        records.sort_by(SwipeRecord::recency_order);
        let ids: Vec<&str> = records.iter().map(|r| r.event_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn analytics_rates_are_zero_without_swipes() {
        let analytics =
            EventSwipeAnalytics::new(EventId::new("e1").unwrap(), DirectionCounts::default());
        assert_eq!(analytics.total, 0);
        assert_eq!(analytics.right_rate, 0.0);
    }

    #[test]
    fn analytics_rates_sum_to_one() {
        let counts: DirectionCounts = [
            SwipeDirection::Right,
            SwipeDirection::Right,
            SwipeDirection::Left,
            SwipeDirection::Down,
        ]
        .into_iter()
        .collect();
        let analytics = EventSwipeAnalytics::new(EventId::new("e1").unwrap(), counts);
        assert_eq!(analytics.total, 4);
        assert_eq!(analytics.right_rate, 0.5);
        assert_eq!(analytics.up_rate, 0.0);
        let sum = analytics.right_rate + analytics.left_rate + analytics.up_rate + analytics.down_rate;
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn stats_map_directions_to_buckets() {
        let counts: DirectionCounts = [SwipeDirection::Up, SwipeDirection::Left]
            .into_iter()
            .collect();
        let stats = BucketStats::new(counts, Some(at(9)));
        assert_eq!(stats.public, 1);
        assert_eq!(stats.pass, 1);
        assert_eq!(stats.going, 0);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.last_swiped_at, Some(at(9)));
    }
}
