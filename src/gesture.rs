//! Classification of a released drag gesture into a swipe direction.
//!
//! The host UI owns animation state; it hands the classifier an immutable
//! snapshot of the gesture at release time and reverts the card itself when
//! no direction is returned.

use serde::{Deserialize, Serialize};

use crate::domain::types::SwipeDirection;

/// Default translation a card must travel before it counts as swiped.
pub const DEFAULT_DISTANCE_THRESHOLD: f64 = 120.0;
/// Default release velocity (units per second) that counts as a flick.
pub const DEFAULT_VELOCITY_THRESHOLD: f64 = 500.0;

/// Two-dimensional vector in the gesture's local coordinate space.
///
/// Positive `y` points down, matching screen coordinates.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Limits a gesture must exceed (strictly) on at least one axis.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct SwipeThresholds {
    pub distance: f64,
    pub velocity: f64,
}

impl Default for SwipeThresholds {
    fn default() -> Self {
        Self {
            distance: DEFAULT_DISTANCE_THRESHOLD,
            velocity: DEFAULT_VELOCITY_THRESHOLD,
        }
    }
}

impl SwipeThresholds {
    pub const fn new(distance: f64, velocity: f64) -> Self {
        Self { distance, velocity }
    }

    fn is_exceeded_by(&self, translation: Vector2, velocity: Vector2) -> bool {
        translation.x.abs() > self.distance
            || translation.y.abs() > self.distance
            || velocity.x.abs() > self.velocity
            || velocity.y.abs() > self.velocity
    }
}

/// Maps a released gesture to a direction, or `None` when the gesture is too
/// weak and the card should snap back.
///
/// The axis with the larger translation wins and equal magnitudes resolve to
/// the horizontal axis. A flick released without any displacement picks its
/// axis from the velocity instead, and a zero translation component takes
/// its sign from the velocity on the same axis.
pub fn classify(
    translation: Vector2,
    velocity: Vector2,
    thresholds: &SwipeThresholds,
) -> Option<SwipeDirection> {
    if !translation.is_finite() || !velocity.is_finite() {
        return None;
    }
    if !thresholds.is_exceeded_by(translation, velocity) {
        return None;
    }

    let axis = if translation == Vector2::default() {
        velocity
    } else {
        translation
    };

    if axis.x.abs() >= axis.y.abs() {
        let sign = signum_or(translation.x, velocity.x)?;
        Some(if sign > 0.0 {
            SwipeDirection::Right
        } else {
            SwipeDirection::Left
        })
    } else {
        let sign = signum_or(translation.y, velocity.y)?;
        Some(if sign > 0.0 {
            SwipeDirection::Down
        } else {
            SwipeDirection::Up
        })
    }
}

fn signum_or(primary: f64, fallback: f64) -> Option<f64> {
    [primary, fallback]
        .into_iter()
        .find(|value| *value != 0.0)
        .map(f64::signum)
}
