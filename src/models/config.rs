//! Runtime configuration for the maintenance binary.

use serde::Deserialize;

use crate::gesture::{DEFAULT_DISTANCE_THRESHOLD, DEFAULT_VELOCITY_THRESHOLD, SwipeThresholds};

/// Settings loaded from `config/*.yaml` and `APP_*` environment variables.
#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    /// Path or URL of the SQLite database.
    pub database_url: String,
    /// Thresholds clients should classify gestures with.
    #[serde(default)]
    pub gesture: GestureConfig,
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct GestureConfig {
    #[serde(default = "default_distance_threshold")]
    pub distance_threshold: f64,
    #[serde(default = "default_velocity_threshold")]
    pub velocity_threshold: f64,
}

fn default_distance_threshold() -> f64 {
    DEFAULT_DISTANCE_THRESHOLD
}

fn default_velocity_threshold() -> f64 {
    DEFAULT_VELOCITY_THRESHOLD
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            distance_threshold: DEFAULT_DISTANCE_THRESHOLD,
            velocity_threshold: DEFAULT_VELOCITY_THRESHOLD,
        }
    }
}

impl From<GestureConfig> for SwipeThresholds {
    fn from(value: GestureConfig) -> Self {
        SwipeThresholds::new(value.distance_threshold, value.velocity_threshold)
    }
}
