//! World tuning loaded from data with compiled fallbacks.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    BATTLE_LOG_CAPACITY, GENERATION_ATTEMPT_FACTOR, INITIAL_SPOTS, MAP_HEIGHT, MAP_WIDTH,
    MIN_SPOT_DISTANCE, POPUP_DURATION_SECS, RESPAWN_ATTEMPT_CAP, RESPAWN_COOLDOWN_SECS,
    SPOT_SIZE, START_VIEW_CENTER_X, START_VIEW_CENTER_Y, TROOP_SPEED,
};
use crate::world::Position;

const DEFAULT_WORLD_DATA: &str = include_str!("../assets/data/world.json");

/// Map geometry, pacing and feed sizes for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub map_width: f64,
    pub map_height: f64,
    /// Rendered marker edge length; carried for the presentation layer.
    pub spot_size: f64,
    /// Minimum Euclidean distance between any two active spots.
    pub min_distance: f64,
    /// Distance units covered per second of march.
    pub troop_speed: f64,
    pub respawn_cooldown_secs: u32,
    pub initial_spots: u32,
    /// Generation gives up after `count * generation_attempt_factor` draws.
    pub generation_attempt_factor: u32,
    pub respawn_attempt_cap: u32,
    pub log_capacity: usize,
    pub popup_duration_secs: u32,
    pub start_view_center: Position,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            map_width: MAP_WIDTH,
            map_height: MAP_HEIGHT,
            spot_size: SPOT_SIZE,
            min_distance: MIN_SPOT_DISTANCE,
            troop_speed: TROOP_SPEED,
            respawn_cooldown_secs: RESPAWN_COOLDOWN_SECS,
            initial_spots: INITIAL_SPOTS,
            generation_attempt_factor: GENERATION_ATTEMPT_FACTOR,
            respawn_attempt_cap: RESPAWN_ATTEMPT_CAP,
            log_capacity: BATTLE_LOG_CAPACITY,
            popup_duration_secs: POPUP_DURATION_SECS,
            start_view_center: Position::new(START_VIEW_CENTER_X, START_VIEW_CENTER_Y),
        }
    }
}

/// Errors raised when world configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("map dimensions must be positive (got {width:.1} x {height:.1})")]
    MapSize { width: f64, height: f64 },
    #[error("troop speed must be positive (got {0:.2})")]
    TroopSpeed(f64),
    #[error("min distance must be between 0 and the map diagonal (got {0:.2})")]
    MinDistance(f64),
    #[error("{field} must be at least 1")]
    ZeroCap { field: &'static str },
    #[error("start view center ({x:.1}, {y:.1}) lies outside the map")]
    ViewCenter { x: f64, y: f64 },
}

impl WorldConfig {
    /// Load the bundled world configuration, falling back to compiled defaults.
    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(DEFAULT_WORLD_DATA).unwrap_or_default()
    }

    /// Get default configuration
    #[must_use]
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) JSON override.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check the invariants the world grid and march timer rely on.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let width_ok = self.map_width.is_finite() && self.map_width > 0.0;
        let height_ok = self.map_height.is_finite() && self.map_height > 0.0;
        if !width_ok || !height_ok {
            return Err(ConfigError::MapSize {
                width: self.map_width,
                height: self.map_height,
            });
        }
        if !self.troop_speed.is_finite() || self.troop_speed <= 0.0 {
            return Err(ConfigError::TroopSpeed(self.troop_speed));
        }
        let diagonal = self.map_width.hypot(self.map_height);
        if !self.min_distance.is_finite() || self.min_distance < 0.0 || self.min_distance > diagonal
        {
            return Err(ConfigError::MinDistance(self.min_distance));
        }
        if self.generation_attempt_factor == 0 {
            return Err(ConfigError::ZeroCap {
                field: "generation_attempt_factor",
            });
        }
        if self.respawn_attempt_cap == 0 {
            return Err(ConfigError::ZeroCap {
                field: "respawn_attempt_cap",
            });
        }
        if self.log_capacity == 0 {
            return Err(ConfigError::ZeroCap {
                field: "log_capacity",
            });
        }
        let Position { x, y } = self.start_view_center;
        if !(0.0..=self.map_width).contains(&x) || !(0.0..=self.map_height).contains(&y) {
            return Err(ConfigError::ViewCenter { x, y });
        }
        Ok(())
    }
}
