//! Generation and visibility tuning shared by every level.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_WIDTH: usize = 12;
pub const MIN_HEIGHT: usize = 8;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenConfig {
    pub width: usize,
    pub height: usize,
    /// Carve attempts per parameter set before relaxing it.
    pub max_attempts: u32,
    pub treasure_room_percent: u8,
    pub static_maze_percent: u8,
    pub fov_radius: i32,
    pub enlightenment_radius: i32,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            width: 80,
            height: 24,
            max_attempts: 32,
            treasure_room_percent: 15,
            static_maze_percent: 33,
            fov_radius: 8,
            enlightenment_radius: 15,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("grid {width}x{height} is smaller than the {MIN_WIDTH}x{MIN_HEIGHT} minimum")]
    GridTooSmall { width: usize, height: usize },
    #[error("max_attempts must be at least 1")]
    NoAttempts,
    #[error("{field} must be a percentage, got {value}")]
    PercentOutOfRange { field: &'static str, value: u8 },
    #[error("{field} must not be negative, got {value}")]
    NegativeRadius { field: &'static str, value: i32 },
    #[error("{field} must not exceed the grid width plus height {limit}, got {value}")]
    RadiusTooLarge { field: &'static str, value: i32, limit: i32 },
}

impl GenConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < MIN_WIDTH || self.height < MIN_HEIGHT {
            return Err(ConfigError::GridTooSmall { width: self.width, height: self.height });
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::NoAttempts);
        }
        for (field, value) in [
            ("treasure_room_percent", self.treasure_room_percent),
            ("static_maze_percent", self.static_maze_percent),
        ] {
            if value > 100 {
                return Err(ConfigError::PercentOutOfRange { field, value });
            }
        }
        let limit = i32::try_from(self.width.saturating_add(self.height)).unwrap_or(i32::MAX);
        for (field, value) in
            [("fov_radius", self.fov_radius), ("enlightenment_radius", self.enlightenment_radius)]
        {
            if value < 0 {
                return Err(ConfigError::NegativeRadius { field, value });
            }
            if value > limit {
                return Err(ConfigError::RadiusTooLarge { field, value, limit });
            }
        }
        Ok(())
    }
}
