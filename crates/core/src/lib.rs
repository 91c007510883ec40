pub mod config;
pub mod grid;
pub mod mapgen;
pub mod pathfinding;
pub mod spawner;
pub mod types;
pub mod visibility;

#[cfg(test)]
mod test_support;

pub use config::{ConfigError, GenConfig};
pub use grid::{Grid, ObstacleMap, RecordError, Tile, TileRecord};
pub use mapgen::{Level, LevelGenerator, LevelSource, generate_level};
pub use pathfinding::{find_path, next_step};
pub use spawner::{EntitySpawner, ItemSeed, RecordingSpawner};
pub use types::*;
pub use visibility::{Viewer, VisibilityMap, compute_fov, line_of_sight};
