//! Procedural level generation split into carving, validation, and placement stages.

pub mod model;
pub mod progression;
pub mod static_maze;

mod carver;
mod generator;
mod placement;
mod rooms;
mod seed;
mod town;
mod validate;

pub use carver::carve_maze;
pub use generator::{ENTRY_TILE, LevelGenerator};
pub use model::{Level, LevelSource};
pub use placement::{
    Placement, Slot, place_item_near, place_monster_near, place_stationary, place_trap, probe,
    probe_where, random_anchor, relocate_stationaries_out_of,
};
pub use progression::{MAX_DEPTH, MAX_DUNGEON_DEPTH, TOWN_DEPTH, VOLCANO_TOP_DEPTH};
pub use rooms::{Rect, RoomPlan, TreasurePlan, build_treasure_room, inject_open_rooms};
pub use seed::LevelRng;
pub use static_maze::{MazeMarker, StaticMaze, StaticMazeError, load_mazes, parse_mazes};
pub use validate::{is_fully_connected, seal_unreachable, unreachable_tiles};

use crate::config::{ConfigError, GenConfig};
use crate::spawner::EntitySpawner;

pub fn generate_level(
    run_seed: u64,
    depth: u8,
    config: &GenConfig,
    spawner: &mut dyn EntitySpawner,
) -> Result<Level, ConfigError> {
    Ok(LevelGenerator::new(run_seed, config.clone())?.generate(depth, spawner))
}
