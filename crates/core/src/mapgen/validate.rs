//! Reachability check run after every carve, and the last-resort repair used when
//! the retry budget is spent.

use crate::grid::{Grid, ObstacleMap};
use crate::types::{Pos, Terrain};

/// Passable-or-door tiles the flood fill from `entry` never reaches.
pub fn unreachable_tiles(grid: &Grid, entry: Pos) -> Vec<Pos> {
    ObstacleMap::for_connectivity(grid).unreachable_from(entry)
}

/// True when the entry is open and every passable-or-door tile is reachable from it.
pub fn is_fully_connected(grid: &Grid, entry: Pos) -> bool {
    grid.is_passable_or_door(entry) && unreachable_tiles(grid, entry).is_empty()
}

/// Walls in every tile the entry cannot reach and returns how many were sealed.
pub fn seal_unreachable(grid: &mut Grid, entry: Pos) -> usize {
    let stranded = unreachable_tiles(grid, entry);
    for &pos in &stranded {
        grid.set_terrain(pos, Terrain::Wall);
    }
    stranded.len()
}
