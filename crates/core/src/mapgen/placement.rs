//! Raster-probe placement of features, traps, items and monsters on an accepted grid.

use tracing::warn;

use crate::grid::Grid;
use crate::spawner::{EntitySpawner, ItemSeed};
use crate::types::{OccupantId, Pos, Stationary, Trap};

use super::progression;
use super::rooms::{Rect, RoomPlan};
use super::seed::LevelRng;

/// What a probed tile must be able to hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    Stationary,
    Trap,
    /// Items stack freely, so only the feature matters.
    Item,
    Monster { player: Option<Pos> },
}

impl Slot {
    pub fn accepts(self, grid: &Grid, pos: Pos) -> bool {
        let Some(tile) = grid.try_get(pos) else {
            return false;
        };
        match self {
            Slot::Stationary | Slot::Item => {
                tile.terrain.is_passable() && tile.stationary.is_none()
            }
            Slot::Trap => {
                tile.terrain.is_passable() && tile.stationary.is_none() && tile.trap.is_none()
            }
            Slot::Monster { player } => {
                tile.is_passable() && tile.occupant.is_none() && player != Some(pos)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    Placed { pos: Pos, occupant: Option<OccupantId> },
    /// A tile was found but the entity system declined to create anything there.
    Declined { pos: Pos },
    NoSpace,
}

/// Scans from `anchor` in raster order (x + 1, wrapping to the next row, wrapping to the top)
/// for the first tile `slot` accepts. Returns [`Pos::OUT_OF_BOUNDS`] when the scan comes back
/// around to the anchor.
pub fn probe(grid: &Grid, anchor: Pos, slot: Slot) -> Pos {
    probe_where(grid, anchor, |grid, pos| slot.accepts(grid, pos))
}

/// [`probe`] with an arbitrary predicate.
pub fn probe_where(grid: &Grid, anchor: Pos, accepts: impl Fn(&Grid, Pos) -> bool) -> Pos {
    assert!(grid.in_bounds(anchor), "probe anchor {anchor:?} outside grid");
    let width = grid.width() as i32;
    let height = grid.height() as i32;
    let mut pos = anchor;
    loop {
        if accepts(grid, pos) {
            return pos;
        }
        pos.x += 1;
        if pos.x >= width {
            pos.x = 0;
            pos.y += 1;
            if pos.y >= height {
                pos.y = 0;
            }
        }
        if pos == anchor {
            return Pos::OUT_OF_BOUNDS;
        }
    }
}

pub fn random_anchor(grid: &Grid, rng: &mut LevelRng) -> Pos {
    Pos {
        y: rng.range(1, grid.height() as i32 - 2),
        x: rng.range(1, grid.width() as i32 - 2),
    }
}

/// Places a single-instance feature; returns the sentinel when the level has no room left.
pub fn place_stationary(grid: &mut Grid, rng: &mut LevelRng, feature: Stationary) -> Pos {
    let pos = probe(grid, random_anchor(grid, rng), Slot::Stationary);
    if pos.is_sentinel() {
        warn!(?feature, "no free tile for stationary feature");
    } else {
        grid.set_stationary(pos, Some(feature));
    }
    pos
}

pub fn place_trap(grid: &mut Grid, rng: &mut LevelRng, trap: Trap) -> Pos {
    let pos = probe(grid, random_anchor(grid, rng), Slot::Trap);
    if !pos.is_sentinel() {
        grid.set_trap(pos, Some(trap));
    }
    pos
}

pub fn place_monster_near(
    grid: &mut Grid,
    spawner: &mut dyn EntitySpawner,
    depth: u8,
    near: Pos,
    player: Option<Pos>,
) -> Placement {
    let pos = probe(grid, near, Slot::Monster { player });
    if pos.is_sentinel() {
        return Placement::NoSpace;
    }
    match spawner.spawn_monster(depth, pos) {
        Some(occupant) => {
            grid.set_occupant(pos, occupant);
            Placement::Placed { pos, occupant: Some(occupant) }
        }
        None => Placement::Declined { pos },
    }
}

pub fn place_item_near(
    grid: &Grid,
    spawner: &mut dyn EntitySpawner,
    depth: u8,
    near: Pos,
    seed: ItemSeed,
) -> Placement {
    let pos = probe(grid, near, Slot::Item);
    if pos.is_sentinel() {
        return Placement::NoSpace;
    }
    if spawner.spawn_item(depth, pos, seed) {
        Placement::Placed { pos, occupant: None }
    } else {
        Placement::Declined { pos }
    }
}

/// Moves every feature inside `area` (doors excepted) to a free tile outside it.
pub fn relocate_stationaries_out_of(grid: &mut Grid, rng: &mut LevelRng, area: Rect) -> usize {
    let displaced: Vec<(Pos, Stationary)> = area
        .positions()
        .filter_map(|pos| grid.stationary(pos).map(|feature| (pos, feature)))
        .filter(|(_, feature)| !feature.is_door())
        .collect();

    let mut moved = 0;
    for (from, feature) in displaced {
        grid.set_stationary(from, None);
        let anchor = random_anchor(grid, rng);
        let target = probe_where(grid, anchor, |grid, pos| {
            Slot::Stationary.accepts(grid, pos) && !area.contains(pos)
        });
        if target.is_sentinel() {
            warn!(?feature, ?from, "displaced feature has nowhere to go");
            continue;
        }
        grid.set_stationary(target, Some(feature));
        moved += 1;
    }
    moved
}

pub(super) struct PopulateContext<'a> {
    pub(super) grid: &'a mut Grid,
    pub(super) rng: &'a mut LevelRng,
    pub(super) spawner: &'a mut dyn EntitySpawner,
    pub(super) depth: u8,
    pub(super) player: Option<Pos>,
}

pub(super) fn populate_dungeon(context: &mut PopulateContext<'_>, plan: &RoomPlan) {
    let depth = context.depth;
    for feature in progression::dungeon_features(depth, context.rng) {
        place_stationary(context.grid, context.rng, feature);
    }
    if let Some(treasure) = &plan.treasure {
        relocate_stationaries_out_of(context.grid, context.rng, treasure.bounds.inner());
    }

    for _ in 0..progression::trap_count(depth, context.rng) {
        let trap = context.rng.pick(&Trap::ALL);
        place_trap(context.grid, context.rng, trap);
    }

    if let Some(treasure) = &plan.treasure {
        for &(pos, amount) in &treasure.gold {
            place_item_near(context.grid, context.spawner, depth, pos, ItemSeed::Gold { amount });
        }
        for &pos in &treasure.monsters {
            place_monster_near(context.grid, context.spawner, depth + 1, pos, context.player);
        }
    }
    if let Some(center) = plan.guarded_center {
        place_monster_near(context.grid, context.spawner, depth, center, context.player);
    }

    populate_wanderers(context);
}

/// Scattered items and monsters common to carved and static levels.
pub(super) fn populate_wanderers(context: &mut PopulateContext<'_>) {
    let depth = context.depth;
    for _ in 0..progression::item_count(depth, context.rng) {
        let anchor = random_anchor(context.grid, context.rng);
        place_item_near(context.grid, context.spawner, depth, anchor, ItemSeed::Random);
    }
    for _ in 0..progression::monster_count(depth, context.rng) {
        let anchor = random_anchor(context.grid, context.rng);
        let placement =
            place_monster_near(context.grid, context.spawner, depth, anchor, context.player);
        if placement == Placement::NoSpace {
            warn!(depth, "level is full, skipping remaining monsters");
            break;
        }
    }
}
