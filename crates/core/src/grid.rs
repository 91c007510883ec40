//! Fixed-size tile storage with bounds-checked access.
//! Every other component treats this as the single source of truth for terrain and occupancy.

mod obstacle;
mod records;

pub use obstacle::ObstacleMap;
pub use records::{RecordError, TileRecord};

use crate::types::{OccupantId, Pos, Stationary, Terrain, Trap};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    pub terrain: Terrain,
    /// Terrain restored when `decay` runs out.
    pub base_terrain: Terrain,
    pub decay: u16,
    pub stationary: Option<Stationary>,
    pub trap: Option<Trap>,
    pub occupant: Option<OccupantId>,
}

impl Tile {
    pub const WALL: Tile = Tile::of(Terrain::Wall);

    pub const fn of(terrain: Terrain) -> Self {
        Self {
            terrain,
            base_terrain: terrain,
            decay: 0,
            stationary: None,
            trap: None,
            occupant: None,
        }
    }

    pub fn is_passable(&self) -> bool {
        self.terrain.is_passable() && !self.stationary.is_some_and(Stationary::blocks_movement)
    }

    pub fn is_transparent(&self) -> bool {
        self.terrain.is_transparent() && self.stationary.is_none_or(Stationary::is_transparent)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, Terrain::Wall)
    }

    pub fn filled(width: usize, height: usize, terrain: Terrain) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be non-zero");
        Self { width, height, tiles: vec![Tile::of(terrain); width * height] }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// True for tiles that are not on the outer border ring.
    pub fn is_interior(&self, pos: Pos) -> bool {
        pos.x >= 1
            && pos.y >= 1
            && (pos.x as usize) < self.width - 1
            && (pos.y as usize) < self.height - 1
    }

    pub fn get(&self, pos: Pos) -> &Tile {
        &self.tiles[self.index(pos)]
    }

    pub fn get_mut(&mut self, pos: Pos) -> &mut Tile {
        let idx = self.index(pos);
        &mut self.tiles[idx]
    }

    pub fn try_get(&self, pos: Pos) -> Option<&Tile> {
        self.in_bounds(pos).then(|| &self.tiles[self.index(pos)])
    }

    pub fn terrain(&self, pos: Pos) -> Terrain {
        self.get(pos).terrain
    }

    pub fn stationary(&self, pos: Pos) -> Option<Stationary> {
        self.get(pos).stationary
    }

    pub fn trap(&self, pos: Pos) -> Option<Trap> {
        self.get(pos).trap
    }

    pub fn occupant(&self, pos: Pos) -> Option<OccupantId> {
        self.get(pos).occupant
    }

    /// Replaces the terrain permanently. Impassable terrain drops any feature or trap on the tile.
    pub fn set_terrain(&mut self, pos: Pos, terrain: Terrain) {
        let tile = self.get_mut(pos);
        tile.terrain = terrain;
        tile.base_terrain = terrain;
        tile.decay = 0;
        if !terrain.is_passable() {
            tile.stationary = None;
            tile.trap = None;
        }
    }

    /// Returns `false` and leaves the tile untouched when the terrain cannot hold a feature.
    pub fn set_stationary(&mut self, pos: Pos, stationary: Option<Stationary>) -> bool {
        let tile = self.get_mut(pos);
        if stationary.is_some() && !tile.terrain.is_passable() {
            return false;
        }
        tile.stationary = stationary;
        true
    }

    pub fn set_trap(&mut self, pos: Pos, trap: Option<Trap>) {
        self.get_mut(pos).trap = trap;
    }

    /// Returns `false` when another occupant already holds the tile.
    pub fn set_occupant(&mut self, pos: Pos, occupant: OccupantId) -> bool {
        let tile = self.get_mut(pos);
        match tile.occupant {
            Some(existing) if existing != occupant => false,
            _ => {
                tile.occupant = Some(occupant);
                true
            }
        }
    }

    pub fn clear_occupant(&mut self, pos: Pos) -> Option<OccupantId> {
        self.get_mut(pos).occupant.take()
    }

    /// Lays temporary terrain (fire, cloud) that reverts after `turns` calls to
    /// [`Grid::tick_decay`]. Returns `false` and leaves the tile untouched when impassable
    /// terrain would bury a feature, trap or occupant.
    pub fn set_temporary(&mut self, pos: Pos, terrain: Terrain, turns: u16) -> bool {
        let tile = self.get_mut(pos);
        let holds_something =
            tile.stationary.is_some() || tile.trap.is_some() || tile.occupant.is_some();
        if holds_something && !terrain.is_passable() {
            return false;
        }
        if tile.decay == 0 {
            tile.base_terrain = tile.terrain;
        }
        tile.terrain = terrain;
        tile.decay = turns;
        true
    }

    /// Advances every decay timer by one turn and returns the tiles that reverted.
    pub fn tick_decay(&mut self) -> Vec<Pos> {
        let mut reverted = Vec::new();
        for (idx, tile) in self.tiles.iter_mut().enumerate() {
            if tile.decay == 0 {
                continue;
            }
            tile.decay -= 1;
            if tile.decay == 0 {
                tile.terrain = tile.base_terrain;
                reverted.push(Pos { y: (idx / self.width) as i32, x: (idx % self.width) as i32 });
            }
        }
        reverted
    }

    /// Movement passability. Out-of-bounds answers `false`.
    pub fn is_passable(&self, pos: Pos) -> bool {
        self.try_get(pos).is_some_and(Tile::is_passable)
    }

    /// Passability with closed doors treated as openable.
    pub fn is_passable_or_door(&self, pos: Pos) -> bool {
        self.try_get(pos).is_some_and(|tile| tile.terrain.is_passable())
    }

    pub fn is_transparent(&self, pos: Pos) -> bool {
        self.try_get(pos).is_some_and(Tile::is_transparent)
    }

    pub fn fill_rect(&mut self, left: i32, top: i32, right: i32, bottom: i32, terrain: Terrain) {
        for y in top..=bottom {
            for x in left..=right {
                self.set_terrain(Pos { y, x }, terrain);
            }
        }
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width).map(move |x| Pos { y: y as i32, x: x as i32 })
        })
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn count_terrain(&self, terrain: Terrain) -> usize {
        self.tiles.iter().filter(|tile| tile.terrain == terrain).count()
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(8 + self.tiles.len() * 4);
        bytes.extend((self.width as u32).to_le_bytes());
        bytes.extend((self.height as u32).to_le_bytes());
        for tile in &self.tiles {
            bytes.push(records::terrain_code(tile.terrain));
            bytes.push(tile.stationary.map_or(0, records::stationary_code));
            bytes.push(tile.trap.map_or(0, records::trap_code));
            bytes.push(u8::from(tile.occupant.is_some()));
        }
        bytes
    }

    fn index(&self, pos: Pos) -> usize {
        assert!(
            self.in_bounds(pos),
            "tile {pos:?} outside {}x{} grid",
            self.width,
            self.height
        );
        (pos.y as usize) * self.width + (pos.x as usize)
    }
}
