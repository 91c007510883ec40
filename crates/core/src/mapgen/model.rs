//! Generated level and its provenance.

use xxhash_rust::xxh3::xxh3_64;

use crate::grid::Grid;
use crate::types::Pos;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelSource {
    Town,
    Carved { treasure_room: bool },
    Static { index: usize },
    /// Retry budget ran out; unreachable tiles were walled in.
    BestEffort,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Level {
    pub depth: u8,
    pub grid: Grid,
    /// Canonical entry tile. Every passable-or-door tile is reachable from here.
    pub entry: Pos,
    /// Carve attempts spent, counting the accepted one. Zero for town and static levels.
    pub attempts: u32,
    pub source: LevelSource,
}

impl Level {
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = self.grid.canonical_bytes();
        bytes.push(self.depth);
        bytes.extend(self.entry.y.to_le_bytes());
        bytes.extend(self.entry.x.to_le_bytes());
        bytes
    }

    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }
}
