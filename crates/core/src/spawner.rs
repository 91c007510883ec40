//! Boundary to the entity/item system. Generation asks for depth-appropriate creatures and
//! items at a chosen tile; what gets created is owned entirely by the implementor.

use slotmap::SlotMap;

use crate::types::{OccupantId, Pos};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemSeed {
    /// Any item appropriate for the depth.
    Random,
    Gold { amount: u32 },
    /// A level's unique treasure marked in a static maze.
    Artifact,
}

pub trait EntitySpawner {
    /// Creates a monster for `depth` standing on `pos`, or declines with `None`.
    fn spawn_monster(&mut self, depth: u8, pos: Pos) -> Option<OccupantId>;

    /// Drops an item on `pos`; `false` means the item system declined.
    fn spawn_item(&mut self, depth: u8, pos: Pos, seed: ItemSeed) -> bool;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnedMonster {
    pub depth: u8,
    pub pos: Pos,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnedItem {
    pub depth: u8,
    pub pos: Pos,
    pub seed: ItemSeed,
}

/// Spawner that only records what was requested. Used by the tools and by tests.
#[derive(Debug, Default)]
pub struct RecordingSpawner {
    pub monsters: SlotMap<OccupantId, SpawnedMonster>,
    pub items: Vec<SpawnedItem>,
    monster_limit: Option<usize>,
}

impl RecordingSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declines every monster request past `limit`.
    pub fn with_monster_limit(limit: usize) -> Self {
        Self { monster_limit: Some(limit), ..Self::default() }
    }

    pub fn gold_total(&self) -> u64 {
        self.items
            .iter()
            .map(|item| match item.seed {
                ItemSeed::Gold { amount } => u64::from(amount),
                _ => 0,
            })
            .sum()
    }
}

impl EntitySpawner for RecordingSpawner {
    fn spawn_monster(&mut self, depth: u8, pos: Pos) -> Option<OccupantId> {
        if self.monster_limit.is_some_and(|limit| self.monsters.len() >= limit) {
            return None;
        }
        Some(self.monsters.insert(SpawnedMonster { depth, pos }))
    }

    fn spawn_item(&mut self, depth: u8, pos: Pos, seed: ItemSeed) -> bool {
        self.items.push(SpawnedItem { depth, pos, seed });
        true
    }
}
