//! Depth rules used by level generation: entry feature, room sizing, and population counts.

use crate::types::Stationary;

use super::seed::LevelRng;

pub const TOWN_DEPTH: u8 = 0;
pub const MAX_DUNGEON_DEPTH: u8 = 10;
pub const VOLCANO_TOP_DEPTH: u8 = 11;
pub const MAX_DEPTH: u8 = 13;

/// Optional single-instance features and their per-level chance in percent.
const OPTIONAL_FEATURES: [(Stationary, u8); 5] = [
    (Stationary::Altar, 40),
    (Stationary::Fountain, 50),
    (Stationary::Statue, 35),
    (Stationary::Throne, 20),
    (Stationary::Mirror, 25),
];

pub fn is_town(depth: u8) -> bool {
    depth == TOWN_DEPTH
}

pub fn is_volcano(depth: u8) -> bool {
    depth >= VOLCANO_TOP_DEPTH
}

/// Feature that marks the canonical entry tile of a level.
pub fn entry_feature(depth: u8) -> Stationary {
    match depth {
        0 | 1 => Stationary::Entrance,
        2..=9 => Stationary::StairsDown,
        _ => Stationary::Elevator,
    }
}

pub fn has_stairs_up(depth: u8) -> bool {
    depth >= 2
}

pub fn has_stairs_down(depth: u8) -> bool {
    (1..MAX_DUNGEON_DEPTH).contains(&depth)
}

pub fn max_room_width(depth: u8) -> i32 {
    (12 - i32::from(depth) / 2).max(4)
}

pub fn open_room_count(rng: &mut LevelRng, treasure_room: bool) -> usize {
    if treasure_room { 4 } else { 3 + rng.below(2) as usize }
}

/// Single-instance features for a dungeon level, entry feature excluded.
pub fn dungeon_features(depth: u8, rng: &mut LevelRng) -> Vec<Stationary> {
    let entry = entry_feature(depth);
    let mut features = Vec::new();
    if has_stairs_up(depth) && entry != Stationary::StairsUp {
        features.push(Stationary::StairsUp);
    }
    if has_stairs_down(depth) && entry != Stationary::StairsDown {
        features.push(Stationary::StairsDown);
    }
    for (feature, percent) in OPTIONAL_FEATURES {
        if rng.chance(percent) {
            features.push(feature);
        }
    }
    features
}

pub fn trap_count(depth: u8, rng: &mut LevelRng) -> usize {
    1 + usize::from(depth) / 3 + rng.below(2) as usize
}

pub fn item_count(depth: u8, rng: &mut LevelRng) -> usize {
    let base = if is_volcano(depth) { 6 } else { 3 + usize::from(depth) / 2 };
    base + rng.below(3) as usize
}

pub fn monster_count(depth: u8, rng: &mut LevelRng) -> usize {
    let base = 4 + usize::from(depth);
    base + rng.below(4) as usize
}
