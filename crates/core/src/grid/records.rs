//! Per-tile record list handed to the persistence layer, which owns the encoding.

use serde::{Deserialize, Serialize};
use slotmap::{Key, KeyData};
use thiserror::Error;

use crate::types::{OccupantId, Stationary, Terrain, Trap};

use super::{Grid, Tile};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRecord {
    pub terrain: Terrain,
    pub base_terrain: Terrain,
    pub decay: u16,
    pub stationary: Option<Stationary>,
    pub trap: Option<Trap>,
    /// Opaque occupant handle as issued by the entity system.
    pub occupant: Option<u64>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("expected {expected} tile records for the grid, found {found}")]
    LengthMismatch { expected: usize, found: usize },
    #[error("grid dimensions must be non-zero, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },
    #[error("record {index} places a stationary feature on impassable terrain")]
    StationaryOnImpassable { index: usize },
}

impl From<&Tile> for TileRecord {
    fn from(tile: &Tile) -> Self {
        Self {
            terrain: tile.terrain,
            base_terrain: tile.base_terrain,
            decay: tile.decay,
            stationary: tile.stationary,
            trap: tile.trap,
            occupant: tile.occupant.map(|id| id.data().as_ffi()),
        }
    }
}

impl From<TileRecord> for Tile {
    fn from(record: TileRecord) -> Self {
        Self {
            terrain: record.terrain,
            base_terrain: record.base_terrain,
            decay: record.decay,
            stationary: record.stationary,
            trap: record.trap,
            occupant: record.occupant.map(|raw| OccupantId::from(KeyData::from_ffi(raw))),
        }
    }
}

impl Grid {
    pub fn to_records(&self) -> Vec<TileRecord> {
        self.tiles.iter().map(TileRecord::from).collect()
    }

    pub fn from_records(
        width: usize,
        height: usize,
        records: &[TileRecord],
    ) -> Result<Self, RecordError> {
        if width == 0 || height == 0 {
            return Err(RecordError::EmptyGrid { width, height });
        }
        if records.len() != width * height {
            return Err(RecordError::LengthMismatch {
                expected: width * height,
                found: records.len(),
            });
        }
        if let Some(index) = records
            .iter()
            .position(|record| record.stationary.is_some() && !record.terrain.is_passable())
        {
            return Err(RecordError::StationaryOnImpassable { index });
        }
        Ok(Self { width, height, tiles: records.iter().copied().map(Tile::from).collect() })
    }
}

pub(super) fn terrain_code(terrain: Terrain) -> u8 {
    match terrain {
        Terrain::Wall => 0,
        Terrain::Floor => 1,
        Terrain::Water => 2,
        Terrain::Lava => 3,
        Terrain::Fire => 4,
        Terrain::Cloud => 5,
    }
}

pub(super) fn stationary_code(stationary: Stationary) -> u8 {
    match stationary {
        Stationary::Entrance => 1,
        Stationary::StairsUp => 2,
        Stationary::StairsDown => 3,
        Stationary::Elevator => 4,
        Stationary::Altar => 5,
        Stationary::Fountain => 6,
        Stationary::Statue => 7,
        Stationary::Throne => 8,
        Stationary::Mirror => 9,
        Stationary::ClosedDoor => 10,
        Stationary::OpenDoor => 11,
        Stationary::Shop(kind) => 20 + kind as u8,
    }
}

pub(super) fn trap_code(trap: Trap) -> u8 {
    match trap {
        Trap::Teleport => 1,
        Trap::Dart => 2,
        Trap::Arrow => 3,
        Trap::Trapdoor => 4,
    }
}
