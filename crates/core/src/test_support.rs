//! Shared grid fixtures for unit tests across the crate.

use slotmap::SlotMap;

use crate::grid::Grid;
use crate::types::{OccupantId, Pos, Terrain};

/// A 9x3 grid with two three-tile floor pockets split by a wall at x = 4.
pub(crate) fn two_pocket_grid() -> Grid {
    let mut grid = Grid::new(9, 3);
    grid.fill_rect(1, 1, 3, 1, Terrain::Floor);
    grid.fill_rect(5, 1, 7, 1, Terrain::Floor);
    grid
}

/// Walled room with an open interior of `width` x `height` tiles starting at (1, 1).
pub(crate) fn open_room(width: usize, height: usize) -> Grid {
    let mut grid = Grid::new(width + 2, height + 2);
    grid.fill_rect(1, 1, width as i32, height as i32, Terrain::Floor);
    grid
}

/// Single-row corridor from (1, 1) to (`length`, 1).
pub(crate) fn corridor(length: i32) -> Grid {
    let mut grid = Grid::new(length as usize + 2, 3);
    grid.fill_rect(1, 1, length, 1, Terrain::Floor);
    grid
}

pub(crate) fn occupant_ids(count: usize) -> Vec<OccupantId> {
    let mut ids: SlotMap<OccupantId, ()> = SlotMap::with_key();
    (0..count).map(|_| ids.insert(())).collect()
}

/// Renders terrain as `#`/`.` rows with `@` at `marker`, for assertion messages.
pub(crate) fn draw(grid: &Grid, marker: Pos) -> String {
    let mut text = String::new();
    for y in 0..grid.height() as i32 {
        for x in 0..grid.width() as i32 {
            let pos = Pos { y, x };
            text.push(if pos == marker {
                '@'
            } else if grid.terrain(pos) == Terrain::Wall {
                '#'
            } else {
                '.'
            });
        }
        text.push('\n');
    }
    text
}
