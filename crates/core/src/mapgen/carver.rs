//! Depth-first corridor carving over an all-wall grid.

use tracing::trace;

use crate::grid::Grid;
use crate::types::{Direction, Pos, Terrain};

use super::seed::LevelRng;

/// Every frame checks the four cardinal directions twice before unwinding.
const CHECKS_PER_FRAME: u8 = 8;

struct Frame {
    pos: Pos,
    direction: usize,
    checks_left: u8,
}

impl Frame {
    fn new(pos: Pos, rng: &mut LevelRng) -> Self {
        Self { pos, direction: rng.below(4) as usize, checks_left: CHECKS_PER_FRAME }
    }
}

/// Carves a single-width spanning corridor network starting at `origin` and returns the
/// number of tiles opened. A step succeeds when the tiles one and two steps away are both
/// still wall; the outer border ring is never opened.
pub fn carve_maze(grid: &mut Grid, rng: &mut LevelRng, origin: Pos) -> usize {
    assert!(grid.is_interior(origin), "carve origin {origin:?} must be an interior tile");
    grid.set_terrain(origin, Terrain::Floor);
    let mut carved = 1;
    let mut deepest = 1;

    let mut stack = vec![Frame::new(origin, rng)];
    while let Some(frame) = stack.last_mut() {
        if frame.checks_left == 0 {
            stack.pop();
            continue;
        }
        let direction = Direction::CARDINAL[frame.direction];
        frame.direction = (frame.direction + 1) % Direction::CARDINAL.len();
        frame.checks_left -= 1;

        let near = frame.pos.step(direction);
        let far = near.step(direction);
        if !grid.is_interior(far)
            || grid.terrain(near) != Terrain::Wall
            || grid.terrain(far) != Terrain::Wall
        {
            continue;
        }
        grid.set_terrain(near, Terrain::Floor);
        grid.set_terrain(far, Terrain::Floor);
        carved += 2;
        stack.push(Frame::new(far, rng));
        deepest = deepest.max(stack.len());
    }

    trace!(carved, deepest, "maze carved");
    carved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::ObstacleMap;

    #[test]
    fn carving_an_80_by_24_grid_opens_a_connected_network() {
        let mut grid = Grid::new(80, 24);
        let mut rng = LevelRng::seed_from_u64(2024);
        let origin = Pos::xy(1, 1);
        let carved = carve_maze(&mut grid, &mut rng, origin);

        assert!(carved > 1);
        assert_eq!(grid.count_terrain(Terrain::Floor), carved);
        let obstacles = ObstacleMap::for_connectivity(&grid);
        assert!(obstacles.unreachable_from(origin).is_empty());
    }

    #[test]
    fn every_odd_cell_is_visited_and_border_stays_solid() {
        let mut grid = Grid::new(21, 11);
        carve_maze(&mut grid, &mut LevelRng::seed_from_u64(5), Pos::xy(1, 1));

        for pos in grid.positions() {
            if !grid.is_interior(pos) {
                assert_eq!(grid.terrain(pos), Terrain::Wall, "border tile {pos:?} was opened");
            } else if pos.x % 2 == 1 && pos.y % 2 == 1 {
                assert_eq!(grid.terrain(pos), Terrain::Floor, "maze cell {pos:?} was skipped");
            } else if pos.x % 2 == 0 && pos.y % 2 == 0 {
                assert_eq!(grid.terrain(pos), Terrain::Wall, "pillar {pos:?} was opened");
            }
        }
    }

    #[test]
    fn spanning_network_has_no_cycles() {
        let mut grid = Grid::new(31, 15);
        let carved = carve_maze(&mut grid, &mut LevelRng::seed_from_u64(77), Pos::xy(1, 1));
        let cells = grid.positions().filter(|p| p.x % 2 == 1 && p.y % 2 == 1).count();
        let links = carved - cells;
        assert_eq!(links, cells - 1, "a spanning tree over the cells has exactly cells-1 links");
    }
}
